//! Materialize a day's occurrences from the template set.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::recurrence::{applies_on, is_active_on};
use super::{Occurrence, Template};
use crate::dates::day_of_week;
use crate::error::Result;
use crate::storage::TrackerStore;

/// Occurrences of `templates` on `date`, creating any that do not exist yet.
///
/// With `show_all` the weekday rule is skipped but templates created after
/// `date` are still excluded. Existing occurrences keep their progress and
/// get `period` refreshed from the template. New occurrences are written one
/// by one; a failed write is logged and the occurrence is still returned.
/// The result follows the order of `templates`.
///
/// # Errors
/// Returns an error only when the existing occurrences cannot be read.
pub fn sync_for_date<S: TrackerStore>(
    store: &S,
    date: NaiveDate,
    templates: &[Template],
    show_all: bool,
) -> Result<Vec<Occurrence>> {
    let weekday = day_of_week(date);
    let mut existing: HashMap<String, Occurrence> = store
        .get_occurrences_for_date(date)?
        .into_iter()
        .map(|occ| (occ.template_id.clone(), occ))
        .collect();

    let mut merged = Vec::new();
    let mut created = 0usize;
    for template in templates {
        let visible = if show_all {
            is_active_on(template, date)
        } else {
            applies_on(template, weekday, date)
        };
        if !visible {
            continue;
        }

        match existing.remove(&template.id) {
            Some(mut occ) => {
                occ.period = template.repeat_days.clone();
                merged.push(occ);
            }
            None => {
                let occ = Occurrence::new_for(template, date);
                if let Err(e) = store.save_occurrence(&occ) {
                    tracing::warn!(occurrence_id = %occ.id, "failed to save new occurrence: {e}");
                } else {
                    created += 1;
                }
                merged.push(occ);
            }
        }
    }

    tracing::debug!(
        date = %date,
        total = merged.len(),
        created,
        "synced occurrences"
    );
    Ok(merged)
}

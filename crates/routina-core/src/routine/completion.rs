//! Progress counting and the per-template completion history.

use chrono::{DateTime, NaiveDate, Utc};

use super::{Occurrence, Template};
use crate::error::{CoreError, Result};
use crate::storage::TrackerStore;

/// Advance `occurrence` by one step, clamped at its target count.
///
/// On the step that completes the occurrence, `completed_at` is set to `now`
/// and the date is added to the template's history. A missing template is
/// logged and does not fail the call; the saved occurrence is kept.
///
/// # Errors
/// Returns the store error when the occurrence cannot be saved. The returned
/// value is not produced in that case, so callers holding an optimistic copy
/// decide what to keep.
pub fn increment_progress<S: TrackerStore>(
    store: &S,
    occurrence: &Occurrence,
    now: DateTime<Utc>,
) -> Result<Occurrence> {
    let next = advanced(occurrence, now);
    store.save_occurrence(&next)?;
    if next.completed != occurrence.completed {
        record_best_effort(store, &next, next.completed, now);
    }
    Ok(next)
}

/// Reopen a completed occurrence, or advance an open one by one step.
///
/// # Errors
/// Returns the store error when the occurrence cannot be saved.
pub fn toggle_completion<S: TrackerStore>(
    store: &S,
    occurrence: &Occurrence,
    now: DateTime<Utc>,
) -> Result<Occurrence> {
    if !occurrence.completed {
        return increment_progress(store, occurrence, now);
    }
    let next = reopened(occurrence);
    store.save_occurrence(&next)?;
    record_best_effort(store, &next, false, now);
    Ok(next)
}

/// Add `date` to (or remove it from) the completion history of
/// `template_id`, stamping `last_completed` on add.
///
/// # Errors
/// Returns `NotFound` when the template does not exist, or the store error.
pub fn record_completion<S: TrackerStore>(
    store: &S,
    template_id: &str,
    date: NaiveDate,
    add: bool,
    now: DateTime<Utc>,
) -> Result<Template> {
    let mut template = store
        .get_template(template_id)?
        .ok_or_else(|| CoreError::template_not_found(template_id))?;
    if add {
        template.add_completed_date(date);
        template.last_completed = Some(now);
    } else {
        template.remove_completed_date(date);
    }
    store.put_template(&template)?;
    tracing::info!(template_id, date = %date, add, "completion recorded");
    Ok(template)
}

/// The occurrence after one increment step.
pub fn advanced(occurrence: &Occurrence, now: DateTime<Utc>) -> Occurrence {
    let target = occurrence.count.max(1);
    let count = occurrence.completed_count.saturating_add(1).min(target);
    let completed = count >= target;
    let completed_at = match (completed, occurrence.completed) {
        (true, false) => Some(now),
        (true, true) => occurrence.completed_at.or(Some(now)),
        (false, _) => None,
    };
    Occurrence {
        completed_count: count,
        completed,
        completed_at,
        ..occurrence.clone()
    }
}

/// The occurrence with its progress reset.
pub fn reopened(occurrence: &Occurrence) -> Occurrence {
    Occurrence {
        completed_count: 0,
        completed: false,
        completed_at: None,
        ..occurrence.clone()
    }
}

fn record_best_effort<S: TrackerStore>(
    store: &S,
    occurrence: &Occurrence,
    add: bool,
    now: DateTime<Utc>,
) {
    if let Err(e) = record_completion(store, &occurrence.template_id, occurrence.date, add, now) {
        tracing::warn!(
            occurrence_id = %occurrence.id,
            "completion history not updated: {e}"
        );
    }
}

//! Template lifecycle: create, update in place, cascade delete.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Template, TemplateForm};
use crate::error::{CoreError, Result};
use crate::storage::TrackerStore;

/// Validate `form` and persist a new template created at `now`.
///
/// # Errors
/// Returns a validation error before touching the store, or the store's
/// write error.
pub fn create_template<S: TrackerStore>(
    store: &S,
    form: &TemplateForm,
    now: DateTime<Utc>,
) -> Result<Template> {
    form.validate()?;
    let template = Template {
        id: Uuid::new_v4().to_string(),
        title: form.trimmed_title(),
        time: form.trimmed_time(),
        repeat_type: form.repeat_type,
        repeat_days: form.normalized_days(),
        count: form.count,
        created_at: now,
        updated_at: None,
        completed_dates: Vec::new(),
        last_completed: None,
    };
    store.save_template(&template)?;
    tracing::info!(template_id = %template.id, title = %template.title, "template created");
    Ok(template)
}

/// Replace the editable fields of template `id`.
///
/// Creation time is preserved. Stored occurrences pick up the new title,
/// time and count through `save_template`; when the new count finishes or
/// reopens one of them, its date is added to or removed from the history.
///
/// # Errors
/// Returns a validation error, `NotFound` for an unknown id, or the store's
/// write error.
pub fn update_template<S: TrackerStore>(
    store: &S,
    id: &str,
    form: &TemplateForm,
    now: DateTime<Utc>,
) -> Result<Template> {
    form.validate()?;
    let existing = store
        .get_template(id)?
        .ok_or_else(|| CoreError::template_not_found(id))?;
    let existing_count = existing.count;
    let mut template = Template {
        title: form.trimmed_title(),
        time: form.trimmed_time(),
        repeat_type: form.repeat_type,
        repeat_days: form.normalized_days(),
        count: form.count,
        updated_at: Some(now),
        ..existing
    };
    if template.count != existing_count {
        sync_history_with_count(store, &mut template, now)?;
    }
    store.save_template(&template)?;
    tracing::info!(template_id = %template.id, "template updated");
    Ok(template)
}

/// Apply the history side of re-stamping occurrences with `template.count`.
fn sync_history_with_count<S: TrackerStore>(
    store: &S,
    template: &mut Template,
    now: DateTime<Utc>,
) -> Result<()> {
    let target = template.count.max(1);
    for occurrence in store.get_occurrences_for_template(&template.id)? {
        let done = occurrence.completed_count.min(target) >= target;
        if done == occurrence.completed {
            continue;
        }
        if done {
            template.add_completed_date(occurrence.date);
            template.last_completed = Some(now);
        } else {
            template.remove_completed_date(occurrence.date);
        }
        tracing::debug!(
            template_id = %template.id,
            date = %occurrence.date,
            done,
            "history follows count change"
        );
    }
    Ok(())
}

/// Remove template `id` and every occurrence of it.
///
/// The two deletes are independent store operations; both are issued even
/// when the template row is already gone.
///
/// # Errors
/// Returns the first store error.
pub fn delete_template<S: TrackerStore>(store: &S, id: &str) -> Result<()> {
    store.delete_template(id)?;
    let removed = store.delete_occurrences_for_template(id)?;
    tracing::info!(template_id = %id, occurrences = removed, "template deleted");
    Ok(())
}

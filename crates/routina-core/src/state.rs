//! In-memory application state driven by store-backed actions.
//!
//! [`Tracker`] mirrors the templates and the selected day's occurrences.
//! Actions never return errors; failures land in [`Tracker::error`] or
//! [`Tracker::validation`] and the tracker stays usable.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, ValidationError};
use crate::routine::completion::{advanced, reopened};
use crate::routine::{
    self, increment_progress, sync_for_date, toggle_completion, Occurrence, Template, TemplateForm,
};
use crate::storage::TrackerStore;

pub struct Tracker<S: TrackerStore> {
    store: S,
    templates: Vec<Template>,
    occurrences: Vec<Occurrence>,
    selected_date: NaiveDate,
    today: NaiveDate,
    show_all: bool,
    empty_list: bool,
    error: Option<String>,
    validation: Option<ValidationError>,
}

impl<S: TrackerStore> Tracker<S> {
    /// A tracker with nothing loaded, positioned on `today`.
    pub fn new(store: S, today: NaiveDate) -> Self {
        Self {
            store,
            templates: Vec::new(),
            occurrences: Vec::new(),
            selected_date: today,
            today,
            show_all: false,
            empty_list: false,
            error: None,
            validation: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// True when no templates exist at all.
    pub fn empty_list(&self) -> bool {
        self.empty_list
    }

    pub fn is_today(&self) -> bool {
        self.selected_date == self.today
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.validation = None;
    }

    /// Reload templates and materialize occurrences for `date`.
    ///
    /// Any error left by an earlier action is cleared first.
    pub fn load_for_date(&mut self, date: NaiveDate, show_all: bool) {
        self.error = None;
        self.validation = None;
        self.selected_date = date;
        self.show_all = show_all;
        self.templates = self.store.get_all_templates();
        self.empty_list = self.templates.is_empty();
        if self.empty_list {
            self.occurrences.clear();
            return;
        }
        match sync_for_date(&self.store, date, &self.templates, show_all) {
            Ok(occurrences) => self.occurrences = occurrences,
            Err(e) => self.fail(e),
        }
    }

    pub fn change_date(&mut self, date: NaiveDate) {
        self.load_for_date(date, self.show_all);
    }

    pub fn create_template(&mut self, form: &TemplateForm, now: DateTime<Utc>) -> Option<Template> {
        self.validation = None;
        match routine::create_template(&self.store, form, now) {
            Ok(template) => {
                self.change_date(self.selected_date);
                Some(template)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    pub fn update_template(
        &mut self,
        id: &str,
        form: &TemplateForm,
        now: DateTime<Utc>,
    ) -> Option<Template> {
        self.validation = None;
        match routine::update_template(&self.store, id, form, now) {
            Ok(template) => {
                self.change_date(self.selected_date);
                Some(template)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Drop the template from view immediately, then cascade in the store.
    pub fn delete_template(&mut self, id: &str) {
        self.templates.retain(|t| t.id != id);
        self.occurrences.retain(|o| o.template_id != id);
        self.empty_list = self.templates.is_empty();
        if let Err(e) = routine::delete_template(&self.store, id) {
            self.fail(e);
        }
    }

    /// One progress step on an occurrence of the selected day.
    pub fn increment(&mut self, occurrence_id: &str, now: DateTime<Utc>) {
        self.apply(occurrence_id, |store, occ| {
            (advanced(occ, now), increment_progress(store, occ, now))
        });
    }

    /// Reopen a completed occurrence or advance an open one.
    pub fn toggle(&mut self, occurrence_id: &str, now: DateTime<Utc>) {
        self.apply(occurrence_id, |store, occ| {
            let optimistic = if occ.completed {
                reopened(occ)
            } else {
                advanced(occ, now)
            };
            (optimistic, toggle_completion(store, occ, now))
        });
    }

    fn apply<F>(&mut self, occurrence_id: &str, op: F)
    where
        F: FnOnce(&S, &Occurrence) -> (Occurrence, crate::error::Result<Occurrence>),
    {
        let Some(idx) = self.occurrences.iter().position(|o| o.id == occurrence_id) else {
            self.fail(CoreError::occurrence_not_found(occurrence_id));
            return;
        };
        let (optimistic, persisted) = op(&self.store, &self.occurrences[idx]);
        match persisted {
            Ok(occ) => {
                let template_id = occ.template_id.clone();
                self.occurrences[idx] = occ;
                self.refresh_template(&template_id);
            }
            Err(e) => {
                self.occurrences[idx] = optimistic;
                self.fail(e);
            }
        }
    }

    fn refresh_template(&mut self, template_id: &str) {
        match self.store.get_template(template_id) {
            Ok(Some(fresh)) => {
                if let Some(slot) = self.templates.iter_mut().find(|t| t.id == template_id) {
                    *slot = fresh;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(template_id, "could not reload template: {e}"),
        }
    }

    fn fail(&mut self, err: CoreError) {
        match err {
            CoreError::Validation(v) => self.validation = Some(v),
            other => {
                tracing::warn!("{other}");
                self.error = Some(other.to_string());
            }
        }
    }
}

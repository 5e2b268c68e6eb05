//! User-editable template fields and their validation.

use serde::{Deserialize, Serialize};

use super::{DayOfWeek, RepeatType, Template};
use crate::error::ValidationError;

/// Input for creating or updating a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateForm {
    pub title: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub repeat_type: RepeatType,
    #[serde(default)]
    pub repeat_days: Vec<DayOfWeek>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            time: None,
            repeat_type: RepeatType::Daily,
            repeat_days: Vec::new(),
            count: default_count(),
        }
    }
}

impl TemplateForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Prefill a form from an existing template, for partial edits.
    pub fn from_template(template: &Template) -> Self {
        Self {
            title: template.title.clone(),
            time: template.time.clone(),
            repeat_type: template.repeat_type,
            repeat_days: template.repeat_days.clone().unwrap_or_default(),
            count: template.count,
        }
    }

    /// Check every field. Nothing is persisted when this fails.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.count == 0 {
            return Err(ValidationError::invalid("count", "must be at least 1"));
        }
        match self.repeat_type {
            RepeatType::Unknown => Err(ValidationError::invalid(
                "repeat_type",
                "expected daily, weekly or specific_days",
            )),
            t if t.uses_days() && self.repeat_days.is_empty() => Err(ValidationError::invalid(
                "repeat_days",
                format!("{t} templates need at least one day"),
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn trimmed_title(&self) -> String {
        self.title.trim().to_string()
    }

    /// Blank labels are stored as absent.
    pub(crate) fn trimmed_time(&self) -> Option<String> {
        self.time
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Sorted, deduplicated days; `None` for daily templates.
    pub(crate) fn normalized_days(&self) -> Option<Vec<DayOfWeek>> {
        if !self.repeat_type.uses_days() {
            return None;
        }
        let mut days = self.repeat_days.clone();
        days.sort_unstable();
        days.dedup();
        Some(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        for title in ["", "   ", "\t\n"] {
            assert_eq!(
                TemplateForm::new(title).validate(),
                Err(ValidationError::EmptyTitle)
            );
        }
        assert!(TemplateForm::new("Read").validate().is_ok());
    }

    #[test]
    fn zero_count_is_rejected() {
        let form = TemplateForm {
            count: 0,
            ..TemplateForm::new("Read")
        };
        assert_eq!(form.validate().unwrap_err().field(), "count");
    }

    #[test]
    fn day_based_types_need_days() {
        let mut form = TemplateForm {
            repeat_type: RepeatType::SpecificDays,
            ..TemplateForm::new("Gym")
        };
        assert_eq!(form.validate().unwrap_err().field(), "repeat_days");
        form.repeat_days = vec![DayOfWeek::Monday];
        assert!(form.validate().is_ok());
    }

    #[test]
    fn unknown_repeat_type_is_rejected() {
        let form = TemplateForm {
            repeat_type: RepeatType::Unknown,
            ..TemplateForm::new("Gym")
        };
        assert_eq!(form.validate().unwrap_err().field(), "repeat_type");
    }

    #[test]
    fn normalization() {
        let form = TemplateForm {
            title: "  Gym ".into(),
            time: Some("  ".into()),
            repeat_type: RepeatType::Weekly,
            repeat_days: vec![DayOfWeek::Friday, DayOfWeek::Monday, DayOfWeek::Friday],
            count: 1,
        };
        assert_eq!(form.trimmed_title(), "Gym");
        assert_eq!(form.trimmed_time(), None);
        assert_eq!(
            form.normalized_days(),
            Some(vec![DayOfWeek::Monday, DayOfWeek::Friday])
        );

        let daily = TemplateForm {
            repeat_days: vec![DayOfWeek::Monday],
            ..TemplateForm::new("Read")
        };
        assert_eq!(daily.normalized_days(), None);
    }
}

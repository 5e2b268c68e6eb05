//! Recurrence evaluation: does a template apply on a given day?

use chrono::NaiveDate;

use super::{DayOfWeek, RepeatType, Template};
use crate::dates::day_of_week;

/// True when `date` is not before the template's local creation day.
///
/// Time of day is ignored on both sides.
pub fn is_active_on(template: &Template, date: NaiveDate) -> bool {
    template.created_on() <= date
}

/// Whether `template` produces an occurrence on `date`.
///
/// `weekday` must be the actual weekday of `date`; use [`applies_on_date`]
/// to derive it.
pub fn applies_on(template: &Template, weekday: DayOfWeek, date: NaiveDate) -> bool {
    if !is_active_on(template, date) {
        return false;
    }
    match template.repeat_type {
        RepeatType::Daily => true,
        RepeatType::Weekly | RepeatType::SpecificDays => template
            .repeat_days
            .as_ref()
            .is_some_and(|days| days.contains(&weekday)),
        RepeatType::Unknown => false,
    }
}

/// [`applies_on`] with the weekday computed from `date`.
pub fn applies_on_date(template: &Template, date: NaiveDate) -> bool {
    applies_on(template, day_of_week(date), date)
}

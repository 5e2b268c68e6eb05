//! Read-only aggregates for calendar and summary views.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{add_days, date_range, days_in_month};
use crate::routine::recurrence::applies_on_date;
use crate::routine::{Occurrence, Template};

/// Completion figures for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayStats {
    /// Templates scheduled on the day
    pub total: usize,
    /// Of those, how many list the day in their completion history
    pub completed: usize,
    pub has_tasks: bool,
}

impl DayStats {
    pub fn is_complete(&self) -> bool {
        self.has_tasks && self.completed == self.total
    }
}

/// Totals over one day's occurrence list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

pub fn day_stats(templates: &[Template], date: NaiveDate) -> DayStats {
    let (total, completed) = templates
        .iter()
        .filter(|t| applies_on_date(t, date))
        .fold((0, 0), |(total, done), t| {
            (total + 1, done + usize::from(t.is_completed_on(date)))
        });
    DayStats {
        total,
        completed,
        has_tasks: total > 0,
    }
}

/// [`day_stats`] for every day of a month; empty for an invalid month.
pub fn month_stats(templates: &[Template], year: i32, month: u32) -> Vec<(NaiveDate, DayStats)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let days = days_in_month(year, month).unwrap_or(0);
    date_range(first, days)
        .into_iter()
        .map(|day| (day, day_stats(templates, day)))
        .collect()
}

pub fn summary(occurrences: &[Occurrence]) -> Summary {
    let total = occurrences.len();
    let completed = occurrences.iter().filter(|o| o.completed).count();
    Summary {
        total,
        completed,
        remaining: total - completed,
    }
}

/// Open occurrences first; relative order is otherwise kept.
pub fn order_incomplete_first(occurrences: &mut [Occurrence]) {
    occurrences.sort_by_key(|o| o.completed);
}

/// Local creation day of the oldest template.
pub fn earliest_created(templates: &[Template]) -> Option<NaiveDate> {
    templates.iter().map(Template::created_on).min()
}

/// Consecutive scheduled days completed, counting back from `today`.
///
/// An unfinished `today` does not break the streak; counting then starts
/// at yesterday. Days the template is not scheduled on are skipped.
pub fn current_streak(template: &Template, today: NaiveDate) -> u32 {
    let created = template.created_on();
    let mut day = today;
    if applies_on_date(template, day) && !template.is_completed_on(day) {
        day = add_days(day, -1);
    }

    let mut streak = 0;
    while day >= created {
        if applies_on_date(template, day) {
            if !template.is_completed_on(day) {
                break;
            }
            streak += 1;
        }
        day = add_days(day, -1);
    }
    streak
}

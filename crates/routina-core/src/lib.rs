//! # Routina Core Library
//!
//! Core logic for Routina, a local recurring-task tracker. Users define
//! task templates that repeat daily or on chosen weekdays; each calendar day
//! gets its own occurrence of every applicable template, and finishing an
//! occurrence records the day in the template's completion history.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure rules deciding whether a template applies on a day
//! - **Sync**: materializes a day's occurrences, reusing stored progress
//! - **Completion**: progress counting and completion history
//! - **Storage**: SQLite store behind the [`TrackerStore`] trait, TOML config
//! - **State**: [`Tracker`], the in-memory view driven by the above
//!
//! The CLI binary in `routina-cli` is a thin shell over this crate.

pub mod dates;
pub mod error;
pub mod routine;
pub mod state;
pub mod stats;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use routine::{DayOfWeek, Occurrence, RepeatType, Template, TemplateForm};
pub use state::Tracker;
pub use stats::{DayStats, Summary};
pub use storage::{Config, TrackerDb, TrackerStore};

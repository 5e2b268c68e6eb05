//! Progress commands: `done` and `toggle`.

use chrono::Utc;
use routina_core::dates::{format_date, today};
use routina_core::{Config, Occurrence, Tracker, TrackerDb};

use super::{require_template, resolve_date, CliResult};

enum Step {
    Increment,
    Toggle,
}

fn apply(template_id: &str, date: Option<&str>, step: Step) -> CliResult {
    let date = resolve_date(date)?;
    let db = TrackerDb::open()?;
    require_template(&db, template_id)?;

    let show_all = Config::load()?.display.show_all;
    let mut tracker = Tracker::new(db, today());
    tracker.load_for_date(date, show_all);
    if let Some(err) = tracker.error() {
        return Err(err.into());
    }

    let occurrence_id = Occurrence::id_for(template_id, date);
    if !tracker.occurrences().iter().any(|o| o.id == occurrence_id) {
        return Err(format!(
            "template {template_id} is not scheduled on {}",
            format_date(date)
        )
        .into());
    }

    match step {
        Step::Increment => tracker.increment(&occurrence_id, Utc::now()),
        Step::Toggle => tracker.toggle(&occurrence_id, Utc::now()),
    }
    if let Some(err) = tracker.error() {
        return Err(err.into());
    }

    if let Some(occ) = tracker.occurrences().iter().find(|o| o.id == occurrence_id) {
        let state = if occ.completed { "completed" } else { "open" };
        println!(
            "{} {}: {}/{} ({state})",
            format_date(occ.date),
            occ.title,
            occ.completed_count,
            occ.count
        );
    }
    Ok(())
}

pub fn done(template_id: &str, date: Option<&str>) -> CliResult {
    apply(template_id, date, Step::Increment)
}

pub fn toggle(template_id: &str, date: Option<&str>) -> CliResult {
    apply(template_id, date, Step::Toggle)
}

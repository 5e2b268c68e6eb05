//! Day view: materialize and print one day's occurrences.

use routina_core::dates::{format_date, today};
use routina_core::stats::{order_incomplete_first, summary};
use routina_core::{Config, Occurrence, Tracker, TrackerDb};
use serde::Serialize;

use super::{resolve_date, CliResult};

#[derive(Serialize)]
struct DayView<'a> {
    date: String,
    is_today: bool,
    occurrences: &'a [Occurrence],
    summary: routina_core::Summary,
}

fn line(occ: &Occurrence) -> String {
    let mark = if occ.completed { "x" } else { " " };
    let time = occ
        .time
        .as_deref()
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();
    format!(
        "[{mark}] {}{}  {}/{}  ({})",
        occ.title, time, occ.completed_count, occ.count, occ.template_id
    )
}

pub fn run(date: Option<&str>, all: bool, json: bool) -> CliResult {
    let date = resolve_date(date)?;
    let config = Config::load()?;
    let mut tracker = Tracker::new(TrackerDb::open()?, today());
    tracker.load_for_date(date, all || config.display.show_all);
    if let Some(err) = tracker.error() {
        return Err(err.into());
    }

    let mut occurrences = tracker.occurrences().to_vec();
    if config.display.incomplete_first {
        order_incomplete_first(&mut occurrences);
    }
    let totals = summary(&occurrences);

    if json {
        let view = DayView {
            date: format_date(date),
            is_today: tracker.is_today(),
            occurrences: &occurrences,
            summary: totals,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let heading = if tracker.is_today() {
        format!("{} (today)", format_date(date))
    } else {
        format_date(date)
    };
    println!("{heading}");
    if tracker.empty_list() {
        println!("No templates. Use 'template add' to create one.");
        return Ok(());
    }
    if occurrences.is_empty() {
        println!("Nothing scheduled.");
        return Ok(());
    }
    for occ in &occurrences {
        println!("{}", line(occ));
    }
    println!(
        "{} total, {} completed, {} remaining",
        totals.total, totals.completed, totals.remaining
    );
    Ok(())
}

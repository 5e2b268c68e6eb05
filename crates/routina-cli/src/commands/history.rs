use routina_core::dates::{format_date, today};
use routina_core::stats::current_streak;
use routina_core::TrackerDb;
use serde::Serialize;

use super::{require_template, CliResult};

#[derive(Serialize)]
struct History {
    template_id: String,
    title: String,
    completed_dates: Vec<String>,
    last_completed: Option<String>,
    current_streak: u32,
}

pub fn run(template_id: &str, json: bool) -> CliResult {
    let db = TrackerDb::open()?;
    let template = require_template(&db, template_id)?;
    let history = History {
        template_id: template.id.clone(),
        title: template.title.clone(),
        completed_dates: template
            .completed_dates
            .iter()
            .copied()
            .map(format_date)
            .collect(),
        last_completed: template.last_completed.map(|t| t.to_rfc3339()),
        current_streak: current_streak(&template, today()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!("{}  {}", history.template_id, history.title);
    println!("current streak: {}", history.current_streak);
    if history.completed_dates.is_empty() {
        println!("never completed");
    } else {
        println!("completed on {} day(s):", history.completed_dates.len());
        for day in &history.completed_dates {
            println!("  {day}");
        }
    }
    Ok(())
}

//! Month calendar built from completion histories.

use chrono::{Datelike, NaiveDate};
use routina_core::dates::{format_date, today};
use routina_core::stats::{earliest_created, month_stats};
use routina_core::{DayStats, TrackerDb, TrackerStore};
use serde::Serialize;

use super::CliResult;

#[derive(Serialize)]
struct CalendarDay {
    date: String,
    #[serde(flatten)]
    stats: DayStats,
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("'{s}' is not a YYYY-MM month");
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok((year, month))
}

pub fn run(month: Option<&str>, json: bool) -> CliResult {
    let (year, month) = match month {
        Some(m) => parse_month(m)?,
        None => {
            let now = today();
            (now.year(), now.month())
        }
    };
    let db = TrackerDb::open()?;
    let templates = db.get_all_templates();
    let days = month_stats(&templates, year, month);

    if json {
        let rows: Vec<_> = days
            .into_iter()
            .map(|(date, stats)| CalendarDay {
                date: format_date(date),
                stats,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{year}-{month:02}");
    if let Some(first) = earliest_created(&templates) {
        println!("tracking since {}", format_date(first));
    }
    for (date, stats) in days {
        if !stats.has_tasks {
            println!("{}  -", format_date(date));
            continue;
        }
        let mark = if stats.is_complete() { "  done" } else { "" };
        println!(
            "{}  {}/{}{mark}",
            format_date(date),
            stats.completed,
            stats.total
        );
    }
    Ok(())
}

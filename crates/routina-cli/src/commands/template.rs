//! Recurring template management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use routina_core::routine::{create_template, delete_template, update_template};
use routina_core::{Config, DayOfWeek, RepeatType, Template, TemplateForm, TrackerDb, TrackerStore};

use super::{require_template, CliResult};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Create a new template
    Add {
        /// Template title
        title: String,
        /// Estimated duration label, e.g. "15m"
        #[arg(long)]
        time: Option<String>,
        /// Repeat type: daily, weekly or specific_days
        #[arg(long, default_value = "daily")]
        repeat: RepeatType,
        /// Comma-separated weekdays, e.g. monday,wednesday
        #[arg(long, value_delimiter = ',')]
        days: Vec<DayOfWeek>,
        /// Repetitions per day (default: defaults.count from config)
        #[arg(long)]
        count: Option<u32>,
    },
    /// List templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a template as JSON
    Show {
        /// Template ID
        id: String,
    },
    /// Edit a template; omitted fields keep their value
    Edit {
        /// Template ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New duration label; pass "" to clear
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        repeat: Option<RepeatType>,
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<DayOfWeek>>,
        #[arg(long)]
        count: Option<u32>,
    },
    /// Delete a template and all of its occurrences
    Remove {
        /// Template ID
        id: String,
    },
}

fn describe(template: &Template) -> String {
    let schedule = match &template.repeat_days {
        Some(days) if template.repeat_type.uses_days() => {
            let names: Vec<_> = days.iter().map(DayOfWeek::as_str).collect();
            format!("{} ({})", template.repeat_type, names.join(","))
        }
        _ => template.repeat_type.to_string(),
    };
    let time = template
        .time
        .as_deref()
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();
    format!(
        "{}  {}{}  {}  x{}",
        template.id, template.title, time, schedule, template.count
    )
}

pub fn run(action: TemplateAction) -> CliResult {
    let db = TrackerDb::open()?;

    match action {
        TemplateAction::Add {
            title,
            time,
            repeat,
            days,
            count,
        } => {
            let count = match count {
                Some(c) => c,
                None => Config::load()?.defaults.count,
            };
            let form = TemplateForm {
                title,
                time,
                repeat_type: repeat,
                repeat_days: days,
                count,
            };
            let template = create_template(&db, &form, Utc::now())?;
            println!("Template created: {}", template.id);
        }
        TemplateAction::List { json } => {
            let templates = db.get_all_templates();
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else if templates.is_empty() {
                println!("No templates. Use 'template add' to create one.");
            } else {
                for template in &templates {
                    println!("{}", describe(template));
                }
            }
        }
        TemplateAction::Show { id } => {
            let template = require_template(&db, &id)?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        TemplateAction::Edit {
            id,
            title,
            time,
            repeat,
            days,
            count,
        } => {
            let existing = require_template(&db, &id)?;
            let mut form = TemplateForm::from_template(&existing);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(time) = time {
                form.time = Some(time);
            }
            if let Some(repeat) = repeat {
                form.repeat_type = repeat;
            }
            if let Some(days) = days {
                form.repeat_days = days;
            }
            if let Some(count) = count {
                form.count = count;
            }
            let template = update_template(&db, &id, &form, Utc::now())?;
            println!("Template updated: {}", describe(&template));
        }
        TemplateAction::Remove { id } => {
            require_template(&db, &id)?;
            delete_template(&db, &id)?;
            println!("Template deleted: {id}");
        }
    }
    Ok(())
}

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "routina", version, about = "Routina recurring task tracker")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recurring template management
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Show the occurrences of a day (default: today)
    Day {
        /// Date as YYYY-MM-DD or an ISO timestamp
        date: Option<String>,
        /// Include templates not scheduled on this weekday
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Advance a template's occurrence by one step
    Done {
        /// Template ID
        template_id: String,
        /// Date as YYYY-MM-DD or an ISO timestamp (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Reopen a completed occurrence, or advance an open one
    Toggle {
        /// Template ID
        template_id: String,
        /// Date as YYYY-MM-DD or an ISO timestamp (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Per-day completion for a month
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Completion history and streak of a template
    History {
        /// Template ID
        template_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Template { action } => commands::template::run(action),
        Commands::Day { date, all, json } => commands::day::run(date.as_deref(), all, json),
        Commands::Done { template_id, date } => {
            commands::progress::done(&template_id, date.as_deref())
        }
        Commands::Toggle { template_id, date } => {
            commands::progress::toggle(&template_id, date.as_deref())
        }
        Commands::Calendar { month, json } => commands::calendar::run(month.as_deref(), json),
        Commands::History { template_id, json } => commands::history::run(&template_id, json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "routina", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

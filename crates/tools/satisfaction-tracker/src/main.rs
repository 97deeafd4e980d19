//! User satisfaction & interest tracking.
//!
//! Records emotional signals, analyzes patterns, and generates the
//! behavioural insight documents read by the agent on startup.

use anyhow::Result;
use camino::Utf8PathBuf;
use chrono::Utc;
use claw_common::ClawConfig;
use claw_memory::{SatisfactionTracker, Signal, WorkspaceLayout, detect_signal};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "satisfaction-tracker")]
#[command(about = "Track user satisfaction signals and derive behavioural insights")]
#[command(version)]
struct Cli {
    /// Workspace root
    #[arg(long, global = true, env = "CLAW_WORKSPACE")]
    workspace: Option<Utf8PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a satisfaction incident
    Record {
        /// negative, positive or interested
        signal: Signal,
        context: String,
        user_msg: String,
        my_response: String,
        analysis: Option<String>,
    },
    /// Analyze patterns over the last N days
    Analyze {
        #[arg(default_value_t = 7)]
        days: i64,
    },
    /// Write today's summary to memory/satisfaction-insights
    DailySummary,
    /// Regenerate LEARNING.md
    UpdateLearning,
    /// Print the signal detected in a message
    Detect { message: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    claw_common::logging::init(cli.verbose);

    let config = ClawConfig::from_env(cli.workspace);
    let tracker = SatisfactionTracker::new(WorkspaceLayout::new(config.workspace));
    let now = Utc::now();

    match cli.command {
        Commands::Record {
            signal,
            context,
            user_msg,
            my_response,
            analysis,
        } => {
            let id = tracker.record(
                signal,
                &context,
                &user_msg,
                &my_response,
                analysis.as_deref(),
                now,
            )?;
            println!("Recorded incident: {}", id);
        }

        Commands::Analyze { days } => {
            let patterns = tracker.analyze(days, now)?;
            println!("{}", serde_json::to_string_pretty(&patterns)?);
        }

        Commands::DailySummary => match tracker.daily_summary(now)? {
            Some(path) => println!("Daily summary saved: {}", path),
            None => println!("No satisfaction incidents recorded today."),
        },

        Commands::UpdateLearning => {
            let path = tracker.update_learning(now)?;
            println!("Learning document updated: {}", path);
        }

        Commands::Detect { message } => match detect_signal(&message) {
            Some(signal) => println!("{}", signal),
            None => println!("none"),
        },
    }

    Ok(())
}

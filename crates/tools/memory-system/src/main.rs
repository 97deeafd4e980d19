//! Unified interface for experiential memory.
//!
//! Usage:
//!   memory-system boot             # Run at session start
//!   memory-system process "msg"    # Process a message
//!   memory-system save "content"   # Save to memory
//!   memory-system search "query"   # Search memory
//!   memory-system status           # System status
//!   memory-system daily            # Run daily consolidation

use anyhow::Result;
use camino::Utf8PathBuf;
use chrono::Utc;
use claw_common::ClawConfig;
use claw_memory::system::format_status;
use claw_memory::MemorySystem;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "memory-system")]
#[command(about = "Unified memory system")]
#[command(version)]
struct Cli {
    /// Workspace root
    #[arg(long, global = true, env = "CLAW_WORKSPACE")]
    workspace: Option<Utf8PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the memory system for a new session
    Boot,
    /// Process a message through the full pipeline
    Process { message: Option<String> },
    /// Save content to memory
    Save {
        content: Option<String>,
        /// Title for save
        #[arg(short, long)]
        title: Option<String>,
        /// Category for save
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search memories
    Search { query: Option<String> },
    /// Show system status
    Status,
    /// Run daily consolidation
    Daily,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    claw_common::logging::init(cli.verbose);

    let system = MemorySystem::new(ClawConfig::from_env(cli.workspace));
    let now = Utc::now();

    match cli.command {
        Commands::Boot => {
            let result = system.boot(now)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("🚀 Memory System Booted");
                for action in &result.actions {
                    let mark = if action.success.unwrap_or(true) { "✅" } else { "❌" };
                    println!("   {} {}", mark, action.action);
                }
                println!("\nStatus: {}", result.status);
            }
        }

        Commands::Process { message } => {
            let message = required(message, "message");
            let result = system.process(&message, now)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("Debug: {}", result.debug);
                if let Some(flag) = &result.flag {
                    println!("⚠️ {}: {}", flag, result.actions.join(", "));
                }
            }
        }

        Commands::Save {
            content,
            title,
            category,
        } => {
            let content = required(content, "content");
            let result = system.save(&content, title.as_deref(), category.as_deref(), now)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("✅ Saved to {}", result.file);
            }
        }

        Commands::Search { query } => {
            let query = required(query, "query");
            let hits = system.search(&query)?;
            if hits.is_empty() {
                println!("No memories matching '{}'", query);
            }
            for hit in hits {
                println!("memory/{} ({} matches)", hit.file, hit.lines.len());
                for (line, text) in hit.lines {
                    println!("  {}: {}", line, text);
                }
            }
        }

        Commands::Status => {
            let status = system.status()?;
            if cli.json {
                print_json(&status)?;
            } else {
                println!("{}", format_status(&status));
            }
        }

        Commands::Daily => {
            let result = system.daily(now)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("🌙 Daily Consolidation");
                for action in &result.actions {
                    println!("\n### {}", action.action);
                    let output = action.output.as_deref().unwrap_or("");
                    println!("{}", output.chars().take(300).collect::<String>());
                }
            }
        }
    }

    Ok(())
}

/// Unwrap a positional argument or exit with the usage error.
fn required(value: Option<String>, what: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            eprintln!("Error: {} required", what);
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

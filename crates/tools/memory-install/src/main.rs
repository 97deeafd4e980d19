//! Workspace initializer for the experiential memory plugin.
//!
//! Creates `scripts/`, `memory/_experimental/` and `raw/` under the workspace,
//! copies the companion tools next to this binary into `scripts/`, and seeds
//! `memory/_experimental/session-context.json`.

mod install;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use install::{ContextWrite, Installer};

const USAGE: &str = "Usage: memory-install <workspace-path>\nExample: memory-install ~/clawd";

#[derive(Parser)]
#[command(name = "memory-install")]
#[command(about = "Install the experiential memory tools into an OpenClaw workspace")]
#[command(version)]
struct Cli {
    /// Workspace root (e.g. ~/clawd)
    workspace: Option<Utf8PathBuf>,

    /// Directory holding the companion tools (defaults to this binary's directory)
    #[arg(long, value_name = "DIR")]
    source: Option<Utf8PathBuf>,

    /// Keep an existing session-context.json instead of resetting it
    #[arg(long)]
    keep_context: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    claw_common::logging::init(cli.verbose);

    let Some(workspace) = cli.workspace else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    let source = match cli.source {
        Some(dir) => dir,
        None => own_dir()?,
    };
    tracing::debug!(workspace = %workspace, source = %source, "installing");

    let installer = Installer::new(workspace, source).keep_context(cli.keep_context);
    let root = installer.layout().root().to_path_buf();

    println!("🧠 Installing experiential memory into {}", root);
    installer.check()?;

    for dir in installer.create_dirs()? {
        println!("   ✓ {}/", relative(&root, &dir));
    }
    for tool in installer.copy_tools()? {
        println!("   ✓ {} (executable)", relative(&root, &tool));
    }

    let context_path = installer.layout().session_context_path();
    match installer.write_context()? {
        ContextWrite::Written => println!("   ✓ {} (reset)", relative(&root, &context_path)),
        ContextWrite::Kept => println!("   ✓ {} (kept)", relative(&root, &context_path)),
    }

    println!();
    println!("✅ Installed.");
    println!();
    println!("Next steps:");
    println!("  1. Enable the message:received hook in openclaw.json and point it at message-received");
    println!("  2. Set CLAW_ANALYZER_CMD to the command that scores a message");
    println!("  3. Schedule nightly consolidation: {}/scripts/memory-system daily", root);
    println!("  4. Restart the gateway so the hook is picked up");

    Ok(())
}

/// Directory of the running executable.
fn own_dir() -> Result<Utf8PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the installer binary")?;
    let exe = Utf8PathBuf::from_path_buf(exe)
        .map_err(|p| anyhow::anyhow!("installer path is not UTF-8: {}", p.display()))?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .context("installer binary has no parent directory")
}

fn relative(root: &camino::Utf8Path, path: &camino::Utf8Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.to_string())
        .unwrap_or_else(|_| path.to_string())
}

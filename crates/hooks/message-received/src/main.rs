//! message:received hook: score every incoming message.
//!
//! Appends the message to `raw/<date>.jsonl`, runs it through the memory
//! pipeline and refreshes `memory/_experimental/session-context.json`. The
//! rendered debug tag is returned to the host as additional context.

use chrono::Utc;
use claw_common::prelude::*;
use claw_memory::MemorySystem;

const HOOK_NAME: &str = "message-received";

fn main() -> Result<()> {
    claw_common::logging::init(0);
    let input = MessageReceived::from_stdin()?;

    let config = match input.workspace_dir.as_deref().filter(|d| !d.is_empty()) {
        Some(dir) => ClawConfig::from_env(Some(Utf8PathBuf::from(dir))),
        None => ClawConfig::from_env(None),
    };
    let workspace = config.workspace.clone();

    let text = input.text();
    if text.trim().is_empty() {
        log_decision(&workspace, HOOK_NAME, "", "skip", "empty body");
        return Ok(());
    }

    let system = MemorySystem::new(config);
    let (outcome, context) = match system.handle_message(&input, Utc::now()) {
        Ok(result) => result,
        Err(e) => {
            log_decision(&workspace, HOOK_NAME, text, "error", &e.to_string());
            return Err(e);
        }
    };

    let log = HookDebugLog::new(HOOK_NAME, "message:received")
        .with_input(text)
        .with_decision("scored", &format!("combined {:.1}", outcome.score))
        .with_context(&context.debug_tag);
    if let Err(e) = log.write(&workspace) {
        tracing::warn!(error = %e, "failed to write hook debug log");
    }

    let output = HookOutput::message_received()
        .with_context(context.debug_tag.clone())
        .with_data(serde_json::json!({
            "score": outcome.score,
            "emoji": outcome.emoji,
            "flags": outcome.flags,
            "actions": outcome.actions,
            "sessionContextCount": context.session_context_count,
        }));
    output.write_stdout()?;

    Ok(())
}

//! Shell slash commands.

mod render;


pub use render::{render_history, render_queue, render_suggestions};

use crate::sync::{SyncCoordinator, UndoOutcome};
use stride_core::{error::StrideError, model::Priority};

/// Known shell commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add N text`, holding the raw arguments after the command word.
    Add(String),
    List,
    History,
    Undo,
    Refresh,
    Help,
    Quit,
}

impl Command {
    /// Parse a shell line. Returns `None` for anything that is not a known
    /// command (which the shell treats as search input).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let cmd = text.split_whitespace().next()?;
        let rest = text[cmd.len()..].trim();
        match cmd {
            "/add" => Some(Self::Add(rest.to_string())),
            "/list" | "/ls" => Some(Self::List),
            "/history" => Some(Self::History),
            "/undo" => Some(Self::Undo),
            "/refresh" => Some(Self::Refresh),
            "/help" => Some(Self::Help),
            "/quit" | "/exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Split `/add` arguments into a priority and reminder text.
pub fn parse_add_args(args: &str) -> Result<(Priority, String), String> {
    let mut parts = args.trim().splitn(2, char::is_whitespace);
    let raw = parts.next().unwrap_or_default();
    let text = parts.next().unwrap_or_default().trim();
    if raw.is_empty() || text.is_empty() {
        return Err("Usage: /add <priority 1-10> <text>".to_string());
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a priority. Usage: /add <priority 1-10> <text>"))?;
    let priority = Priority::new(value).map_err(|e| e.to_string())?;
    Ok((priority, text.to_string()))
}

/// Handle a command and return the response text. `Quit` is handled by the
/// shell loop and answers with an empty string here.
pub async fn handle(cmd: Command, coord: &SyncCoordinator) -> String {
    match cmd {
        Command::Add(args) => handle_add(coord, &args).await,
        Command::List => render_queue(&coord.queue_view()),
        Command::History => render_history(&coord.history_view()),
        Command::Undo => handle_undo(coord).await,
        Command::Refresh => match coord.refresh().await {
            Ok(()) => format!(
                "Refreshed: {} reminders, {} history entries.",
                coord.queue_view().len(),
                coord.history_view().len()
            ),
            Err(e) => format!("Refresh failed: {e}"),
        },
        Command::Help => handle_help(),
        Command::Quit => String::new(),
    }
}

pub async fn handle_add(coord: &SyncCoordinator, args: &str) -> String {
    let (priority, text) = match parse_add_args(args) {
        Ok(parsed) => parsed,
        Err(usage) => return usage,
    };
    match coord.submit(priority, &text).await {
        Ok(out) => {
            let mut msg = format!("Added {} (p{priority}): {text}", out.id);
            if let Some(link) = out.link {
                msg.push_str(&format!("\n  tutorial: {link}"));
            }
            if !out.history_synced {
                msg.push_str("\n  (history entry not saved remotely)");
            }
            msg
        }
        Err(StrideError::RemoteCreateFailure(reason)) => {
            format!("Could not add reminder, change rolled back: {reason}")
        }
        Err(e) => format!("Could not add reminder: {e}"),
    }
}

pub async fn handle_undo(coord: &SyncCoordinator) -> String {
    match coord.undo().await {
        Ok(UndoOutcome::Undone { entry, inverse }) => {
            let mut msg = format!("Undone: {}", entry.action.label());
            match inverse.as_ref().and_then(|inv| coord.locate(inv)) {
                Some(task) => msg.push_str(&format!(
                    "\n  (reminders are kept; {} {} is still queued)",
                    task.id(),
                    task.text()
                )),
                None if inverse.is_some() => {
                    msg.push_str("\n  (reminders are kept; no matching reminder is queued)")
                }
                None => {}
            }
            msg
        }
        Ok(UndoOutcome::NothingToUndo) => "Nothing to undo.".to_string(),
        Err(e) => format!("Undo failed: {e}"),
    }
}

fn handle_help() -> String {
    "Commands\n\
     /add N text  add a reminder with priority N (1-10)\n\
     /list        show reminders, most urgent first\n\
     /history     show recent actions\n\
     /undo        undo the most recent action\n\
     /refresh     reload from the server\n\
     /help        this message\n\
     /quit        leave\n\
     Anything else searches exercises and foods."
        .to_string()
}

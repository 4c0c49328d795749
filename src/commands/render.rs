//! Plain-text views of the queue, history and suggestions.

use stride_core::model::{HistoryEntry, ReminderTask};

pub fn render_queue(tasks: &[ReminderTask]) -> String {
    if tasks.is_empty() {
        return "No reminders.".to_string();
    }
    let mut out = String::from("Reminders");
    for task in tasks {
        let marker = if task.is_pending() { " (saving…)" } else { "" };
        out.push_str(&format!(
            "\n  [{:>2}] {}{marker}",
            task.priority().get(),
            task.text()
        ));
        if let Some(link) = task.link() {
            out.push_str(&format!("\n       {link}"));
        }
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history yet.".to_string();
    }
    let mut out = String::from("History (most recent first)");
    for entry in entries {
        if entry.time.is_empty() {
            out.push_str(&format!("\n  {}", entry.action.label()));
        } else {
            out.push_str(&format!("\n  {}  {}", entry.time, entry.action.label()));
        }
    }
    out
}

pub fn render_suggestions(query: &str, names: &[String]) -> String {
    if names.is_empty() {
        return format!("No matches for \"{query}\".");
    }
    format!("Matches for \"{query}\": {}", names.join(", "))
}

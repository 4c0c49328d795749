//! Reminder and history data model shared by every Stride crate.

use crate::error::StrideError;
use crate::links::LinkResolver;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest accepted priority.
pub const MAX_PRIORITY: u8 = 10;

/// Reminder priority in `1..=10`, higher is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    /// Validate a user-supplied priority.
    pub fn new(value: i64) -> Result<Self, StrideError> {
        if (MIN_PRIORITY as i64..=MAX_PRIORITY as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(StrideError::InvalidPriority(value))
        }
    }

    /// Clamp a priority reported by the remote store into range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = StrideError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> Self {
        p.0 as i64
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session-local reminder identifier.
///
/// Ids are handed out by the coordinator and are only meaningful for the
/// lifetime of one session: a refresh assigns fresh ids to every remote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reminder classification derived from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Workout,
    General,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "Workout",
            Self::General => "General",
        }
    }
}

/// Whether the remote store has acknowledged a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Inserted locally, create call not yet acknowledged.
    Pending,
    /// Acknowledged by, or loaded from, the remote store.
    Confirmed,
}

/// A reminder in the local queue. Kind and link are derived from the text
/// at construction and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTask {
    id: TaskId,
    priority: Priority,
    text: String,
    kind: TaskKind,
    link: Option<String>,
    sync: SyncState,
}

impl ReminderTask {
    /// A locally submitted reminder awaiting remote confirmation.
    pub fn pending(id: TaskId, priority: Priority, text: &str, links: &LinkResolver) -> Self {
        Self::build(id, priority, text, links, SyncState::Pending)
    }

    /// A reminder that came from the authoritative snapshot.
    pub fn confirmed(id: TaskId, priority: Priority, text: &str, links: &LinkResolver) -> Self {
        Self::build(id, priority, text, links, SyncState::Confirmed)
    }

    fn build(
        id: TaskId,
        priority: Priority,
        text: &str,
        links: &LinkResolver,
        sync: SyncState,
    ) -> Self {
        let link = links.resolve(text);
        let kind = if link.is_some() {
            TaskKind::Workout
        } else {
            TaskKind::General
        };
        Self {
            id,
            priority,
            text: text.to_string(),
            kind,
            link,
            sync,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    pub fn is_pending(&self) -> bool {
        self.sync == SyncState::Pending
    }

    /// Record the remote acknowledgement of this reminder.
    pub fn mark_confirmed(&mut self) {
        self.sync = SyncState::Confirmed;
    }
}

/// Authoritative queue contents from the remote store, priority-descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    entries: Vec<(Priority, String)>,
}

impl QueueSnapshot {
    /// Build a snapshot from rows in any order. Rows are stable-sorted by
    /// priority, highest first, so equal priorities keep the store's order.
    pub fn from_rows(rows: Vec<(Priority, String)>) -> Self {
        let mut entries = rows;
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(Priority, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The action an history entry records, with enough data to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// A reminder was added to the queue. Identified by its content, which
    /// is all the remote store keeps; local task ids do not outlive a merge.
    AddReminder { priority: Priority, text: String },
    /// A workout was logged from the workout tracker.
    AddWorkout { title: String },
    /// Free-form entry with nothing to invert.
    Note { message: String },
}

/// The operation that would reverse a [`HistoryAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InverseAction {
    /// Remove the reminder with this priority and text.
    RemoveReminder { priority: Priority, text: String },
}

impl HistoryAction {
    /// Human-readable label, as shown in the history panel.
    pub fn label(&self) -> String {
        match self {
            Self::AddReminder { text, .. } => format!("Added: {text}"),
            Self::AddWorkout { title } => format!("Added Workout: {title}"),
            Self::Note { message } => message.clone(),
        }
    }

    pub fn inverse(&self) -> Option<InverseAction> {
        match self {
            Self::AddReminder { priority, text } => Some(InverseAction::RemoveReminder {
                priority: *priority,
                text: text.clone(),
            }),
            Self::AddWorkout { .. } | Self::Note { .. } => None,
        }
    }
}

/// A recorded action in the local history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub ordinal: u64,
    pub action: HistoryAction,
    pub time: String,
}

impl HistoryEntry {
    pub fn new(ordinal: u64, action: HistoryAction, time: impl Into<String>) -> Self {
        Self {
            ordinal,
            action,
            time: time.into(),
        }
    }

    /// Wire form sent to the remote history log.
    pub fn to_record(&self) -> HistoryRecord {
        HistoryRecord {
            action: self.action.clone(),
            time: self.time.clone(),
            ordinal: Some(self.ordinal),
        }
    }
}

/// History entry as stored by the remote log.
///
/// Records written by Stride carry a `kind` tag plus the fields needed to
/// rebuild the [`HistoryAction`]. Older records only carry a free-text
/// `action` (string or `{message}` object) or the workout tracker's
/// `ADD_WORKOUT` shape, and decode to `Note` / `AddWorkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord", into = "RawRecord")]
pub struct HistoryRecord {
    pub action: HistoryAction,
    pub time: String,
    /// Ordinal of the local entry that produced this record, if any.
    pub ordinal: Option<u64>,
}

const KIND_ADD_REMINDER: &str = "add_reminder";
const LEGACY_ADD_WORKOUT: &str = "ADD_WORKOUT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawRecord {
    #[serde(default)]
    action: serde_json::Value,
    #[serde(default)]
    time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ordinal: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl From<RawRecord> for HistoryRecord {
    fn from(raw: RawRecord) -> Self {
        let label = match &raw.action {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Action")
                .to_string(),
            _ => "Action".to_string(),
        };

        let action = match (raw.kind.as_deref(), raw.text) {
            (Some(KIND_ADD_REMINDER), Some(text)) => HistoryAction::AddReminder {
                priority: Priority::clamped(raw.priority.unwrap_or(1)),
                text,
            },
            _ if label == LEGACY_ADD_WORKOUT => {
                let title = raw
                    .data
                    .as_ref()
                    .and_then(|d| d.get("title"))
                    .and_then(|t| t.as_str());
                match title {
                    Some(title) => HistoryAction::AddWorkout {
                        title: title.to_string(),
                    },
                    None => HistoryAction::Note { message: label },
                }
            }
            _ => HistoryAction::Note { message: label },
        };

        Self {
            action,
            time: raw.time.unwrap_or_default(),
            ordinal: raw.ordinal,
        }
    }
}

impl From<HistoryRecord> for RawRecord {
    fn from(record: HistoryRecord) -> Self {
        let label = record.action.label();
        let mut raw = RawRecord {
            time: Some(record.time),
            ordinal: record.ordinal,
            ..Default::default()
        };
        match record.action {
            HistoryAction::AddReminder { priority, text } => {
                raw.action = serde_json::Value::String(label);
                raw.kind = Some(KIND_ADD_REMINDER.to_string());
                raw.priority = Some(priority.into());
                raw.text = Some(text);
            }
            HistoryAction::AddWorkout { title } => {
                raw.action = serde_json::Value::String(LEGACY_ADD_WORKOUT.to_string());
                raw.data = Some(serde_json::json!({ "title": title }));
            }
            HistoryAction::Note { message } => {
                raw.action = serde_json::Value::String(message);
            }
        }
        raw
    }
}

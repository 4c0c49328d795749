use crate::{
    error::StrideError,
    model::{HistoryRecord, Priority, QueueSnapshot},
};
use async_trait::async_trait;

/// Remote store trait: the authoritative side of every sync.
///
/// Every backend (the REST API, the in-process store used offline and in
/// tests) implements this trait. All calls are plain request/response; the
/// coordinator owns ordering and retries nothing on its own.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Fetch the full reminder queue, priority-descending.
    async fn fetch_reminders(&self) -> Result<QueueSnapshot, StrideError>;

    /// Enqueue a reminder. Equal priorities keep arrival order server-side.
    async fn create_reminder(&self, priority: Priority, text: &str) -> Result<(), StrideError>;

    /// Fetch the history log, most recent first.
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, StrideError>;

    /// Append a record to the head of the history log.
    async fn push_history(&self, record: &HistoryRecord) -> Result<(), StrideError>;

    /// Remove the head of the history log. `Ok(None)` means the log was
    /// empty, which is a normal outcome rather than an error.
    async fn pop_history(&self) -> Result<Option<HistoryRecord>, StrideError>;

    /// Case-insensitive name suggestions for a search query.
    async fn search(&self, query: &str) -> Result<Vec<String>, StrideError>;
}

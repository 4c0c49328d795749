//! Sync coordinator. Keeps the local reminder queue and history stack in
//! step with the remote store.
//!
//! Local edits are applied optimistically and reconciled when the remote
//! call settles. Every remote mutation and every refresh goes through one
//! FIFO gate, so at most one of them is in flight and they reach the store
//! in the order the user triggered them. Search runs outside the gate under
//! a latest-sequence-wins rule.

mod search;
mod submit;
mod undo;

#[cfg(test)]
mod tests;

pub use search::SearchPhase;
pub use submit::SubmitOutcome;
pub use undo::UndoOutcome;

use search::SearchTracker;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use stride_core::{
    config::Config,
    error::StrideError,
    links::LinkResolver,
    model::{HistoryEntry, InverseAction, ReminderTask, TaskId},
    traits::ReminderStore,
};
use stride_state::{HistoryStack, ReminderQueue};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Notifications published after local state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    QueueChanged,
    HistoryChanged,
    /// A search response was applied as the current suggestions.
    SuggestionsApplied {
        seq: u64,
        query: String,
        names: Vec<String>,
    },
    /// A search response arrived after a newer keystroke and was dropped.
    SuggestionsDiscarded { seq: u64 },
    /// The current search failed. Suggestions are left as they were.
    SuggestionsFailed { seq: u64, reason: String },
    /// An optimistic insert was removed because the remote create failed.
    CreateRolledBack { id: TaskId, reason: String },
}

/// Per-session local state. Lives as long as the coordinator.
#[derive(Default)]
struct Session {
    queue: ReminderQueue,
    history: HistoryStack,
    search: SearchTracker,
}

struct Shared {
    id: Uuid,
    store: Arc<dyn ReminderStore>,
    links: LinkResolver,
    debounce: Duration,
    session: Mutex<Session>,
    /// Serializes remote mutations and refreshes (tokio's mutex is FIFO).
    gate: tokio::sync::Mutex<()>,
    events: mpsc::UnboundedSender<SyncEvent>,
}

/// Drives fetch, create, undo and search against the remote store.
///
/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct SyncCoordinator {
    shared: Arc<Shared>,
}

impl SyncCoordinator {
    /// Create a coordinator with an empty session. Call [`Self::start`] to
    /// load the authoritative state.
    pub fn new(
        store: Arc<dyn ReminderStore>,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            id: Uuid::new_v4(),
            store,
            links: LinkResolver::from_config(&config.links),
            debounce: config.search.debounce(),
            session: Mutex::new(Session::default()),
            gate: tokio::sync::Mutex::new(()),
            events: tx,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    /// Session start: fetch the reminder queue and history log.
    pub async fn start(&self) -> Result<(), StrideError> {
        info!(
            "sync session {} starting | store: {} | debounce: {}ms",
            self.shared.id,
            self.shared.store.name(),
            self.shared.debounce.as_millis()
        );
        self.refresh().await
    }

    /// Replace local state with the remote snapshot, keeping pending edits.
    ///
    /// Waits for any in-flight create or undo to settle first.
    pub async fn refresh(&self) -> Result<(), StrideError> {
        let _gate = self.shared.gate.lock().await;
        let store = &self.shared.store;
        let (snapshot, records) = tokio::try_join!(store.fetch_reminders(), store.fetch_history())?;

        {
            let mut session = self.session();
            let reapplied = session.queue.merge(&snapshot, &self.shared.links);
            let history_len = session.history.load(records);
            info!(
                "sync refresh: {} reminders ({} pending re-applied), {} history entries",
                session.queue.len(),
                reapplied,
                history_len
            );
        }
        self.emit(SyncEvent::QueueChanged);
        self.emit(SyncEvent::HistoryChanged);
        Ok(())
    }

    /// Current queue, most urgent first.
    pub fn queue_view(&self) -> Vec<ReminderTask> {
        self.session().queue.view().to_vec()
    }

    /// Current history, most recent first.
    pub fn history_view(&self) -> Vec<HistoryEntry> {
        self.session().history.iter().cloned().collect()
    }

    /// The queued task an inverse action refers to, if it is still there.
    pub fn locate(&self, inverse: &InverseAction) -> Option<ReminderTask> {
        self.session().queue.locate(inverse).cloned()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.session().search.suggestions().to_vec()
    }

    pub fn search_phase(&self) -> SearchPhase {
        self.session().search.phase()
    }

    /// Session end: cancel any pending debounce timer.
    pub fn shutdown(&self) {
        self.session().search.cancel_timer();
        info!("sync session {} closed", self.shared.id);
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // The session is only mutated in short non-panicking sections; a
        // poisoned lock still holds consistent data.
        self.shared
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SyncEvent) {
        if self.shared.events.send(event).is_err() {
            debug!("sync event dropped: receiver closed");
        }
    }
}

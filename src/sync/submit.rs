//! Reminder creation: optimistic insert, remote create, rollback.

use super::{Session, SyncCoordinator, SyncEvent};
use stride_core::{
    error::StrideError,
    links::LinkResolver,
    model::{HistoryAction, HistoryEntry, HistoryRecord, Priority, ReminderTask, TaskId, TaskKind},
};
use tracing::{info, warn};

/// What a successful [`SyncCoordinator::submit`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub id: TaskId,
    pub kind: TaskKind,
    pub link: Option<String>,
    /// False when the reminder was created but its history record could not
    /// be pushed. The local entry stays until the next refresh.
    pub history_synced: bool,
}

/// A local create that can be reversed if the remote side rejects it.
pub(super) struct CreateReminder {
    id: TaskId,
    ordinal: u64,
    record: HistoryRecord,
}

impl CreateReminder {
    /// Insert the pending task and its history entry.
    pub(super) fn apply(
        session: &mut Session,
        links: &LinkResolver,
        priority: Priority,
        text: &str,
        time: String,
    ) -> Self {
        let id = session.queue.allocate_id();
        session
            .queue
            .insert(ReminderTask::pending(id, priority, text, links));

        let ordinal = session.history.allocate_ordinal();
        let entry = HistoryEntry::new(
            ordinal,
            HistoryAction::AddReminder {
                priority,
                text: text.to_string(),
            },
            time,
        );
        let record = entry.to_record();
        session.history.push_pending(entry);

        Self {
            id,
            ordinal,
            record,
        }
    }

    /// Undo [`Self::apply`]. Leaves every other task and entry in place.
    pub(super) fn compensate(&self, session: &mut Session) {
        session.queue.remove(self.id);
        session.history.remove(self.ordinal);
    }
}

/// Local wall-clock time as shown in the history panel.
pub(super) fn now_time() -> String {
    chrono::Local::now().format("%-I:%M:%S %p").to_string()
}

impl SyncCoordinator {
    /// Add a reminder.
    ///
    /// The task shows up immediately as pending. Once the remote create
    /// succeeds it is confirmed and its history record pushed; if the create
    /// fails the insert is rolled back and
    /// [`StrideError::RemoteCreateFailure`] is returned.
    pub async fn submit(&self, priority: Priority, text: &str) -> Result<SubmitOutcome, StrideError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StrideError::EmptyText);
        }

        let (cmd, kind, link) = {
            let mut session = self.session();
            let cmd = CreateReminder::apply(
                &mut session,
                &self.shared.links,
                priority,
                text,
                now_time(),
            );
            let task = session.queue.get(cmd.id);
            let kind = task.map(|t| t.kind()).unwrap_or(TaskKind::General);
            let link = task.and_then(|t| t.link()).map(str::to_string);
            (cmd, kind, link)
        };
        self.emit(SyncEvent::QueueChanged);
        self.emit(SyncEvent::HistoryChanged);

        let _gate = self.shared.gate.lock().await;
        let store = &self.shared.store;

        if let Err(e) = store.create_reminder(priority, text).await {
            cmd.compensate(&mut self.session());
            warn!("reminder {} rolled back: {e}", cmd.id);
            self.emit(SyncEvent::CreateRolledBack {
                id: cmd.id,
                reason: e.to_string(),
            });
            self.emit(SyncEvent::QueueChanged);
            self.emit(SyncEvent::HistoryChanged);
            return Err(StrideError::RemoteCreateFailure(e.to_string()));
        }
        self.session().queue.confirm(cmd.id);

        let history_synced = match store.push_history(&cmd.record).await {
            Ok(()) => true,
            Err(e) => {
                warn!("history push for {} failed: {e}", cmd.id);
                false
            }
        };
        // Confirm either way: a refresh must then replace a failed push with
        // the remote log instead of carrying it forward.
        self.session().history.confirm(cmd.ordinal);

        info!("reminder {} created (p{priority}, {})", cmd.id, kind.as_str());
        self.emit(SyncEvent::QueueChanged);
        self.emit(SyncEvent::HistoryChanged);

        Ok(SubmitOutcome {
            id: cmd.id,
            kind,
            link,
            history_synced,
        })
    }
}

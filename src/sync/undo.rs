use super::{SyncCoordinator, SyncEvent};
use stride_core::{
    error::StrideError,
    model::{HistoryEntry, InverseAction},
};
use tracing::{debug, info};

/// Result of [`SyncCoordinator::undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The most recent entry was removed from the log. `inverse` names the
    /// operation that would reverse it; it is reported, not applied.
    Undone {
        entry: HistoryEntry,
        inverse: Option<InverseAction>,
    },
    /// The remote log was empty.
    NothingToUndo,
}

impl SyncCoordinator {
    /// Pop the most recent history entry.
    ///
    /// The remote log decides what is undone. The local entry removed is the
    /// one whose remote record carries the popped record's ordinal.
    pub async fn undo(&self) -> Result<UndoOutcome, StrideError> {
        let _gate = self.shared.gate.lock().await;
        let Some(record) = self.shared.store.pop_history().await? else {
            info!("undo: nothing to undo");
            return Ok(UndoOutcome::NothingToUndo);
        };

        let local = self.session().history.take_remote(record.ordinal);
        if local.is_none() {
            debug!("undo: remote record had no local counterpart");
        }

        let entry = local.unwrap_or_else(|| {
            HistoryEntry::new(
                record.ordinal.unwrap_or_default(),
                record.action.clone(),
                record.time.clone(),
            )
        });
        let inverse = entry.action.inverse();
        info!("undo: {}", entry.action.label());
        self.emit(SyncEvent::HistoryChanged);

        Ok(UndoOutcome::Undone { entry, inverse })
    }
}

//! LIFO action history with undo.

use std::collections::VecDeque;
use stride_core::model::{HistoryEntry, HistoryRecord, SyncState};
use tracing::debug;

/// Result of [`HistoryStack::pop`]. An empty stack yields `ok == false`,
/// which is a normal negative result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popped {
    pub entry: Option<HistoryEntry>,
    pub ok: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    entry: HistoryEntry,
    sync: SyncState,
    /// Ordinal carried by the remote record, exactly as stored there.
    /// `None` for records written without one (older clients).
    remote_ordinal: Option<u64>,
}

/// Most-recent-first history log.
///
/// Two identities per entry. `entry.ordinal` is session-local: unique within
/// the stack and never reused, but after a [`HistoryStack::load`] pending
/// entries sit on top of loaded ones with smaller ordinals. The remote
/// ordinal is the one the remote record carries and is what a remote pop is
/// matched against.
#[derive(Debug, Default)]
pub struct HistoryStack {
    slots: VecDeque<Slot>,
    next_ordinal: u64,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_ordinal(&mut self) -> u64 {
        self.next_ordinal += 1;
        self.next_ordinal
    }

    /// Push a confirmed entry on top. Returns the new size.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        self.push_with(entry, SyncState::Confirmed)
    }

    /// Push an entry whose remote push has not been acknowledged yet.
    pub fn push_pending(&mut self, entry: HistoryEntry) -> usize {
        self.push_with(entry, SyncState::Pending)
    }

    fn push_with(&mut self, entry: HistoryEntry, sync: SyncState) -> usize {
        self.next_ordinal = self.next_ordinal.max(entry.ordinal);
        let remote_ordinal = Some(entry.ordinal);
        self.slots.push_front(Slot {
            entry,
            sync,
            remote_ordinal,
        });
        self.slots.len()
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Popped {
        match self.slots.pop_front() {
            Some(slot) => Popped {
                entry: Some(slot.entry),
                ok: true,
            },
            None => Popped {
                entry: None,
                ok: false,
            },
        }
    }

    /// Remove the entry carrying `ordinal`, wherever it sits.
    pub fn remove(&mut self, ordinal: u64) -> Option<HistoryEntry> {
        let pos = self
            .slots
            .iter()
            .position(|s| s.entry.ordinal == ordinal)?;
        self.slots.remove(pos).map(|s| s.entry)
    }

    /// Remove the most recent entry whose remote record carries
    /// `remote_ordinal`. Used to mirror a remote pop; `None` matches the most
    /// recent entry loaded from a record without an ordinal.
    pub fn take_remote(&mut self, remote_ordinal: Option<u64>) -> Option<HistoryEntry> {
        let pos = self
            .slots
            .iter()
            .position(|s| s.remote_ordinal == remote_ordinal)?;
        self.slots.remove(pos).map(|s| s.entry)
    }

    pub fn confirm(&mut self, ordinal: u64) -> bool {
        match self.slots.iter_mut().find(|s| s.entry.ordinal == ordinal) {
            Some(slot) => {
                slot.sync = SyncState::Confirmed;
                true
            }
            None => false,
        }
    }

    /// Replace contents with the remote log (most recent first), keeping
    /// unacknowledged local pushes on top. Returns the new size.
    pub fn load(&mut self, records: Vec<HistoryRecord>) -> usize {
        let pending: Vec<Slot> = self
            .slots
            .drain(..)
            .filter(|s| s.sync == SyncState::Pending)
            .collect();

        // Later local pushes must not reuse an ordinal already on the wire.
        let wire_max = records.iter().filter_map(|r| r.ordinal).max().unwrap_or(0);
        self.next_ordinal = self.next_ordinal.max(wire_max);

        // Walk oldest to newest so local ordinals increase towards the head.
        let mut loaded = VecDeque::with_capacity(records.len() + pending.len());
        for record in records.into_iter().rev() {
            let ordinal = self.allocate_ordinal();
            loaded.push_front(Slot {
                entry: HistoryEntry::new(ordinal, record.action, record.time),
                sync: SyncState::Confirmed,
                remote_ordinal: record.ordinal,
            });
        }

        let kept = pending.len();
        for slot in pending.into_iter().rev() {
            loaded.push_front(slot);
        }
        self.slots = loaded;
        debug!(
            "history load: {} remote, {} pending kept",
            self.slots.len() - kept,
            kept
        );
        self.slots.len()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.slots.front().map(|s| &s.entry)
    }

    /// Entries from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.slots.iter().map(|s| &s.entry)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.sync == SyncState::Pending)
            .count()
    }
}

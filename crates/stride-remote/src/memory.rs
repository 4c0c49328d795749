//! In-process authoritative store.
//!
//! Backs the `memory` backend (offline use) and the coordinator tests.
//! Latency and create failures can be injected so ordering behavior can be
//! exercised deterministically under a paused tokio clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use stride_core::{
    config::SearchScope,
    error::StrideError,
    model::{HistoryRecord, Priority, QueueSnapshot},
    traits::ReminderStore,
};
use tracing::debug;

use crate::catalog::Catalog;

#[derive(Default)]
struct Inner {
    /// Arrival order.
    reminders: Vec<(Priority, String)>,
    /// Oldest first; the head of the log is the last element.
    history: Vec<HistoryRecord>,
    failing_creates: usize,
    failing_searches: usize,
    create_delay: Duration,
    fetch_delay: Duration,
    search_delays: HashMap<String, Duration>,
    searched: Vec<String>,
}

/// Reminder store held entirely in memory.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    catalog: Catalog,
    scope: SearchScope,
    create_calls: AtomicUsize,
    creates_in_flight: AtomicUsize,
    max_creates_in_flight: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Catalog::default(), SearchScope::All)
    }
}

impl MemoryStore {
    pub fn new(catalog: Catalog, scope: SearchScope) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            catalog,
            scope,
            create_calls: AtomicUsize::new(0),
            creates_in_flight: AtomicUsize::new(0),
            max_creates_in_flight: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the data is
        // still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Preload reminders as if created earlier, in arrival order.
    pub fn seed_reminders(&self, rows: Vec<(Priority, String)>) {
        self.lock().reminders.extend(rows);
    }

    /// Preload history records, oldest first.
    pub fn seed_history(&self, records: Vec<HistoryRecord>) {
        self.lock().history.extend(records);
    }

    /// Reject the next `n` reminder creates.
    pub fn fail_next_creates(&self, n: usize) {
        self.lock().failing_creates = n;
    }

    /// Reject the next `n` searches.
    pub fn fail_next_searches(&self, n: usize) {
        self.lock().failing_searches = n;
    }

    pub fn set_create_delay(&self, delay: Duration) {
        self.lock().create_delay = delay;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.lock().fetch_delay = delay;
    }

    /// Delay answers to one exact query.
    pub fn set_search_delay(&self, query: &str, delay: Duration) {
        self.lock().search_delays.insert(query.to_string(), delay);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Highest number of create calls that were ever outstanding at once.
    pub fn max_creates_in_flight(&self) -> usize {
        self.max_creates_in_flight.load(Ordering::SeqCst)
    }

    /// Queries received by `search`, in arrival order.
    pub fn searched(&self) -> Vec<String> {
        self.lock().searched.clone()
    }

    /// Stored reminders in arrival order.
    pub fn reminders(&self) -> Vec<(Priority, String)> {
        self.lock().reminders.clone()
    }

    /// Stored history, most recent first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.lock().history.iter().rev().cloned().collect()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_reminders(&self) -> Result<QueueSnapshot, StrideError> {
        let delay = self.lock().fetch_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let rows = self.lock().reminders.clone();
        Ok(QueueSnapshot::from_rows(rows))
    }

    async fn create_reminder(&self, priority: Priority, text: &str) -> Result<(), StrideError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.creates_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_creates_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.lock().create_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let mut inner = self.lock();
            if inner.failing_creates > 0 {
                inner.failing_creates -= 1;
                Err(StrideError::Remote("create rejected by store".to_string()))
            } else {
                inner.reminders.push((priority, text.to_string()));
                Ok(())
            }
        };
        self.creates_in_flight.fetch_sub(1, Ordering::SeqCst);
        debug!("memory store: create p{priority} {:?} -> ok={}", text, result.is_ok());
        result
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, StrideError> {
        Ok(self.history())
    }

    async fn push_history(&self, record: &HistoryRecord) -> Result<(), StrideError> {
        self.lock().history.push(record.clone());
        Ok(())
    }

    async fn pop_history(&self) -> Result<Option<HistoryRecord>, StrideError> {
        Ok(self.lock().history.pop())
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, StrideError> {
        let (delay, fail) = {
            let mut inner = self.lock();
            inner.searched.push(query.to_string());
            let fail = inner.failing_searches > 0;
            if fail {
                inner.failing_searches -= 1;
            }
            let delay = inner.search_delays.get(query).copied().unwrap_or_default();
            (delay, fail)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(StrideError::Remote("search rejected by store".to_string()));
        }
        Ok(self.catalog.search(query, self.scope))
    }
}

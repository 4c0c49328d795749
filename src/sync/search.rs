//! Debounced suggestion search.
//!
//! Each keystroke takes the next sequence number and restarts the debounce
//! timer. When the timer fires the query is dispatched; its response is
//! applied only if no keystroke happened since, otherwise it is discarded.

use super::{SyncCoordinator, SyncEvent};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Where the most recent keystroke is in its lifecycle.
///
/// `Applying` and `Discarded` are logged transitions; once a response is
/// handled the tracker settles back to `Idle` (or stays on the newer
/// keystroke's phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing(u64),
    Fetching(u64),
    Applying(u64),
    Discarded(u64),
}

#[derive(Default)]
pub(super) struct SearchTracker {
    latest: u64,
    phase: SearchPhase,
    timer: Option<JoinHandle<()>>,
    suggestions: Vec<String>,
}

impl SearchTracker {
    /// Assign the next sequence number and cancel the running timer.
    fn next(&mut self) -> u64 {
        self.cancel_timer();
        self.latest += 1;
        self.latest
    }

    pub(super) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }

    fn set_phase(&mut self, phase: SearchPhase) {
        debug!("search: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Apply a response if it is still current. Returns whether it was.
    fn settle(&mut self, seq: u64, names: &[String]) -> bool {
        if !self.is_current(seq) {
            debug!("search: {:?}", SearchPhase::Discarded(seq));
            return false;
        }
        self.set_phase(SearchPhase::Applying(seq));
        self.suggestions = names.to_vec();
        self.set_phase(SearchPhase::Idle);
        true
    }

    pub(super) fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub(super) fn phase(&self) -> SearchPhase {
        self.phase
    }
}

impl SyncCoordinator {
    /// Record a keystroke in the search box. Returns its sequence number.
    ///
    /// A blank query clears the suggestions right away and dispatches
    /// nothing. Must be called from within a tokio runtime.
    pub fn keystroke(&self, query: &str) -> u64 {
        let mut session = self.session();
        let seq = session.search.next();

        if query.trim().is_empty() {
            session.search.settle(seq, &[]);
            drop(session);
            self.emit(SyncEvent::SuggestionsApplied {
                seq,
                query: String::new(),
                names: Vec::new(),
            });
            return seq;
        }

        session.search.set_phase(SearchPhase::Debouncing(seq));
        let this = self.clone();
        let query = query.to_string();
        let debounce = self.shared.debounce;
        session.search.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            this.dispatch(seq, query);
        }));
        seq
    }

    /// Send the query. The request runs detached from the timer, so a later
    /// keystroke cannot cancel it; its response is filtered on arrival.
    fn dispatch(&self, seq: u64, query: String) {
        {
            let mut session = self.session();
            if !session.search.is_current(seq) {
                return;
            }
            session.search.timer = None;
            session.search.set_phase(SearchPhase::Fetching(seq));
        }

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.shared.store.search(&query).await;
            let names = match result {
                Ok(names) => names,
                Err(e) => {
                    warn!("search {seq} ({query:?}) failed: {e}");
                    let current = {
                        let mut session = this.session();
                        let current = session.search.is_current(seq);
                        if current {
                            session.search.set_phase(SearchPhase::Idle);
                        }
                        current
                    };
                    if current {
                        this.emit(SyncEvent::SuggestionsFailed {
                            seq,
                            reason: e.to_string(),
                        });
                    } else {
                        this.emit(SyncEvent::SuggestionsDiscarded { seq });
                    }
                    return;
                }
            };

            let applied = this.session().search.settle(seq, &names);
            if applied {
                this.emit(SyncEvent::SuggestionsApplied { seq, query, names });
            } else {
                this.emit(SyncEvent::SuggestionsDiscarded { seq });
            }
        });
    }
}

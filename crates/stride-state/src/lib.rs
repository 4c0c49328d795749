//! # stride-state
//!
//! In-memory collections reconciled against the remote store: the
//! priority-ordered reminder queue and the LIFO action history.

pub mod history;
pub mod queue;

pub use history::{HistoryStack, Popped};
pub use queue::ReminderQueue;

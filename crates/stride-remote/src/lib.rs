//! # stride-remote
//!
//! `ReminderStore` backends for Stride: the REST API client and an
//! in-process store used offline and in tests.

pub mod catalog;
pub mod http;
pub mod memory;

pub use catalog::Catalog;
pub use http::HttpStore;
pub use memory::MemoryStore;

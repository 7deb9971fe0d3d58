// Public fallible APIs in this crate share one concrete error contract (`QueueError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub(crate) mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod gist;
pub mod memory;
pub mod models;
pub(crate) mod occ;
pub mod sweeper;

pub use client::GistQueue;
pub use error::{QueueError, Result};
pub use gist::{Document, DocumentFile, DocumentStore, GistClient};
pub use memory::MemoryStore;
pub use models::{CleanupReport, Message, MessageStatus, QueueInfo, QueueRef};
pub use sweeper::RetentionSweeper;

// tasklist - Ordered personal task list with pluggable durable storage

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod record;
pub mod render;
pub mod sqlite;
pub mod store;

// Re-export main types for convenience
pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::StoreError;
pub use filter::{PriorityFilter, StatusFilter, TaskQuery};
pub use models::{Priority, Task, TaskDraft, TaskStats};
pub use record::Record;
pub use sqlite::SqliteBackend;
pub use store::{Outcome, Submitted, TaskStore};

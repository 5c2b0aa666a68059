//! `fleet-tasks`: transport tasks, downtime windows, and their release into
//! dispatch.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`event`]        | `Task`, `Downtime`, `DowntimeKind`, `Lifecycle`       |
//! | [`entry_queue`]  | `EntryQueue` (priority order, FIFO within a priority) |
//! | [`catalog`]      | `TaskCatalog`, `CatalogSummary`                       |
//! | [`loader`]       | `load_tasks_path`, `load_tasks_reader`, `TaskFile`    |
//! | [`writer`]       | `write_tasks`, `write_tasks_path`                     |
//! | [`error`]        | `TaskError`, `TaskResult<T>`                          |
//!
//! # Release model (summary)
//!
//! ```text
//! catalog.pending  (sorted by entry_time)
//!        │  release_due(now): entry_time ≤ now
//!        ▼
//! EntryQueue       (sorted by priority, then insertion)
//!        │  take_head_for_assignment / take_for_assignment(id)
//!        ▼
//! agent task queue (TaskId only; the Task stays in the catalog)
//! ```

pub mod catalog;
pub mod entry_queue;
pub mod error;
pub mod event;
pub mod loader;
pub mod writer;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogSummary, TaskCatalog};
pub use entry_queue::EntryQueue;
pub use error::{TaskError, TaskResult};
pub use event::{DEFAULT_LOADING_TIME, Downtime, DowntimeKind, Lifecycle, Task};
pub use loader::{TaskFile, load_tasks_path, load_tasks_reader};
pub use writer::{write_tasks, write_tasks_path};

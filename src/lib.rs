// Taskboard - task list store with filtering, search and completion stats

pub mod backend;
pub mod board;
pub mod config;
pub mod error;
pub mod filter;
pub mod jsonl;
pub mod seed;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use backend::{HealthReport, SqliteBackend, TaskBackend};
pub use board::Board;
pub use config::Config;
pub use error::StoreError;
pub use filter::{StatusFilter, TaskQuery};
pub use store::{TaskListStore, TaskStats, completion_rate};
pub use task::{NewTask, Task, TaskStatus, TaskUpdate, now_ms};

//! Reducer-driven to-do and task-board state with whole-snapshot persistence.

pub mod board;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod task;
pub mod todo;

pub use board::{BoardReducer, TaskAction, TaskBuckets};
pub use config::Config;
pub use error::StorageError;
pub use storage::{FileStore, MemoryStore, SlotStore, Snapshot};
pub use store::{BoardStore, Reducer, Store, TodoStore};
pub use task::{Task, TaskStatus};
pub use todo::{TodoAction, TodoItem, TodoReducer};

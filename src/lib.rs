//! # Studyboard Core
//!
//! Board state model and reordering protocol for a study-planner kanban
//! board.
//!
//! This crate provides the board data structure (ordered columns of ordered
//! tasks), the pure mutation and move transitions over it, and the
//! persistence contract, without any dependency on specific UI
//! implementations. Rendering, drag-gesture capture, notifications, and the
//! clipboard live in the host; the host hands move events in and presents
//! the outcomes this crate reports.

pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use domain::{
    board::Board,
    column::{Column, ColumnId},
    moves::{MoveOutcome, MoveRequest},
    task::{Task, TaskId},
};
pub use error::{BoardError, Result};
pub use storage::memory::MemoryStore;
pub use storage::Storage;
pub use store::{BoardStore, EditSession};

#[cfg(feature = "file-store")]
pub use storage::file_store::FileStore;

pub mod board;
pub mod column;
pub mod moves;
pub mod task;

pub use board::Board;
pub use column::{Column, ColumnId};
pub use moves::{MoveOutcome, MoveRequest};
pub use task::{Task, TaskId};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Column title cannot be empty")]
    EmptyTitle,

    #[error("Task content cannot be empty")]
    EmptyContent,

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Index {index} out of bounds for column '{column}' (length {len})")]
    IndexOutOfBounds {
        column: String,
        index: usize,
        len: usize,
    },

    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    #[error("Column entry '{key}' carries mismatched id '{id}'")]
    ColumnKeyMismatch { key: String, id: String },

    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("No task edit in progress")]
    NoActiveEdit,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

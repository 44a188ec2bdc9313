use thiserror::Error;

/// Errors raised by deposit collaborators.
#[derive(Debug, Error)]
pub enum DepositError {
    /// A CSV row has no value in its `id` column.
    #[error("row {0} has no id")]
    MissingId(usize),
    /// A row and its header differ in length.
    #[error("row {row} has {actual} value(s) but the header has {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// The header names a column more than once.
    #[error("column {0} appears more than once in the header")]
    DuplicateColumn(String),
    #[error("record not found: {0}")]
    UnknownRecord(String),
    #[error("publish failed for {id}: {message}")]
    Publish { id: String, message: String },
    /// The background worker stopped before the task could be queued.
    #[error("publish worker is not running")]
    WorkerClosed,
    #[error("publish worker failed: {0}")]
    Worker(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for deposit operations.
pub type Result<T> = std::result::Result<T, DepositError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected user input: malformed date, non-positive amount, empty
    /// category or name. Shown in the active form; nothing is persisted.
    #[error("{0}")]
    Validation(String),

    /// Category deletion blocked by transactions still referencing it.
    #[error("This category is used by {0} transaction(s). Reassign those transactions first.")]
    Conflict(i64),

    /// The user answered "no" to a destructive-action confirmation.
    #[error("Operation cancelled")]
    ConfirmationDeclined,

    #[error("Database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

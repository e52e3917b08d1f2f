//! Database Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The schema behind these errors belongs to the host
//! application; nothing here is recoverable by schema surgery on our side.

use derive_more::{Display, Error};

/// A database error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Query or connection failure from the driver.
    Database,
    /// A row references something that should exist but doesn't.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// A column held a value we can't interpret.
    #[display("invalid data in column: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// Password hashing or verification failed.
    Password,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}

//! Command Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Each variant maps a subsystem failure to something
//! the operator can act on.

use derive_more::{Display, Error};

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Tile conversion failed (vips or pdfinfo).
    Tiles,
    /// Reading or writing the tile directory failed.
    Storage,
    /// A database operation failed.
    Database,
    /// An HTTP request against the deployment failed.
    Api,
    /// Serializing output (manifest, page listing) failed.
    Serialize,
    /// Local filesystem access outside the tile directory failed.
    Io,
    /// The command was invoked against a record that can't support it.
    #[display("invalid usage: {_0}")]
    Usage(#[error(not(source))] &'static str),
    /// Some items in a batch failed; the rest were processed.
    #[display("{_0} of {_1} item(s) failed")]
    Partial(#[error(not(source))] usize, usize),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api | Self::Database)
    }
}

//! Probe Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A probe error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Could not construct the HTTP client from the given options.
    Client,
    /// The request never produced a response (DNS, TLS, refused, timeout).
    #[display("request to {_0} failed")]
    Transport(#[error(not(source))] String),
    /// The server answered with an unexpected status code.
    #[display("{url} returned HTTP {status}")]
    UnexpectedStatus {
        #[error(not(source))]
        url: String,
        status: u16,
    },
    /// The response body was not the shape a healthy deployment returns.
    #[display("unexpected response body: {_0}")]
    InvalidBody(#[error(not(source))] &'static str),
    /// Writing a downloaded file to disk failed.
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

//! Conversion Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Subprocess failures carry the captured stderr so the
//! operator sees what `vips` actually complained about.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("vips not detected on your system (install libvips-tools)")]
    VipsNotFound,
    #[display("pdfinfo not detected on your system (install poppler-utils)")]
    PdfinfoNotFound,
    /// Input file missing before we even get to spawn anything.
    #[display("input file not found: {}", _0.display())]
    InputNotFound(#[error(not(source))] PathBuf),
    /// The subprocess ran and exited non-zero. Second field is captured stderr.
    #[display("`{_0}` exited with code {_1}: {_2}")]
    CommandFailed(#[error(not(source))] String, #[error(not(source))] i32, #[error(not(source))] String),
    /// The subprocess was killed by a signal or never produced an exit code.
    #[display("`{_0}` terminated without an exit code")]
    CommandKilled(#[error(not(source))] String),
    /// The tool exited zero but the promised output file is not there.
    #[display("output file was not created: {}", _0.display())]
    OutputMissing(#[error(not(source))] PathBuf),
    /// `vips header` printed something that isn't a dimension.
    #[display("could not parse image header output: {_0:?}")]
    HeaderParse(#[error(not(source))] String),
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

use crate::error::{ErrorKind, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static PAGES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^Pages:\s*(\d+)\s*$").unwrap());

/// A discovered `pdfinfo` executable (poppler-utils).
pub struct Pdfinfo {
    path: PathBuf,
}
impl Pdfinfo {
    /// Locate `pdfinfo` on the PATH.
    pub fn discover() -> Result<Self> {
        match which::which("pdfinfo") {
            Ok(path) => {
                tracing::trace!(pdfinfo = %path.display(), "Discovered pdfinfo executable");
                Ok(Self { path })
            },
            Err(_) => {
                tracing::info!("pdfinfo executable not found in PATH");
                exn::bail!(ErrorKind::PdfinfoNotFound)
            },
        }
    }

    /// Number of pages in a PDF.
    ///
    /// Falls back to 1 when `pdfinfo` fails or the `Pages:` line can't be
    /// found, so a stubborn document still gets its first page converted.
    pub fn page_count(&self, pdf: impl AsRef<Path>) -> Result<u32> {
        let pdf = pdf.as_ref();
        if !pdf.exists() {
            exn::bail!(ErrorKind::InputNotFound(pdf.to_path_buf()));
        }
        let output = Command::new(&self.path).arg(pdf).output().map_err(|_| exn::Exn::from(ErrorKind::Io))?;
        if !output.status.success() {
            tracing::warn!(pdf = %pdf.display(), "pdfinfo failed; assuming a single page");
            return Ok(1);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_page_count(&stdout) {
            Some(pages) => Ok(pages),
            None => {
                tracing::warn!(pdf = %pdf.display(), "no Pages line in pdfinfo output; assuming a single page");
                Ok(1)
            },
        }
    }
}

fn parse_page_count(stdout: &str) -> Option<u32> {
    PAGES_REGEX.captures(stdout)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Title:          A Scanned Thesis\n\
                          Producer:       GPL Ghostscript 10.0\n\
                          Pages:          42\n\
                          Encrypted:      no\n\
                          Page size:      595.276 x 841.89 pts (A4)\n";

    #[test]
    fn test_parse_page_count() {
        assert_eq!(parse_page_count(SAMPLE), Some(42));
    }

    #[test]
    fn test_parse_page_count_missing() {
        assert_eq!(parse_page_count("Title: no pages line here\n"), None);
    }

    #[test]
    fn test_parse_page_count_ignores_page_size() {
        // `Page size:` must not be confused for `Pages:`.
        assert_eq!(parse_page_count("Page size: 595 x 841 pts\n"), None);
    }
}

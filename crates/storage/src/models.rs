use std::path::PathBuf;
use time::UtcDateTime;

/// Metadata for one tile file in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFile {
    /// Path relative to the store root, e.g. `21/6_/_/document.pdf.ptif`.
    pub path: PathBuf,
    /// Size in bytes as stored on disk.
    pub size: u64,
    /// Last modification time of the file.
    pub modified: UtcDateTime,
}
impl TileFile {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: UtcDateTime) -> Self {
        Self { path: path.into(), size, modified }
    }

    /// The final path component, used as the canvas label and IIIF key.
    pub fn filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn is_ptif(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ptif"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_and_extension() {
        let file = TileFile::new("21/6_/_/scan.ptif", 1024, UtcDateTime::now());
        assert_eq!(file.filename(), Some("scan.ptif"));
        assert!(file.is_ptif());
        let other = TileFile::new("21/6_/_/notes.txt", 10, UtcDateTime::now());
        assert!(!other.is_ptif());
    }
}

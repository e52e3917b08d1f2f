//! The tile store: `.ptif` files under the instance images directory.
//!
//! A thin async layer over the directory the host application (and the IIP
//! server) reads tiles from. All paths are relative to the store root and
//! validated before use; directory layout comes from [`crate::shard`].

use crate::error::{ErrorKind, Result};
use crate::models::TileFile;
use crate::path::validate as validate_path;
use crate::shard::record_shard_candidates;
use std::fs::create_dir_all as sync_create_dir;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Handle on the tile store root (usually `<instance>/images/public`).
#[derive(Debug, Clone)]
pub struct TileStore {
    root: PathBuf,
}
impl TileStore {
    /// Open (creating if necessary) the tile store at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Non-async is fine here; it happens once on startup.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
            tracing::info!(root = %root.display(), "Created tile store directory");
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the on-disk path for a store-relative path.
    pub fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    pub async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    /// Write file contents, creating shard directories as needed.
    pub async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    /// List `.ptif` files directly inside one store-relative directory.
    ///
    /// A missing directory yields an empty list, not an error; shard
    /// guessing routinely probes directories that don't exist.
    pub async fn list_ptifs_in(&self, dir: &Path) -> Result<Vec<TileFile>> {
        let abs_dir = self.absolute_path(dir)?;
        let mut entries = match fs::read_dir(&abs_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => exn::bail!(Self::map_io_error(err, dir)),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, dir))? {
            let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, dir))?;
            if !metadata.is_file() {
                continue;
            }
            let relative = dir.join(entry.file_name());
            let file = Self::tile_file(&relative, metadata)?;
            if file.is_ptif() {
                files.push(file);
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Whether a file with this name exists in any of the record's
    /// candidate shard directories.
    ///
    /// This is the disk side of the metadata invariant: a `.ptif`
    /// referenced by a record should actually be on disk.
    pub async fn record_file_exists(&self, record_id: &str, filename: &str) -> Result<bool> {
        for candidate in record_shard_candidates(record_id)? {
            if self.exists(&candidate.join(filename)).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Discover a record's tiles by probing every candidate shard directory.
    pub async fn find_record_ptifs(&self, record_id: &str) -> Result<Vec<TileFile>> {
        let mut found = Vec::new();
        for candidate in record_shard_candidates(record_id)? {
            tracing::debug!(record = record_id, dir = %candidate.display(), "Checking shard directory");
            found.extend(self.list_ptifs_in(&candidate).await?);
        }
        Ok(found)
    }

    fn tile_file(path: &Path, metadata: Metadata) -> Result<TileFile> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(TileFile::new(path, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, TileStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = TileStore::open(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_open_rejects_file_as_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(TileStore::open(&file).is_err());
    }

    #[test]
    fn test_open_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("images/public");
        let store = TileStore::open(&root).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_absolute_path_blocks_traversal() {
        let (_temp, store) = store();
        assert!(store.absolute_path("../outside.ptif").is_err());
        assert!(store.absolute_path("21/6_/_/scan.ptif").is_ok());
    }

    #[tokio::test]
    async fn test_write_read_exists() {
        let (_temp, store) = store();
        let path = Path::new("21/6_/_/scan.ptif");
        store.write(path, b"tile bytes").await.unwrap();
        assert!(store.exists(path).await.unwrap());
        assert_eq!(store.read(path).await.unwrap(), b"tile bytes");
        assert!(!store.exists(Path::new("21/6_/_/missing.ptif")).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_ptifs_filters_and_sorts() {
        let (_temp, store) = store();
        let dir = Path::new("21/6_/_");
        store.write(&dir.join("b.ptif"), b"b").await.unwrap();
        store.write(&dir.join("a.ptif"), b"a").await.unwrap();
        store.write(&dir.join("ignore.txt"), b"x").await.unwrap();
        let files = store.list_ptifs_in(dir).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.filename().unwrap().to_string()).collect();
        assert_eq!(names, vec!["a.ptif", "b.ptif"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let (_temp, store) = store();
        let files = store.list_ptifs_in(Path::new("99/9_/_")).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_record_file_exists_probes_all_candidates() {
        let (_temp, store) = store();
        // File landed in the "one less" shard, not the expected one.
        store.write(Path::new("20/6_/_/doc.pdf.ptif"), b"tile").await.unwrap();
        assert!(store.record_file_exists("216", "doc.pdf.ptif").await.unwrap());
        assert!(!store.record_file_exists("216", "other.ptif").await.unwrap());
        assert!(!store.record_file_exists("999", "doc.pdf.ptif").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_record_ptifs_checks_both_candidates() {
        let (_temp, store) = store();
        // Tiles under the expected shard and under the "one less" guess.
        store.write(Path::new("21/6_/_/page-1.ptif"), b"a").await.unwrap();
        store.write(Path::new("20/6_/_/page-2.ptif"), b"b").await.unwrap();
        let files = store.find_record_ptifs("216").await.unwrap();
        assert_eq!(files.len(), 2);
    }
}

//! Path validation for store-relative paths.
//!
//! Every path handed to the tile store is relative to the store root; this
//! module makes sure it stays there (no `..` escapes) and carries no bytes
//! that would confuse the filesystem underneath.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a store-relative path.
///
/// Normalizes `.`/`//`/trailing-slash noise and resolves `..` components
/// as long as they never leave the store root. Null bytes are explicitly
/// rejected since they pass through `Path::components()` on Unix but
/// truncate in C-based syscalls.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tilectl_storage::validate_path;
/// assert!(validate_path("21/6_/_/document.pdf.ptif").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// assert_eq!(
///     validate_path("21//6_/./_/scan.ptif/").unwrap(),
///     Path::new("21/6_/_/scan.ptif")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate(Path::new("21/6_/_/scan.ptif")).unwrap(), Path::new("21/6_/_/scan.ptif"));
        assert_eq!(validate(Path::new("single.ptif")).unwrap(), Path::new("single.ptif"));
    }

    #[test]
    fn test_path_normalization() {
        assert_eq!(validate(Path::new("a//b//c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("a/./b/./c")).unwrap(), Path::new("a/b/c"));
        assert_eq!(validate(Path::new("21/6_/_/")).unwrap(), Path::new("21/6_/_"));
    }

    #[test]
    fn test_traversal_attempts() {
        assert!(validate(Path::new("../etc/passwd")).is_err());
        assert!(validate(Path::new("a/../../b")).is_err());
        assert!(validate(Path::new("..")).is_err());
        // Traversal that stays within the root is resolved, not rejected.
        assert_eq!(validate(Path::new("a/b/..")).unwrap(), Path::new("a"));
    }

    #[test]
    fn test_invalid_characters_and_empty() {
        assert!(validate(Path::new("a\0b")).is_err());
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new(".")).is_err());
        assert!(validate(Path::new("//")).is_err());
    }
}

//! File-storage rows: buckets, object versions, and file instances.

use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

/// The bucket identifiers attached to a record.
#[derive(Debug, Clone, FromRow)]
pub struct RecordBuckets {
    pub record_id: Uuid,
    pub bucket_id: Uuid,
    pub media_bucket_id: Option<Uuid>,
}

/// A head object version joined with its file instance.
#[derive(Debug, Clone, FromRow)]
pub struct ObjectInfo {
    pub key: String,
    pub version_id: Uuid,
    pub file_id: Option<Uuid>,
    pub uri: Option<String>,
    pub size: Option<i64>,
    pub checksum: Option<String>,
}

/// Parameters for registering a new object version backed by a file
/// already present on disk.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub bucket_id: Uuid,
    pub key: String,
    /// Storage URI of the file instance, e.g. an absolute filesystem path.
    pub uri: String,
    pub size: i64,
    /// Checksum in `<algo>:<hex>` form, as stored by the host application.
    pub checksum: String,
}

/// Compute a checksum for file contents in the host application's
/// `<algo>:<hex>` column format.
pub fn sha256_checksum(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("sha256:{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_checksum_format() {
        let checksum = sha256_checksum(b"hello");
        assert_eq!(
            checksum,
            "sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_checksum_empty_input() {
        let checksum = sha256_checksum(b"");
        assert!(checksum.starts_with("sha256:"));
        assert_eq!(checksum.len(), "sha256:".len() + 64);
    }
}

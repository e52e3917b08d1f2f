//! Repository for bucket and object-version rows.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{NewObject, ObjectInfo, RecordBuckets};
use exn::{OptionExt, ResultExt};
use sqlx::PgPool;
use uuid::Uuid;

/// Read access to the file-storage tables, plus registration of object
/// versions for tile files already written to disk.
#[derive(Debug, Clone)]
pub struct FilesRepository {
    pool: PgPool,
}
impl From<&Database> for FilesRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl FilesRepository {
    /// Resolve a public record identifier (e.g. `"216"`) to the internal
    /// record UUID via the persistent-identifier table.
    pub async fn resolve_record(&self, record_id: &str) -> Result<Uuid> {
        let uuid: Option<Uuid> = sqlx::query_scalar(include_str!("../../queries/resolve_record.sql"))
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        uuid.ok_or_raise(|| ErrorKind::NotFound(format!("record {record_id}")))
    }

    /// The reverse lookup: the public identifier for a record UUID.
    ///
    /// `None` for records whose persistent identifier was deleted.
    pub async fn record_pid(&self, record_uuid: Uuid) -> Result<Option<String>> {
        sqlx::query_scalar(include_str!("../../queries/record_pid.sql"))
            .bind(record_uuid)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Fetch the bucket identifiers attached to a record.
    pub async fn record_buckets(&self, record_uuid: Uuid) -> Result<RecordBuckets> {
        let buckets: Option<RecordBuckets> =
            sqlx::query_as(include_str!("../../queries/record_buckets.sql"))
                .bind(record_uuid)
                .fetch_optional(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        buckets.ok_or_raise(|| ErrorKind::NotFound(format!("record metadata {record_uuid}")))
    }

    /// List the head object versions in a bucket, joined with their file
    /// instances. Deleted objects (head with no file) are included so the
    /// caller can report them.
    pub async fn head_objects(&self, bucket_id: Uuid) -> Result<Vec<ObjectInfo>> {
        sqlx::query_as(include_str!("../../queries/head_objects.sql"))
            .bind(bucket_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Register a file already on disk as the head object version for its
    /// key: inserts the file instance, demotes any existing head, inserts
    /// the new version, and bumps the bucket size, all in one transaction.
    ///
    /// Returns the new object version id.
    pub async fn register_object(&self, object: &NewObject) -> Result<Uuid> {
        let file_id = Uuid::new_v4();
        let version_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/insert_file_instance.sql"))
            .bind(file_id)
            .bind(&object.uri)
            .bind(object.size)
            .bind(&object.checksum)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/demote_head.sql"))
            .bind(object.bucket_id)
            .bind(&object.key)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/insert_object_version.sql"))
            .bind(object.bucket_id)
            .bind(&object.key)
            .bind(version_id)
            .bind(file_id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/bump_bucket_size.sql"))
            .bind(object.bucket_id)
            .bind(object.size)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(key = %object.key, %version_id, "Registered object version");
        Ok(version_id)
    }
}

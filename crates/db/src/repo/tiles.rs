//! Repository for media-file rows carrying tile-processor state.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{MediaFileRow, media_file_json, promote_init};
use exn::ResultExt;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Access to the media-files table for listing, repairing, and
/// registering tile outputs.
#[derive(Debug, Clone)]
pub struct TilesRepository {
    pool: PgPool,
    dry_run: bool,
}
impl From<&Database> for TilesRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl TilesRepository {
    /// Create a repository that reports what it would change without
    /// writing anything.
    pub fn dry_run(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: true }
    }

    /// List every media-file row whose key ends in `.ptif`, across all
    /// records.
    pub async fn list_ptif_files(&self) -> Result<Vec<MediaFileRow>> {
        sqlx::query_as(include_str!("../../queries/list_ptif_media_files.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// List all media-file rows for one record.
    pub async fn list_for_record(&self, record_uuid: Uuid) -> Result<Vec<MediaFileRow>> {
        sqlx::query_as(include_str!("../../queries/list_record_media_files.sql"))
            .bind(record_uuid)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Find a single media-file row by record and key.
    pub async fn find(&self, record_uuid: Uuid, key: &str) -> Result<Option<MediaFileRow>> {
        sqlx::query_as(include_str!("../../queries/find_media_file.sql"))
            .bind(record_uuid)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Flip a row's processor status from `init` to `finished` if stuck.
    ///
    /// Returns `true` if the row needed fixing (and, unless in dry-run
    /// mode, was written back).
    pub async fn promote_stuck(&self, row: &MediaFileRow) -> Result<bool> {
        let mut json = row.json.clone();
        if !promote_init(&mut json) {
            return Ok(false);
        }
        if self.dry_run {
            tracing::info!(key = %row.key, "Would promote init to finished (dry run)");
            return Ok(true);
        }
        self.write_json(row.id, &json).await?;
        tracing::info!(key = %row.key, "Promoted processor status to finished");
        Ok(true)
    }

    /// Register a tile output as a media-file entry on a record.
    ///
    /// The object version must already exist; `page`/`total_pages` follow
    /// the same convention as [`media_file_json`].
    pub async fn register(
        &self,
        record_uuid: Uuid,
        key: &str,
        object_version_id: Uuid,
        page: Option<u32>,
        total_pages: Option<u32>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let json = media_file_json(key, object_version_id, page, total_pages);
        if self.dry_run {
            tracing::info!(key, "Would insert media-file entry (dry run)");
            return Ok(id);
        }
        sqlx::query(include_str!("../../queries/insert_media_file.sql"))
            .bind(id)
            .bind(&json)
            .bind(key)
            .bind(record_uuid)
            .bind(object_version_id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::info!(key, %object_version_id, "Inserted media-file entry");
        Ok(id)
    }

    async fn write_json(&self, id: Uuid, json: &Value) -> Result<()> {
        sqlx::query(include_str!("../../queries/update_media_file_json.sql"))
            .bind(id)
            .bind(json)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

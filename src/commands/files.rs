//! `tilectl files` — dump a record's buckets and object versions.

use crate::error::{ErrorKind, Result};
use clap::Args;
use exn::ResultExt;
use tilectl_config::Config;
use tilectl_db::{Database, FilesRepository, ObjectInfo};
use tilectl_storage::shard;
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct FilesArgs {
    /// Public record identifier.
    pub record_id: String,
}

pub async fn run(config: &Config, args: FilesArgs) -> Result<()> {
    let db = Database::connect(&config.database.url).await.or_raise(|| ErrorKind::Database)?;
    let files = FilesRepository::from(&db);

    let record_uuid = files.resolve_record(&args.record_id).await.or_raise(|| ErrorKind::Database)?;
    let buckets = files.record_buckets(record_uuid).await.or_raise(|| ErrorKind::Database)?;
    println!("record {} ({record_uuid})", args.record_id);

    print_bucket(&files, "files", buckets.bucket_id).await?;
    match buckets.media_bucket_id {
        Some(media_bucket) => print_bucket(&files, "media files", media_bucket).await?,
        None => println!("media files: no bucket"),
    }

    db.close().await;
    Ok(())
}

async fn print_bucket(files: &FilesRepository, label: &str, bucket_id: Uuid) -> Result<()> {
    let objects = files.head_objects(bucket_id).await.or_raise(|| ErrorKind::Database)?;
    println!("{label} (bucket {bucket_id}): {} object(s)", objects.len());
    if let Ok(dir) = shard::bucket_dir(&bucket_id.to_string()) {
        println!("  data dir: {}", dir.display());
    }
    for object in &objects {
        println!("  {}", describe(object));
    }
    Ok(())
}

fn describe(object: &ObjectInfo) -> String {
    match (&object.uri, object.size) {
        (Some(uri), Some(size)) => {
            let checksum = object.checksum.as_deref().unwrap_or("-");
            format!("{} ({size} bytes, {checksum}) at {uri}", object.key)
        }
        _ => format!("{} (deleted)", object.key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_live_and_deleted() {
        let live = ObjectInfo {
            key: "scan.tif".to_string(),
            version_id: Uuid::nil(),
            file_id: Some(Uuid::nil()),
            uri: Some("/data/scan.tif".to_string()),
            size: Some(42),
            checksum: Some("sha256:abc".to_string()),
        };
        assert_eq!(describe(&live), "scan.tif (42 bytes, sha256:abc) at /data/scan.tif");

        let deleted = ObjectInfo {
            key: "gone.tif".to_string(),
            version_id: Uuid::nil(),
            file_id: None,
            uri: None,
            size: None,
            checksum: None,
        };
        assert_eq!(describe(&deleted), "gone.tif (deleted)");
    }
}

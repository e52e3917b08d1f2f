//! `tilectl tiles` — inspect tile files on disk, repair stuck processor
//! statuses, and register generated pyramids on their records.

use crate::error::{ErrorKind, Result};
use clap::{Args, Subcommand};
use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use tilectl_config::Config;
use tilectl_db::{Database, FilesRepository, NewObject, TileStatus, TilesRepository, sha256_checksum, status_of};
use tilectl_storage::TileStore;

#[derive(Debug, Subcommand)]
pub enum TilesCommand {
    /// List the tile files on disk for a record.
    Find(FindArgs),
    /// Show (and optionally repair) processor statuses in the database.
    Status(StatusArgs),
    /// Register a record's on-disk tile files as media files.
    Register(RegisterArgs),
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Public record identifier.
    pub record_id: String,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Limit to one record instead of scanning every media file.
    #[arg(long)]
    pub record: Option<String>,
    /// Flip entries stuck in `init` to `finished`.
    #[arg(long)]
    pub fix: bool,
    /// With --fix, report what would change without writing.
    #[arg(long, requires = "fix")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Public record identifier.
    pub record_id: String,
}

/// Parse the page number out of a per-page tile filename
/// (`<pdf>.page-N.ptif`).
pub fn page_of(key: &str) -> Option<u32> {
    let stem = key.strip_suffix(".ptif")?;
    let (_, marker) = stem.rsplit_once(".page-")?;
    marker.parse().ok()
}

pub async fn run(config: &Config, command: TilesCommand) -> Result<()> {
    match command {
        TilesCommand::Find(args) => find(config, args).await,
        TilesCommand::Status(args) => status(config, args).await,
        TilesCommand::Register(args) => register(config, args).await,
    }
}

async fn find(config: &Config, args: FindArgs) -> Result<()> {
    let store = TileStore::open(config.instance.tiles_root()).or_raise(|| ErrorKind::Storage)?;
    let files = store.find_record_ptifs(&args.record_id).await.or_raise(|| ErrorKind::Storage)?;
    if files.is_empty() {
        println!("no tile files for record {}", args.record_id);
        return Ok(());
    }
    let vips = tilectl_vips::Vips::discover().ok();
    for file in files {
        let dims = vips
            .as_ref()
            .zip(store.absolute_path(&file.path).ok())
            .and_then(|(vips, absolute)| vips.dimensions(&absolute).ok())
            .map_or_else(String::new, |(width, height)| format!(", {width}x{height}"));
        println!("{} ({} bytes{dims}, modified {})", file.path.display(), file.size, file.modified);
    }
    Ok(())
}

async fn status(config: &Config, args: StatusArgs) -> Result<()> {
    let db = Database::connect(&config.database.url).await.or_raise(|| ErrorKind::Database)?;
    let tiles = if args.dry_run { TilesRepository::dry_run(&db) } else { TilesRepository::from(&db) };
    let files_repo = FilesRepository::from(&db);
    let store = TileStore::open(config.instance.tiles_root()).or_raise(|| ErrorKind::Storage)?;

    let mut pids: HashMap<uuid::Uuid, Option<String>> = HashMap::new();
    let rows = match &args.record {
        Some(record_id) => {
            let record_uuid = files_repo.resolve_record(record_id).await.or_raise(|| ErrorKind::Database)?;
            pids.insert(record_uuid, Some(record_id.clone()));
            tiles.list_for_record(record_uuid).await.or_raise(|| ErrorKind::Database)?
        }
        None => tiles.list_ptif_files().await.or_raise(|| ErrorKind::Database)?,
    };

    let mut fixed = 0usize;
    let mut missing = 0usize;
    for row in &rows {
        let status = status_of(&row.json).map_or_else(|| "-".to_string(), |status| status.to_string());
        // Each referenced .ptif must actually be on disk; flag the rows
        // where it isn't.
        let mut marker = "";
        if row.key.ends_with(".ptif") {
            let pid = match pids.get(&row.record_id) {
                Some(pid) => pid.clone(),
                None => {
                    let pid = files_repo.record_pid(row.record_id).await.or_raise(|| ErrorKind::Database)?;
                    pids.insert(row.record_id, pid.clone());
                    pid
                }
            };
            let on_disk = match &pid {
                Some(pid) => store.record_file_exists(pid, &row.key).await.or_raise(|| ErrorKind::Storage)?,
                None => false,
            };
            if !on_disk {
                marker = " MISSING ON DISK";
                missing += 1;
            }
        }
        println!("{} {} {status}{marker}", row.record_id, row.key);
        if args.fix && status_of(&row.json) == Some(TileStatus::Init) {
            if tiles.promote_stuck(row).await.or_raise(|| ErrorKind::Database)? {
                fixed += 1;
            }
        }
    }
    if missing > 0 {
        println!("{missing} referenced tile file(s) missing on disk");
    }
    if args.fix {
        println!("{fixed} entr(ies) promoted to finished");
    }
    db.close().await;
    Ok(())
}

async fn register(config: &Config, args: RegisterArgs) -> Result<()> {
    let store = TileStore::open(config.instance.tiles_root()).or_raise(|| ErrorKind::Storage)?;
    let files = store.find_record_ptifs(&args.record_id).await.or_raise(|| ErrorKind::Storage)?;
    if files.is_empty() {
        exn::bail!(ErrorKind::Usage("no tile files on disk for this record"));
    }

    let db = Database::connect(&config.database.url).await.or_raise(|| ErrorKind::Database)?;
    let files_repo = FilesRepository::from(&db);
    let tiles_repo = TilesRepository::from(&db);
    let record_uuid = files_repo.resolve_record(&args.record_id).await.or_raise(|| ErrorKind::Database)?;
    let buckets = files_repo.record_buckets(record_uuid).await.or_raise(|| ErrorKind::Database)?;
    let media_bucket =
        buckets.media_bucket_id.ok_or_raise(|| ErrorKind::Usage("record has no media-files bucket"))?;

    let page_files = files.iter().filter(|file| file.filename().is_some_and(|key| page_of(key).is_some())).count();
    let total = files.len();
    let mut failed = 0usize;
    let mut skipped = 0usize;
    for file in &files {
        let Some(key) = file.filename().map(str::to_string) else {
            failed += 1;
            continue;
        };
        if tiles_repo.find(record_uuid, &key).await.or_raise(|| ErrorKind::Database)?.is_some() {
            tracing::debug!(key, "Already registered, skipping");
            skipped += 1;
            continue;
        }
        let ctx = RegisterContext {
            store: &store,
            files_repo: &files_repo,
            tiles_repo: &tiles_repo,
            record_uuid,
            media_bucket,
            page_files: page_files as u32,
        };
        match register_one(&ctx, file, &key).await {
            Ok(()) => println!("registered {key}"),
            Err(error) => {
                tracing::error!(key, %error, "Registration failed");
                failed += 1;
            }
        }
    }

    println!("{} registered, {skipped} skipped, {failed} failed", total - skipped - failed);
    db.close().await;
    if failed > 0 {
        exn::bail!(ErrorKind::Partial(failed, total));
    }
    Ok(())
}

struct RegisterContext<'a> {
    store: &'a TileStore,
    files_repo: &'a FilesRepository,
    tiles_repo: &'a TilesRepository,
    record_uuid: uuid::Uuid,
    media_bucket: uuid::Uuid,
    page_files: u32,
}

async fn register_one(ctx: &RegisterContext<'_>, file: &tilectl_storage::TileFile, key: &str) -> Result<()> {
    let bytes = ctx.store.read(&file.path).await.or_raise(|| ErrorKind::Storage)?;
    let uri = ctx.store.absolute_path(&file.path).or_raise(|| ErrorKind::Storage)?;
    let object = NewObject {
        bucket_id: ctx.media_bucket,
        key: key.to_string(),
        uri: uri.to_string_lossy().into_owned(),
        size: bytes.len() as i64,
        checksum: sha256_checksum(&bytes),
    };
    let version_id = ctx.files_repo.register_object(&object).await.or_raise(|| ErrorKind::Database)?;
    let page = page_of(key);
    let total_pages = page.is_some().then_some(ctx.page_files).filter(|count| *count > 0);
    ctx.tiles_repo
        .register(ctx.record_uuid, key, version_id, page, total_pages)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::cover("document.pdf.ptif", None)]
    #[case::page("document.pdf.page-3.ptif", Some(3))]
    #[case::double_digit("document.pdf.page-12.ptif", Some(12))]
    #[case::not_a_page("document.page.ptif", None)]
    #[case::wrong_extension("document.pdf.page-3.tif", None)]
    fn test_page_of(#[case] key: &str, #[case] expected: Option<u32>) {
        assert_eq!(page_of(key), expected);
    }
}

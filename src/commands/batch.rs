//! `tilectl batch` — download a record's convertible files and turn
//! each into a pyramidal TIFF inside the record's tile shard.

use crate::commands::{api_client, convert::is_pdf};
use crate::error::{ErrorKind, Result};
use clap::Args;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tilectl_config::Config;
use tilectl_probe::{ApiClient, convertible_files};
use tilectl_storage::{TileStore, shard};
use tilectl_vips::{Converter, TileParams};

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Public record identifier, e.g. `216`.
    pub record_id: String,
}

struct BatchContext {
    client: ApiClient,
    converter: Converter,
    store: TileStore,
    shard_dir: PathBuf,
    params: TileParams,
    record_id: String,
}

pub async fn run(config: &Config, args: BatchArgs) -> Result<()> {
    let client = api_client(&config.api)?;
    let record = client.get_json(&client.record_url(&args.record_id)).await.or_raise(|| ErrorKind::Api)?;
    let files = convertible_files(&record);
    if files.is_empty() {
        exn::bail!(ErrorKind::Usage("record has no convertible files"));
    }

    let ctx = BatchContext {
        client,
        converter: Converter::discover().or_raise(|| ErrorKind::Tiles)?,
        store: TileStore::open(config.instance.tiles_root()).or_raise(|| ErrorKind::Storage)?,
        shard_dir: shard::record_shard_dir(&args.record_id).or_raise(|| ErrorKind::Storage)?,
        params: config.tiles.params(),
        record_id: args.record_id.clone(),
    };
    let workdir = tempfile::tempdir().or_raise(|| ErrorKind::Io)?;

    let total = files.len();
    let mut failed = 0usize;
    for filename in &files {
        match process_file(&ctx, filename, workdir.path()).await {
            Ok(dest) => println!("{filename} -> {}", dest.display()),
            Err(error) => {
                tracing::error!(filename, %error, "Conversion failed");
                failed += 1;
            }
        }
    }

    println!("{} converted, {failed} failed", total - failed);
    if failed > 0 {
        exn::bail!(ErrorKind::Partial(failed, total));
    }
    Ok(())
}

async fn process_file(ctx: &BatchContext, filename: &str, workdir: &Path) -> Result<PathBuf> {
    let source = workdir.join(filename);
    ctx.client.download_file(&ctx.record_id, filename, &source).await.or_raise(|| ErrorKind::Api)?;

    let scratch = workdir.join(format!("{filename}.ptif"));
    let ptif = if is_pdf(&source) {
        ctx.converter.pdf_page_to_ptif(&source, 1, &scratch, &ctx.params).or_raise(|| ErrorKind::Tiles)?
    } else {
        ctx.converter.image_to_ptif(&source, &scratch, &ctx.params).or_raise(|| ErrorKind::Tiles)?
    };

    let dest = ctx.shard_dir.join(format!("{filename}.ptif"));
    let bytes = tokio::fs::read(&ptif.path).await.or_raise(|| ErrorKind::Io)?;
    ctx.store.write(&dest, &bytes).await.or_raise(|| ErrorKind::Storage)?;
    Ok(dest)
}

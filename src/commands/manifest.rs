//! `tilectl manifest` — build a IIIF Presentation v2 manifest from the
//! tile files a record has on disk.

use crate::error::{ErrorKind, Result};
use clap::Args;
use exn::ResultExt;
use std::path::PathBuf;
use tilectl_config::Config;
use tilectl_iiif::{ManifestBuilder, Page, iiif_image_path};
use tilectl_storage::TileStore;
use tilectl_vips::Vips;

#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Public record identifier.
    pub record_id: String,
    /// Write the manifest to a file instead of stdout.
    #[arg(long, short)]
    pub save: Option<PathBuf>,
    /// Manifest label (default: "PDF Document").
    #[arg(long)]
    pub label: Option<String>,
    /// Manifest description.
    #[arg(long)]
    pub description: Option<String>,
}

pub async fn run(config: &Config, args: ManifestArgs) -> Result<()> {
    let store = TileStore::open(config.instance.tiles_root()).or_raise(|| ErrorKind::Storage)?;
    let files = store.find_record_ptifs(&args.record_id).await.or_raise(|| ErrorKind::Storage)?;
    if files.is_empty() {
        exn::bail!(ErrorKind::Usage("no tile files on disk for this record"));
    }

    // Real dimensions when vips is installed; placeholder A4-ish ones
    // otherwise, which viewers tolerate since the image service corrects
    // them from info.json.
    let vips = Vips::discover().ok();
    let mut pages = Vec::new();
    for file in &files {
        let Some(filename) = file.filename() else { continue };
        let Some(iiif_path) = iiif_image_path(&file.path) else {
            tracing::warn!(path = %file.path.display(), "Not under a shard directory, skipping");
            continue;
        };
        let page = match dimensions(vips.as_ref(), &store, file) {
            Some((width, height)) => Page::new(filename, iiif_path, width, height),
            None => Page::with_default_dimensions(filename, iiif_path),
        };
        pages.push(page);
    }
    if pages.is_empty() {
        exn::bail!(ErrorKind::Usage("no tile files usable for a manifest"));
    }

    let mut builder = ManifestBuilder::new(&config.api.base_url, &args.record_id);
    if let Some(label) = &args.label {
        builder = builder.label(label);
    }
    if let Some(description) = &args.description {
        builder = builder.description(description);
    }
    let manifest = builder.build(&pages);
    let body = serde_json::to_string_pretty(&manifest).or_raise(|| ErrorKind::Serialize)?;

    match &args.save {
        Some(path) => {
            tokio::fs::write(path, &body).await.or_raise(|| ErrorKind::Io)?;
            println!("{} ({} canvases)", path.display(), manifest.canvas_count());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn dimensions(vips: Option<&Vips>, store: &TileStore, file: &tilectl_storage::TileFile) -> Option<(u32, u32)> {
    let vips = vips?;
    let absolute = store.absolute_path(&file.path).ok()?;
    match vips.dimensions(&absolute) {
        Ok(dims) => Some(dims),
        Err(error) => {
            tracing::warn!(path = %file.path.display(), %error, "Could not read dimensions");
            None
        }
    }
}

//! `tilectl doctor` — check every external dependency in one pass.
//!
//! Each line of the report answers one "is it my setup?" question:
//! vips and pdfinfo on the PATH, the tile directory on disk, the API
//! answering, and the database reachable.

use crate::commands::api_client;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use tilectl_config::Config;
use tilectl_db::Database;
use tilectl_probe::Report;
use tilectl_vips::{Pdfinfo, Vips};

pub async fn run(config: &Config) -> Result<()> {
    let mut report = Report::default();

    match Vips::discover().and_then(|vips| vips.version()) {
        Ok(version) => report.pass("vips", version),
        Err(error) => report.fail("vips", error.to_string()),
    }
    match Pdfinfo::discover() {
        Ok(_) => report.pass("pdfinfo", "found on PATH"),
        Err(error) => report.fail("pdfinfo", error.to_string()),
    }

    let tiles_root = config.instance.tiles_root();
    if tiles_root.is_dir() {
        report.pass("tile directory", tiles_root.display().to_string());
    } else {
        report.fail("tile directory", format!("{} does not exist", tiles_root.display()));
    }

    match api_client(&config.api) {
        Ok(client) => match client.get_ok(client.base_url()).await {
            Ok(()) => report.pass("api", config.api.base_url.clone()),
            Err(error) => report.fail("api", error.to_string()),
        },
        Err(error) => report.fail("api", error.to_string()),
    }

    match Database::connect(&config.database.url).await {
        Ok(db) => {
            match db.ping().await {
                Ok(()) => report.pass("database", "reachable"),
                Err(error) => report.fail("database", error.to_string()),
            }
            db.close().await;
        }
        Err(error) => report.fail("database", error.to_string()),
    }

    println!("{report}");
    println!();
    println!("effective configuration:");
    println!("{}", effective_config(config)?);

    if !report.all_passed() {
        exn::bail!(ErrorKind::Partial(report.failed_count(), report.outcomes().len()));
    }
    Ok(())
}

/// The merged configuration as JSON, with the API token masked.
fn effective_config(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    if shown.api.token.is_some() {
        shown.api.token = Some("<redacted>".to_string());
    }
    serde_json::to_string_pretty(&shown).or_raise(|| ErrorKind::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_config_masks_token() {
        let mut config = Config::default();
        config.api.token = Some("secret-token".to_string());
        let rendered = effective_config(&config).unwrap();
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("https://127.0.0.1:5000"));
    }
}

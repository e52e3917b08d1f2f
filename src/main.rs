//! Operations CLI for an Invenio-RDM IIIF deployment.
//!
//! Wraps the one-off jobs that keep a tiled-image deployment healthy:
//! converting sources to pyramidal TIFF, registering the results in the
//! database, building Presentation manifests, and smoke-checking the
//! HTTP surface.

mod commands;
mod error;

use crate::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tilectl", version, about, max_term_width = 100)]
struct Cli {
    /// Path to a configuration file (default: tilectl.toml, then the
    /// platform config directory).
    #[arg(long, short, global = true, env = "TILECTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a single image (or one PDF page) to pyramidal TIFF.
    Convert(commands::convert::ConvertArgs),
    /// Convert every page of a PDF, writing a page listing alongside.
    Pages(commands::pages::PagesArgs),
    /// Download a record's files and convert them into the tile directory.
    Batch(commands::batch::BatchArgs),
    /// Inspect and repair tile files and their processor status.
    #[command(subcommand)]
    Tiles(commands::tiles::TilesCommand),
    /// Build a IIIF Presentation manifest from a record's tile files.
    Manifest(commands::manifest::ManifestArgs),
    /// Smoke-check the deployment's HTTP surface for a record.
    Probe(commands::probe::ProbeArgs),
    /// List accounts or set a user's password.
    #[command(subcommand)]
    Users(commands::users::UsersCommand),
    /// Dump a record's buckets and object versions.
    Files(commands::files::FilesArgs),
    /// Check that every external dependency is reachable.
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match tilectl_config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Convert(args) => commands::convert::run(&config, args).await,
        Command::Pages(args) => commands::pages::run(&config, args).await,
        Command::Batch(args) => commands::batch::run(&config, args).await,
        Command::Tiles(command) => commands::tiles::run(&config, command).await,
        Command::Manifest(args) => commands::manifest::run(&config, args).await,
        Command::Probe(args) => commands::probe::run(&config, args).await,
        Command::Users(command) => commands::users::run(&config, command).await,
        Command::Files(args) => commands::files::run(&config, args).await,
        Command::Doctor => commands::doctor::run(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let ErrorKind::Partial(..) = &*error {
                eprintln!("{error}");
            } else {
                eprintln!("error: {error}");
                tracing::debug!(?error, "Command failed");
            }
            ExitCode::FAILURE
        }
    }
}

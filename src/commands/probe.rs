//! `tilectl probe` — smoke-check the deployment's HTTP surface.

use crate::commands::api_client;
use crate::error::{ErrorKind, Result};
use clap::Args;
use tilectl_config::Config;
use tilectl_iiif::urls::IipEndpoint;
use tilectl_probe::{run_iip_direct, run_smoke};

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Public record identifier.
    pub record_id: String,
    /// Also query the IIP server directly for this tile file (path
    /// relative to the tile root, e.g. `21/6_/_/scan.tif.ptif`).
    #[arg(long)]
    pub iip_file: Option<String>,
}

pub async fn run(config: &Config, args: ProbeArgs) -> Result<()> {
    let client = api_client(&config.api)?;
    let mut report = run_smoke(&client, &args.record_id).await;

    if let Some(file) = &args.iip_file {
        let iip = IipEndpoint::new(&config.api.iip_url);
        let direct = run_iip_direct(&client, &iip, file).await;
        for outcome in direct.outcomes() {
            if outcome.passed {
                report.pass(&outcome.name, outcome.detail.clone());
            } else {
                report.fail(&outcome.name, outcome.detail.clone());
            }
        }
    }

    println!("{report}");
    if !report.all_passed() {
        exn::bail!(ErrorKind::Partial(report.failed_count(), report.outcomes().len()));
    }
    Ok(())
}

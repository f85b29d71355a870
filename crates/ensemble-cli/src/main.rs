//! Ensemble CLI
//!
//! Render, diff and apply the ZooKeeper ensembles provided to SolrClouds.

use std::process::ExitCode;

use clap::Parser;

use ensemble_cli::Cli;
use ensemble_common::telemetry::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("{e}");
        return ExitCode::from(2);
    }

    match cli.run().await {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

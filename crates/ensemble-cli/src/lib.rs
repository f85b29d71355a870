//! Ensemble CLI library

pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ensemble_common::telemetry::LogFormat;
use ensemble_common::DEFAULT_FIELD_MANAGER;

use crate::config::CliConfig;

/// Ensemble - provided ZooKeeper clusters for SolrCloud
#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (text or json)
    #[arg(long, global = true, env = "ENSEMBLE_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Kubeconfig to use instead of the kube defaults
    #[arg(long, global = true, env = "ENSEMBLE_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Field manager recorded on writes
    #[arg(long, global = true, env = "ENSEMBLE_FIELD_MANAGER", default_value = DEFAULT_FIELD_MANAGER)]
    pub field_manager: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the SolrCloud and ZookeeperCluster CRDs
    Crd,
    /// Print the ZookeeperCluster a SolrCloud manifest asks for
    Render(commands::render::RenderArgs),
    /// Show what reconciling a live ZookeeperCluster would change
    Diff(commands::diff::DiffArgs),
    /// Create or update the provided ZookeeperCluster in the cluster
    Apply(commands::apply::ApplyArgs),
    /// Print the Solr environment for the SolrCloud's ZooKeeper ACLs
    AclEnv(commands::acl_env::AclEnvArgs),
}

/// How a successful command finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Nothing to report
    Clean,
    /// `diff` found drift
    Drift,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Clean => ExitCode::SUCCESS,
            Status::Drift => ExitCode::from(1),
        }
    }
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<Status> {
        let config = CliConfig::from_cli(&self);
        match self.command {
            Commands::Crd => commands::crd::run().map(|_| Status::Clean),
            Commands::Render(args) => commands::render::run(args).map(|_| Status::Clean),
            Commands::Diff(args) => commands::diff::run(args),
            Commands::Apply(args) => commands::apply::run(args, &config)
                .await
                .map(|_| Status::Clean),
            Commands::AclEnv(args) => commands::acl_env::run(args).map(|_| Status::Clean),
        }
    }
}

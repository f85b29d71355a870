//! Runtime configuration resolved from flags and environment
//!
//! The kubeconfig resolution chain (highest priority first):
//! 1. `--kubeconfig` flag or `ENSEMBLE_KUBECONFIG`
//! 2. kube defaults (`KUBECONFIG` env / `~/.kube/config` / in-cluster)

use std::path::PathBuf;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::{Cli, Error, Result};

/// Settings shared by commands that talk to the API server
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Explicit kubeconfig, if any
    pub kubeconfig: Option<PathBuf>,
    /// Field manager recorded on writes
    pub field_manager: String,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            kubeconfig: cli.kubeconfig.clone(),
            field_manager: cli.field_manager.clone(),
        }
    }

    /// Build a kube [`Client`] for the resolved kubeconfig
    pub async fn kube_client(&self) -> Result<Client> {
        let Some(path) = self.kubeconfig.as_ref() else {
            debug!("using default kube configuration");
            return Ok(Client::try_default().await?);
        };

        debug!(kubeconfig = %path.display(), "loading kubeconfig");
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| Error::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(Error::kubeconfig)?;
        Ok(Client::try_from(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn config_carries_flags() {
        let cli = Cli::try_parse_from([
            "ensemble",
            "--kubeconfig",
            "/etc/kube/config",
            "--field-manager",
            "solr-operator",
            "apply",
            "solr.yaml",
        ])
        .unwrap();
        let config = CliConfig::from_cli(&cli);
        assert_eq!(config.kubeconfig, Some(PathBuf::from("/etc/kube/config")));
        assert_eq!(config.field_manager, "solr-operator");
    }

    #[tokio::test]
    async fn missing_kubeconfig_file_is_reported_with_path() {
        let config = CliConfig {
            kubeconfig: Some(PathBuf::from("/nonexistent/ensemble/kubeconfig")),
            field_manager: "ensemble".to_string(),
        };
        let Err(err) = config.kube_client().await else {
            panic!("expected an error for a missing kubeconfig");
        };
        assert!(matches!(err, Error::Read { ref path, .. } if path.ends_with("kubeconfig")));
    }
}

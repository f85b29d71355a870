//! One-shot create-or-update against the cluster

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use ensemble_common::crd::SolrCloud;
use ensemble_zookeeper::controller::{ensure_zookeeper_cluster, ApplyOutcome, KubeZookeeperClusterApi};
use ensemble_zookeeper::drift::TracingRecorder;

use super::{desired_zookeeper, read_manifest};
use crate::config::CliConfig;
use crate::Result;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// SolrCloud manifest; its namespace selects where the ensemble lives
    pub solrcloud: PathBuf,
}

pub async fn run(args: ApplyArgs, config: &CliConfig) -> Result<()> {
    let solr: SolrCloud = read_manifest(&args.solrcloud)?;
    let endpoint = desired_zookeeper(&solr)?.client_endpoint();
    let client = config.kube_client().await?;
    let api = KubeZookeeperClusterApi::with_field_manager(client, config.field_manager.clone());

    let mut recorder = TracingRecorder::default();
    let outcome = ensure_zookeeper_cluster(&api, &solr, &mut recorder).await?;
    info!(outcome = outcome_label(outcome), %endpoint, "apply finished");
    print!("{}", summary(&solr.provided_zookeeper_name(), outcome, &endpoint));
    Ok(())
}

/// kubectl-style result line followed by where Solr reaches the ensemble
fn summary(name: &str, outcome: ApplyOutcome, endpoint: &str) -> String {
    format!(
        "zookeepercluster/{name} {}\nclient endpoint: {endpoint}\n",
        outcome_label(outcome)
    )
}

fn outcome_label(outcome: ApplyOutcome) -> &'static str {
    match outcome {
        ApplyOutcome::Created => "created",
        ApplyOutcome::Updated => "configured",
        ApplyOutcome::Unchanged => "unchanged",
    }
}

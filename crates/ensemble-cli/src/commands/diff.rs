//! Offline drift check between a SolrCloud and a live ZookeeperCluster

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use ensemble_common::crd::{SolrCloud, ZookeeperCluster};
use ensemble_common::kube_utils::object_merge_patch;
use ensemble_zookeeper::drift::{reconcile_zookeeper_cluster, ChangeLog, FieldChange};

use super::{desired_zookeeper, read_manifest, read_manifest_value};
use crate::{Result, Status};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// SolrCloud manifest
    pub solrcloud: PathBuf,

    /// Observed ZookeeperCluster, e.g. from `kubectl get -o yaml`
    pub zookeepercluster: PathBuf,
}

/// Result of reconciling an observed object offline
#[derive(Debug)]
pub struct DiffReport {
    /// Fields that would trigger the update, in decision order
    pub changes: Vec<FieldChange>,
    /// Whether an update would be issued
    pub changed: bool,
    /// The observed document with the update's merge patch applied
    pub merged: Value,
}

/// Reconcile the raw `live` document against what `solr` asks for.
///
/// Fields the typed model does not carry are kept in `merged`, as they
/// would be on the server.
pub fn diff(solr: &SolrCloud, live: Value) -> Result<DiffReport> {
    let desired = desired_zookeeper(solr)?;
    let before: ZookeeperCluster = serde_json::from_value(live.clone())?;
    let mut observed = before.clone();
    let mut log = ChangeLog::new();
    let changed = reconcile_zookeeper_cluster(&desired, &mut observed, &mut log);

    let mut merged = live;
    if changed {
        json_patch::merge(&mut merged, &object_merge_patch(&before, &observed)?);
    }
    Ok(DiffReport {
        changes: log.into_changes(),
        changed,
        merged,
    })
}

impl DiffReport {
    /// One line per change, then the merged object
    pub fn to_text(&self) -> Result<String> {
        if !self.changed {
            return Ok("no drift\n".to_string());
        }
        let mut out = String::new();
        for change in &self.changes {
            let from = serde_json::to_string(&change.from)?;
            let to = serde_json::to_string(&change.to)?;
            let _ = writeln!(out, "~ {}: {} -> {}", change.field, from, to);
        }
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(&self.merged)?);
        Ok(out)
    }
}

pub fn run(args: DiffArgs) -> Result<Status> {
    let solr: SolrCloud = read_manifest(&args.solrcloud)?;
    let live = read_manifest_value::<ZookeeperCluster>(&args.zookeepercluster)?;
    let report = diff(&solr, live)?;
    print!("{}", report.to_text()?);
    Ok(if report.changed {
        Status::Drift
    } else {
        Status::Clean
    })
}

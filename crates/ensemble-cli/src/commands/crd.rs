//! Print the CRDs this tool reads and writes

use kube::CustomResourceExt;

use ensemble_common::crd::{SolrCloud, ZookeeperCluster};

use crate::Result;

/// Both CRDs as a multi-document YAML stream
pub fn crd_manifests() -> Result<String> {
    let solr = serde_yaml::to_string(&SolrCloud::crd())?;
    let zookeeper = serde_yaml::to_string(&ZookeeperCluster::crd())?;
    Ok(format!("{solr}---\n{zookeeper}"))
}

pub fn run() -> Result<()> {
    print!("{}", crd_manifests()?);
    Ok(())
}

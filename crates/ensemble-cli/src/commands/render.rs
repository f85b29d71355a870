//! Render the ZookeeperCluster a SolrCloud asks for

use std::path::PathBuf;

use clap::Args;

use ensemble_common::crd::SolrCloud;

use super::{desired_zookeeper, read_manifest};
use crate::Result;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// SolrCloud manifest
    pub solrcloud: PathBuf,
}

/// Synthesize the desired ZookeeperCluster as YAML
pub fn render(solr: &SolrCloud) -> Result<String> {
    Ok(serde_yaml::to_string(&desired_zookeeper(solr)?)?)
}

pub fn run(args: RenderArgs) -> Result<()> {
    let solr: SolrCloud = read_manifest(&args.solrcloud)?;
    print!("{}", render(&solr)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::SOLR_YAML;
    use ensemble_common::crd::ZookeeperCluster;

    #[test]
    fn rendered_cluster_parses_back() {
        let solr: SolrCloud = serde_yaml::from_str(SOLR_YAML).unwrap();
        let out = render(&solr).unwrap();
        let zk: ZookeeperCluster = serde_yaml::from_str(&out).unwrap();
        assert_eq!(zk.metadata.name.as_deref(), Some("example-solrcloud-zookeeper"));
        assert_eq!(zk.metadata.namespace.as_deref(), Some("search"));
        assert_eq!(zk.spec.replicas, 3);
        assert_eq!(zk.spec.image.tag, "3.8");
    }
}

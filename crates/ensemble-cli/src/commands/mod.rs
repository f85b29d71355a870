//! CLI commands

use std::path::Path;

use kube::Resource;
use serde::de::DeserializeOwned;
use serde_json::Value;

use ensemble_common::crd::{SolrCloud, ZookeeperCluster};
use ensemble_common::manifest::{parse_manifest, parse_manifest_value};
use ensemble_zookeeper::compiler::compile_provided_zookeeper;
use ensemble_zookeeper::ZookeeperError;

use crate::{Error, Result};

pub mod acl_env;
pub mod apply;
pub mod crd;
pub mod diff;
pub mod render;

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a YAML manifest of kind `K` from disk
pub fn read_manifest<K>(path: &Path) -> Result<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    Ok(parse_manifest(&read_file(path)?)?)
}

/// Read a YAML manifest of kind `K` from disk, keeping every field
pub fn read_manifest_value<K>(path: &Path) -> Result<Value>
where
    K: Resource<DynamicType = ()>,
{
    Ok(parse_manifest_value::<K>(&read_file(path)?)?)
}

/// The ZookeeperCluster a SolrCloud asks for, or an error if it provides none
pub fn desired_zookeeper(solr: &SolrCloud) -> Result<ZookeeperCluster> {
    compile_provided_zookeeper(solr).ok_or_else(|| {
        ZookeeperError::NoProvidedZookeeper(kube::ResourceExt::name_any(solr)).into()
    })
}

//! Provided ZooKeeper ensembles for SolrCloud
//!
//! Synthesizes the `ZookeeperCluster` a SolrCloud asks for and keeps the live
//! object in line with it:
//! - `compiler` builds the desired object from the SolrCloud spec
//! - `drift` reconciles an observed object towards the desired one
//! - `acl` builds the Solr environment for ZooKeeper digest ACLs
//! - `controller` creates or updates the live object through the API

pub mod acl;
pub mod compiler;
pub mod controller;
pub mod drift;
pub mod error;

pub use error::ZookeeperError;

//! Custom Resource Definitions
//!
//! `SolrCloud` is the parent resource; `ZookeeperCluster` is the dependent
//! ensemble owned by the downstream ZooKeeper operator.

mod solr_cloud;
mod zookeeper_cluster;

pub use solr_cloud::{
    ContainerImage, SolrAddressabilityOptions, SolrCloud, SolrCloudSpec, SolrDataStorageOptions,
    SolrEphemeralDataStorageOptions, SolrPersistentDataStorageOptions, ZookeeperAcl,
    ZookeeperConnectionInfo, ZookeeperEphemeral, ZookeeperPersistence, ZookeeperPodPolicy,
    ZookeeperRef, ZookeeperSpec, SOLR_CLOUD_LABEL, TECHNOLOGY_LABEL, ZOOKEEPER_TECHNOLOGY,
};
pub use zookeeper_cluster::{
    zookeeper_ports, AdminServerServicePolicy, Ephemeral, Persistence, PodPolicy, Probe, Probes,
    ServicePolicy, StorageType, StorageVariant, VolumeReclaimPolicy, ZookeeperCluster,
    ZookeeperClusterSpec, ZookeeperClusterStatus, ZookeeperConfig, ZookeeperImage, CLIENT_PORT,
    DEFAULT_CLUSTER_DOMAIN, DEFAULT_SERVICE_ACCOUNT, LEADER_ELECTION_PORT, QUORUM_PORT,
};

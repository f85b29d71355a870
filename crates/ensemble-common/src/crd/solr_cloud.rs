//! SolrCloud CRD types
//!
//! Only the parts of the SolrCloud spec that drive the provided ZooKeeper
//! ensemble are modelled here. Unknown fields are ignored on read.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Affinity, Container, EmptyDirVolumeSource, EnvVar, LocalObjectReference,
    PersistentVolumeClaimSpec, PodSecurityContext, ResourceRequirements, Toleration,
    TopologySpreadConstraint, Volume, VolumeMount,
};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::zookeeper_cluster::{
    AdminServerServicePolicy, Probes, ServicePolicy, VolumeReclaimPolicy, ZookeeperConfig,
};

/// Label key naming the SolrCloud a resource belongs to
pub const SOLR_CLOUD_LABEL: &str = "solr-cloud";
/// Label key naming the technology a resource runs
pub const TECHNOLOGY_LABEL: &str = "technology";
/// Value of [`TECHNOLOGY_LABEL`] on ZooKeeper resources
pub const ZOOKEEPER_TECHNOLOGY: &str = "zookeeper";

// =============================================================================
// ZooKeeper reference
// =============================================================================

/// How a SolrCloud finds its ZooKeeper ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperRef {
    /// Connection details for an existing ensemble
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ZookeeperConnectionInfo>,

    /// Spec of an ensemble the operator creates and owns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided: Option<ZookeeperSpec>,
}

/// Connection details for an ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperConnectionInfo {
    /// Connection string used inside the cluster
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub internal_connection_string: String,

    /// Connection string used from outside the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_connection_string: Option<String>,

    /// ZNode path Solr stores its state under
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chroot: String,

    /// Credentials with full access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<ZookeeperAcl>,

    /// Credentials with read-only access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_acl: Option<ZookeeperAcl>,
}

/// Digest credentials stored in a Secret
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperAcl {
    /// Name of the Secret holding the credentials
    #[serde(rename = "secret")]
    pub secret_ref: String,

    /// Key of the username within the Secret
    pub username_key: String,

    /// Key of the password within the Secret
    pub password_key: String,
}

// =============================================================================
// Provided ensemble
// =============================================================================

/// Container image reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerImage {
    /// Image repository
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,

    /// Image tag
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// Image pull policy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pull_policy: String,

    /// Secret used to pull the image
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_pull_secret: String,
}

/// Pod options for the provided ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperPodPolicy {
    /// Scheduling affinity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    /// Node selector for pod placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Topology spread constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_spread_constraints: Option<Vec<TopologySpreadConstraint>>,

    /// Compute resources of the zookeeper container
    #[serde(default)]
    pub resources: ResourceRequirements,

    /// Tolerations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    /// Extra environment variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvVar>>,

    /// Annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Pod security context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,

    /// Termination grace period in seconds
    #[serde(default)]
    pub termination_grace_period_seconds: i64,

    /// Service account the pods run as
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account_name: String,

    /// Secrets used to pull the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<LocalObjectReference>>,
}

/// Persistent storage for the provided ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperPersistence {
    /// Reclaim policy for the claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclaim_policy: Option<VolumeReclaimPolicy>,

    /// Claim template
    #[serde(default, rename = "spec")]
    pub persistent_volume_claim_spec: PersistentVolumeClaimSpec,

    /// Annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Ephemeral storage for the provided ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ZookeeperEphemeral {
    /// The emptyDir volume backing the data directory
    #[serde(default, rename = "emptydirvolumesource")]
    pub empty_dir_volume_source: EmptyDirVolumeSource,
}

/// Spec of a ZooKeeper ensemble created for a SolrCloud
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperSpec {
    /// Extra labels for the ensemble; these win over the SolrCloud's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Ensemble size; zero lets the downstream default apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Container image
    #[serde(default)]
    pub image: ContainerImage,

    /// Persistent storage; takes precedence over `ephemeral`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<ZookeeperPersistence>,

    /// Ephemeral storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<ZookeeperEphemeral>,

    /// zoo.cfg settings
    #[serde(default)]
    pub config: ZookeeperConfig,

    /// Pod-level settings
    #[serde(default, rename = "zookeeperPodPolicy")]
    pub zookeeper_pod: ZookeeperPodPolicy,

    /// Admin server service settings
    #[serde(default)]
    pub admin_server_service: AdminServerServicePolicy,

    /// Client service settings
    #[serde(default)]
    pub client_service: ServicePolicy,

    /// Headless service settings
    #[serde(default)]
    pub headless_service: ServicePolicy,

    /// Sidecar containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<Container>>,

    /// Init containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,

    /// Extra volumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,

    /// Extra volume mounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,

    /// Probe timings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probes: Option<Probes>,

    /// Pods that may be unavailable during disruptions
    #[serde(default)]
    pub max_unavailable_replicas: i32,
}

// =============================================================================
// Solr-side options consulted by the ensemble
// =============================================================================

/// Where Solr keeps its own data
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolrDataStorageOptions {
    /// Persistent volumes for Solr data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_storage: Option<SolrPersistentDataStorageOptions>,

    /// emptyDir volumes for Solr data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_storage: Option<SolrEphemeralDataStorageOptions>,
}

/// Persistent Solr data volumes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolrPersistentDataStorageOptions {
    /// Reclaim policy for the claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclaim_policy: Option<VolumeReclaimPolicy>,

    /// Claim template for Solr data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_template: Option<PersistentVolumeClaimSpec>,
}

/// Ephemeral Solr data volumes
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolrEphemeralDataStorageOptions {
    /// emptyDir settings for Solr data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
}

/// How Solr nodes are addressed
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolrAddressabilityOptions {
    /// DNS suffix of the Kubernetes cluster
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kube_domain: String,
}

// =============================================================================
// CRD
// =============================================================================

/// A Solr cluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "solr.apache.org",
    version = "v1beta1",
    kind = "SolrCloud",
    plural = "solrclouds",
    shortname = "solr",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SolrCloudSpec {
    /// Number of Solr nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// ZooKeeper ensemble backing this cloud
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zookeeper_ref: Option<ZookeeperRef>,

    /// Storage for Solr data
    #[serde(default)]
    pub storage_options: SolrDataStorageOptions,

    /// Addressing of Solr nodes
    #[serde(default)]
    pub solr_addressability: SolrAddressabilityOptions,
}

impl SolrCloud {
    /// Name of the ZookeeperCluster created for this cloud
    pub fn provided_zookeeper_name(&self) -> String {
        format!("{}-solrcloud-zookeeper", self.name_any())
    }

    /// The given labels plus the label tying a resource to this cloud
    pub fn shared_labels_with(&self, labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut shared = labels.clone();
        shared.insert(SOLR_CLOUD_LABEL.to_string(), self.name_any());
        shared
    }

    /// The provided ensemble spec, if this cloud asks for one
    pub fn provided_zookeeper(&self) -> Option<&ZookeeperSpec> {
        self.spec.zookeeper_ref.as_ref()?.provided.as_ref()
    }

    /// The full-access and read-only ACL descriptors
    pub fn zookeeper_acls(&self) -> (Option<&ZookeeperAcl>, Option<&ZookeeperAcl>) {
        let info = self
            .spec
            .zookeeper_ref
            .as_ref()
            .and_then(|r| r.connection_info.as_ref());
        match info {
            Some(info) => (info.acl.as_ref(), info.read_only_acl.as_ref()),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLR_YAML: &str = r#"
apiVersion: solr.apache.org/v1beta1
kind: SolrCloud
metadata:
  name: example
  namespace: search
  labels:
    team: data
spec:
  replicas: 3
  zookeeperRef:
    connectionInfo:
      acl:
        secret: zk-creds
        usernameKey: user
        passwordKey: pass
    provided:
      replicas: 3
      image:
        repository: zk
        tag: "3.8"
        imagePullSecret: regcred
      zookeeperPodPolicy:
        serviceAccountName: zk-sa
      ephemeral:
        emptydirvolumesource:
          medium: Memory
  solrAddressability:
    kubeDomain: corp.local
"#;

    fn parse() -> SolrCloud {
        serde_yaml::from_str(SOLR_YAML).expect("SolrCloud YAML should parse")
    }

    #[test]
    fn parses_provided_zookeeper() {
        let solr = parse();
        let zk = solr.provided_zookeeper().expect("provided spec");
        assert_eq!(zk.replicas, Some(3));
        assert_eq!(zk.image.tag, "3.8");
        assert_eq!(zk.image.image_pull_secret, "regcred");
        assert_eq!(zk.zookeeper_pod.service_account_name, "zk-sa");
        let ephemeral = zk.ephemeral.as_ref().expect("ephemeral");
        assert_eq!(ephemeral.empty_dir_volume_source.medium.as_deref(), Some("Memory"));
        assert!(zk.persistence.is_none());
        assert_eq!(solr.spec.solr_addressability.kube_domain, "corp.local");
    }

    #[test]
    fn provided_name_is_derived_from_cloud_name() {
        assert_eq!(parse().provided_zookeeper_name(), "example-solrcloud-zookeeper");
    }

    #[test]
    fn shared_labels_add_cloud_label() {
        let solr = parse();
        let labels = solr.shared_labels_with(solr.labels());
        assert_eq!(labels["team"], "data");
        assert_eq!(labels[SOLR_CLOUD_LABEL], "example");
    }

    #[test]
    fn acls_come_from_connection_info() {
        let solr = parse();
        let (all, read_only) = solr.zookeeper_acls();
        assert_eq!(all.map(|a| a.secret_ref.as_str()), Some("zk-creds"));
        assert!(read_only.is_none());
    }

    #[test]
    fn cloud_without_zookeeper_ref_has_nothing_provided() {
        let solr = SolrCloud::new("bare", SolrCloudSpec::default());
        assert!(solr.provided_zookeeper().is_none());
        assert_eq!(solr.zookeeper_acls(), (None, None));
    }
}

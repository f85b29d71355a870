//! ZookeeperCluster CRD types
//!
//! `ZookeeperCluster` is owned by the downstream ZooKeeper operator. The types
//! here mirror its wire layout so observed objects deserialize in whatever
//! shape that operator left them, including both storage fields populated.
//! Writers go through [`ZookeeperClusterSpec::set_storage`], which keeps the
//! storage union well formed.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Affinity, Container, ContainerPort, EmptyDirVolumeSource, EnvVar, LocalObjectReference,
    PersistentVolumeClaimSpec, PodAffinityTerm, PodAntiAffinity, PodSecurityContext,
    ResourceRequirements, Toleration, TopologySpreadConstraint, Volume, VolumeMount,
    VolumeResourceRequirements, WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kube_utils::parse_quantity;

// =============================================================================
// Protocol constants
// =============================================================================

/// Port ZooKeeper clients connect to
pub const CLIENT_PORT: i32 = 2181;
/// Port followers use to talk to the leader
pub const QUORUM_PORT: i32 = 2888;
/// Port used for leader election
pub const LEADER_ELECTION_PORT: i32 = 3888;

/// Image repository the downstream operator falls back to
pub const DEFAULT_REPOSITORY: &str = "pravega/zookeeper";
/// Image tag the downstream operator falls back to
pub const DEFAULT_TAG: &str = "0.2.15";
/// Image pull policy the downstream operator falls back to
pub const DEFAULT_PULL_POLICY: &str = "Always";
/// Service account the downstream operator assigns when none is requested
pub const DEFAULT_SERVICE_ACCOUNT: &str = "default";
/// Cluster domain the downstream operator assumes when none is requested
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";
/// Default ensemble size
pub const DEFAULT_REPLICAS: i32 = 3;
/// Default pod termination grace period, in seconds
pub const DEFAULT_TERMINATION_GRACE_PERIOD: i64 = 30;
/// Default size of the data volume claim
pub const DEFAULT_STORAGE_SIZE: &str = "20Gi";

/// The three named container ports every ensemble member exposes
pub fn zookeeper_ports() -> Vec<ContainerPort> {
    [
        ("client", CLIENT_PORT),
        ("quorum", QUORUM_PORT),
        ("leader-election", LEADER_ELECTION_PORT),
    ]
    .into_iter()
    .map(|(name, port)| ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        ..Default::default()
    })
    .collect()
}

// =============================================================================
// Image
// =============================================================================

/// Container image used by ensemble members
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperImage {
    /// Image repository
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,

    /// Image tag
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// Image pull policy
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pull_policy: String,
}

impl ZookeeperImage {
    fn with_defaults(&mut self) -> bool {
        let mut changed = false;
        for (field, default) in [
            (&mut self.repository, DEFAULT_REPOSITORY),
            (&mut self.tag, DEFAULT_TAG),
            (&mut self.pull_policy, DEFAULT_PULL_POLICY),
        ] {
            if field.is_empty() {
                *field = default.to_string();
                changed = true;
            }
        }
        changed
    }
}

// =============================================================================
// Pod policy
// =============================================================================

/// Pod-level settings applied to every ensemble member
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodPolicy {
    /// Labels attached to the pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Node selector for pod placement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Scheduling affinity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

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

    /// Annotations attached to the pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

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

impl PodPolicy {
    fn with_defaults(&mut self, cluster_name: &str) -> bool {
        let mut changed = false;
        if self.termination_grace_period_seconds == 0 {
            self.termination_grace_period_seconds = DEFAULT_TERMINATION_GRACE_PERIOD;
            changed = true;
        }
        if self.service_account_name.is_empty() {
            self.service_account_name = DEFAULT_SERVICE_ACCOUNT.to_string();
            changed = true;
        }
        let labels = self.labels.get_or_insert_with(|| {
            changed = true;
            BTreeMap::new()
        });
        for (key, value) in [("app", cluster_name), ("kind", "ZookeeperMember")] {
            if !labels.contains_key(key) {
                labels.insert(key.to_string(), value.to_string());
                changed = true;
            }
        }
        if self.affinity.is_none() {
            self.affinity = Some(default_anti_affinity(cluster_name));
            changed = true;
        }
        changed
    }
}

/// Prefer spreading ensemble members across hosts
fn default_anti_affinity(cluster_name: &str) -> Affinity {
    Affinity {
        pod_anti_affinity: Some(PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                WeightedPodAffinityTerm {
                    weight: 20,
                    pod_affinity_term: PodAffinityTerm {
                        topology_key: "kubernetes.io/hostname".to_string(),
                        label_selector: Some(LabelSelector {
                            match_expressions: Some(vec![LabelSelectorRequirement {
                                key: "app".to_string(),
                                operator: "In".to_string(),
                                values: Some(vec![cluster_name.to_string()]),
                            }]),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

// =============================================================================
// Services
// =============================================================================

/// Settings for the admin server service
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminServerServicePolicy {
    /// Annotations attached to the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    /// Expose the admin server through a LoadBalancer
    #[serde(default)]
    pub external: bool,
}

/// Settings for a client or headless service
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePolicy {
    /// Annotations attached to the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

// =============================================================================
// zoo.cfg
// =============================================================================

/// Settings rendered into `zoo.cfg`
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperConfig {
    /// Ticks followers may take to connect and sync to the leader
    #[serde(default)]
    pub init_limit: i32,
    /// Length of a single tick in milliseconds
    #[serde(default)]
    pub tick_time: i32,
    /// Ticks a follower may lag behind the leader
    #[serde(default)]
    pub sync_limit: i32,
    /// Maximum queued requests across the ensemble
    #[serde(default)]
    pub global_outstanding_limit: i32,
    /// Transaction log preallocation block size, in KB
    #[serde(default)]
    pub pre_alloc_size: i32,
    /// Transactions between snapshots
    #[serde(default)]
    pub snap_count: i32,
    /// Committed requests kept in memory
    #[serde(default)]
    pub commit_log_count: i32,
    /// Snapshot size limit, in KB
    #[serde(default)]
    pub snap_size_limit_in_kb: i64,
    /// Concurrent connections a single client may open
    #[serde(default)]
    pub max_client_cnxns: i32,
    /// Concurrent connections a server accepts, 0 for no limit
    #[serde(default)]
    pub max_cnxns: i32,
    /// Minimum session timeout in milliseconds
    #[serde(default)]
    pub min_session_timeout: i32,
    /// Maximum session timeout in milliseconds
    #[serde(default)]
    pub max_session_timeout: i32,
    /// Snapshots retained by autopurge
    #[serde(default)]
    pub auto_purge_snap_retain_count: i32,
    /// Autopurge interval in hours
    #[serde(default)]
    pub auto_purge_purge_interval: i32,
    /// Listen for quorum traffic on all interfaces
    #[serde(default, rename = "quorumListenOnAllIPs")]
    pub quorum_listen_on_all_ips: bool,
    /// Extra `key=value` lines for `zoo.cfg`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_config: Option<BTreeMap<String, String>>,
}

impl ZookeeperConfig {
    fn with_defaults(&mut self) -> bool {
        let mut changed = false;
        let mut default_i32 = |field: &mut i32, value: i32| {
            if *field == 0 {
                *field = value;
                changed = true;
            }
        };
        default_i32(&mut self.init_limit, 10);
        default_i32(&mut self.tick_time, 2000);
        default_i32(&mut self.sync_limit, 2);
        default_i32(&mut self.global_outstanding_limit, 1000);
        default_i32(&mut self.pre_alloc_size, 65536);
        default_i32(&mut self.snap_count, 10000);
        default_i32(&mut self.commit_log_count, 500);
        default_i32(&mut self.max_client_cnxns, 60);
        let tick = self.tick_time;
        default_i32(&mut self.min_session_timeout, 2 * tick);
        default_i32(&mut self.max_session_timeout, 20 * tick);
        default_i32(&mut self.auto_purge_snap_retain_count, 3);
        default_i32(&mut self.auto_purge_purge_interval, 1);
        if self.snap_size_limit_in_kb == 0 {
            self.snap_size_limit_in_kb = 4_194_304;
            changed = true;
        }
        changed
    }
}

// =============================================================================
// Probes
// =============================================================================

/// Timing of a readiness or liveness probe
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// Seconds before the first probe
    #[serde(default)]
    pub initial_delay_seconds: i32,
    /// Seconds between probes
    #[serde(default)]
    pub period_seconds: i32,
    /// Consecutive failures before the probe fails
    #[serde(default)]
    pub failure_threshold: i32,
    /// Consecutive successes before the probe passes
    #[serde(default)]
    pub success_threshold: i32,
    /// Probe timeout in seconds
    #[serde(default)]
    pub timeout_seconds: i32,
}

impl Probe {
    fn standard() -> Self {
        Self {
            initial_delay_seconds: 10,
            period_seconds: 10,
            failure_threshold: 3,
            success_threshold: 1,
            timeout_seconds: 10,
        }
    }
}

/// Readiness and liveness probes of the zookeeper container
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Probes {
    /// Readiness probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    /// Liveness probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
}

impl Probes {
    fn with_defaults(&mut self) -> bool {
        let mut changed = false;
        for probe in [&mut self.readiness_probe, &mut self.liveness_probe] {
            if probe.is_none() {
                *probe = Some(Probe::standard());
                changed = true;
            }
        }
        changed
    }
}

// =============================================================================
// Storage
// =============================================================================

/// What happens to data volumes when the cluster is deleted
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum VolumeReclaimPolicy {
    /// Keep the claims
    #[default]
    Retain,
    /// Delete the claims with the cluster
    Delete,
}

/// Discriminant of the storage union
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Data lives on persistent volume claims
    #[default]
    Persistence,
    /// Data lives on emptyDir volumes
    Ephemeral,
    /// Empty or unrecognized; neither storage field is in effect
    #[serde(rename = "", other)]
    Unset,
}

impl StorageType {
    /// Wire representation of the discriminant
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistence => "persistence",
            Self::Ephemeral => "ephemeral",
            Self::Unset => "",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent volume storage
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persistence {
    /// Reclaim policy for the data claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclaim_policy: Option<VolumeReclaimPolicy>,

    /// Claim template for the data volume
    #[serde(default, rename = "spec")]
    pub persistent_volume_claim_spec: PersistentVolumeClaimSpec,

    /// Annotations attached to the claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Persistence {
    fn with_defaults(&mut self) -> bool {
        let mut changed = false;
        if self.reclaim_policy.is_none() {
            self.reclaim_policy = Some(VolumeReclaimPolicy::Retain);
            changed = true;
        }
        let claim = &mut self.persistent_volume_claim_spec;
        claim.access_modes = Some(vec!["ReadWriteOnce".to_string()]);

        let storage_is_zero = claim
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .and_then(|r| r.get("storage"))
            .map(|q| parse_quantity(q).unwrap_or(0.0) == 0.0)
            .unwrap_or(true);
        if storage_is_zero {
            let resources = claim
                .resources
                .get_or_insert_with(VolumeResourceRequirements::default);
            resources.requests = Some(BTreeMap::from([(
                "storage".to_string(),
                Quantity(DEFAULT_STORAGE_SIZE.to_string()),
            )]));
            changed = true;
        }
        changed
    }
}

/// emptyDir storage
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Ephemeral {
    /// The emptyDir volume backing the data directory
    #[serde(default, rename = "emptydirvolumesource")]
    pub empty_dir_volume_source: EmptyDirVolumeSource,
}

/// The selected storage configuration
///
/// Exactly one variant exists at a time, so "both populated" cannot be
/// expressed by a synthesized spec.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageVariant {
    /// Persistent volume claims
    Persistence(Persistence),
    /// emptyDir volumes
    Ephemeral(Ephemeral),
}

impl StorageVariant {
    /// The discriminant for this variant
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::Persistence(_) => StorageType::Persistence,
            Self::Ephemeral(_) => StorageType::Ephemeral,
        }
    }
}

// =============================================================================
// CRD
// =============================================================================

/// Desired state of a ZooKeeper ensemble
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "zookeeper.pravega.io",
    version = "v1beta1",
    kind = "ZookeeperCluster",
    plural = "zookeeperclusters",
    shortname = "zk",
    namespaced,
    derive = "PartialEq",
    status = "ZookeeperClusterStatus",
    printcolumn = r#"{"name":"Replicas","type":"integer","jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Ready","type":"integer","jsonPath":".status.readyReplicas"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperClusterSpec {
    /// Container image
    #[serde(default)]
    pub image: ZookeeperImage,

    /// Labels the downstream operator propagates to owned resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Ensemble size
    #[serde(default)]
    pub replicas: i32,

    /// Container ports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<ContainerPort>>,

    /// Pod-level settings
    #[serde(default)]
    pub pod: PodPolicy,

    /// Admin server service settings
    #[serde(default)]
    pub admin_server_service: AdminServerServicePolicy,

    /// Client service settings
    #[serde(default)]
    pub client_service: ServicePolicy,

    /// Headless service settings
    #[serde(default)]
    pub headless_service: ServicePolicy,

    /// zoo.cfg settings
    #[serde(default)]
    pub conf: ZookeeperConfig,

    /// Which storage field is in effect
    #[serde(default)]
    pub storage_type: StorageType,

    /// Persistent storage, when `storage_type` is persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<Persistence>,

    /// Ephemeral storage, when `storage_type` is ephemeral
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<Ephemeral>,

    /// DNS suffix of the Kubernetes cluster
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubernetes_cluster_domain: String,

    /// Sidecar containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<Container>>,

    /// Init containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,

    /// Extra volumes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,

    /// Extra volume mounts for the zookeeper container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,

    /// Probe timings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probes: Option<Probes>,

    /// Pods that may be unavailable during disruptions
    #[serde(default)]
    pub max_unavailable_replicas: i32,
}

impl ZookeeperClusterSpec {
    /// Select a storage variant, clearing the other one
    pub fn set_storage(&mut self, variant: StorageVariant) {
        self.storage_type = variant.storage_type();
        match variant {
            StorageVariant::Persistence(p) => {
                self.persistence = Some(p);
                self.ephemeral = None;
            }
            StorageVariant::Ephemeral(e) => {
                self.ephemeral = Some(e);
                self.persistence = None;
            }
        }
    }

    /// The storage variant selected by the discriminant, if it is populated
    pub fn storage(&self) -> Option<StorageVariant> {
        match self.storage_type {
            StorageType::Persistence => self.persistence.clone().map(StorageVariant::Persistence),
            StorageType::Ephemeral => self.ephemeral.clone().map(StorageVariant::Ephemeral),
            StorageType::Unset => None,
        }
    }
}

/// Observed state of a ZooKeeper ensemble
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperClusterStatus {
    /// Pods created by the downstream operator
    #[serde(default)]
    pub replicas: i32,
    /// Pods passing readiness
    #[serde(default)]
    pub ready_replicas: i32,
    /// In-cluster client endpoint
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub internal_client_endpoint: String,
    /// External client endpoint, when exposed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub external_client_endpoint: String,
}

impl ZookeeperCluster {
    /// Apply the defaults the downstream operator would apply itself.
    ///
    /// Desired objects must already carry these, otherwise every pass would
    /// see a difference between "unset" and the default the downstream
    /// operator wrote back. Returns true if anything was filled in.
    pub fn with_defaults(&mut self) -> bool {
        let name = self.metadata.name.clone().unwrap_or_default();
        let spec = &mut self.spec;

        let mut changed = spec.image.with_defaults();
        changed |= spec.conf.with_defaults();

        if spec.replicas == 0 {
            spec.replicas = DEFAULT_REPLICAS;
            changed = true;
        }
        if spec.probes.is_none() {
            spec.probes = Some(Probes::default());
            changed = true;
        }
        if let Some(probes) = spec.probes.as_mut() {
            changed |= probes.with_defaults();
        }

        if spec.ports.as_ref().map_or(true, Vec::is_empty) {
            spec.ports = Some(zookeeper_ports());
            changed = true;
        }

        let labels = spec.labels.get_or_insert_with(BTreeMap::new);
        for key in ["app", "release"] {
            if !labels.contains_key(key) {
                labels.insert(key.to_string(), name.clone());
                changed = true;
            }
        }

        changed |= spec.pod.with_defaults(&name);

        if spec.storage_type == StorageType::Unset {
            spec.storage_type = if spec.ephemeral.is_some() {
                StorageType::Ephemeral
            } else {
                StorageType::Persistence
            };
            changed = true;
        }
        match spec.storage_type {
            StorageType::Ephemeral => {
                if spec.ephemeral.is_none() {
                    spec.ephemeral = Some(Ephemeral::default());
                    changed = true;
                }
            }
            StorageType::Persistence => {
                if spec.persistence.is_none() {
                    spec.persistence = Some(Persistence::default());
                    changed = true;
                }
                if let Some(persistence) = spec.persistence.as_mut() {
                    changed |= persistence.with_defaults();
                }
            }
            StorageType::Unset => {}
        }

        if spec.kubernetes_cluster_domain.is_empty() {
            spec.kubernetes_cluster_domain = DEFAULT_CLUSTER_DOMAIN.to_string();
            changed = true;
        }
        if spec.max_unavailable_replicas < 1 {
            spec.max_unavailable_replicas = 1;
            changed = true;
        }
        changed
    }

    /// In-cluster address of the client service
    pub fn client_endpoint(&self) -> String {
        let domain = if self.spec.kubernetes_cluster_domain.is_empty() {
            DEFAULT_CLUSTER_DOMAIN
        } else {
            &self.spec.kubernetes_cluster_domain
        };
        format!(
            "{}-client.{}.svc.{}:{}",
            self.metadata.name.as_deref().unwrap_or_default(),
            self.metadata.namespace.as_deref().unwrap_or("default"),
            domain,
            CLIENT_PORT
        )
    }
}

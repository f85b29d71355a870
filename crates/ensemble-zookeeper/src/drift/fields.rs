//! Field table for ZookeeperCluster drift detection
//!
//! Each owned spec field is described once: its path, how it is synchronized
//! and how absent values compare against empty ones. A single routine,
//! [`apply_rule`], interprets every entry.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    Affinity, Container, EnvVar, LocalObjectReference, PodSecurityContext, Toleration,
    TopologySpreadConstraint, Volume, VolumeMount,
};
use serde::Serialize;
use serde_json::Value;

use ensemble_common::crd::{
    AdminServerServicePolicy, Probes, ServicePolicy, StorageType, ZookeeperClusterSpec,
    ZookeeperConfig, DEFAULT_SERVICE_ACCOUNT,
};
use ensemble_common::equality::{deep_equal, is_absent, is_zero, NilPolicy};
use ensemble_common::recorder::{record_change, DriftRecorder};

/// How a desired value is carried over to the observed object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Overwrite whenever the values differ
    Always,
    /// Like `Always`, but an empty desired value is no opinion and is skipped
    IfSourceNonEmpty,
    /// Report a change only when the desired value is present and differs,
    /// but always assign it. Used where the downstream operator fills in its
    /// own value when ours is unset.
    IfSourcePresent,
    /// Overwrite when the values differ, unless the desired value is empty
    /// and the observed value is the downstream default
    UnlessDownstreamDefault(&'static str),
}

/// One entry of the field table
pub trait SyncField {
    /// Path of the field, e.g. `spec.image.tag`
    fn name(&self) -> &'static str;

    /// Synchronization policy of the field
    fn policy(&self) -> SyncPolicy;

    /// Pull the observed field towards the desired one.
    /// Returns true if an update is required.
    fn sync(
        &self,
        desired: &ZookeeperClusterSpec,
        observed: &mut ZookeeperClusterSpec,
        recorder: &mut dyn DriftRecorder,
    ) -> bool;
}

/// A field of `ZookeeperClusterSpec` addressed through an accessor pair
pub struct FieldRule<T> {
    /// Path of the field
    pub name: &'static str,
    /// Synchronization policy
    pub policy: SyncPolicy,
    /// Comparison semantics for absent values
    pub nils: NilPolicy,
    /// Read accessor
    pub get: fn(&ZookeeperClusterSpec) -> &T,
    /// Write accessor
    pub get_mut: fn(&mut ZookeeperClusterSpec) -> &mut T,
}

impl<T: Serialize + Clone> SyncField for FieldRule<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn policy(&self) -> SyncPolicy {
        self.policy
    }

    fn sync(
        &self,
        desired: &ZookeeperClusterSpec,
        observed: &mut ZookeeperClusterSpec,
        recorder: &mut dyn DriftRecorder,
    ) -> bool {
        apply_rule(
            self.name,
            self.policy,
            self.nils,
            (self.get)(desired),
            (self.get_mut)(observed),
            recorder,
        )
    }
}

/// Apply a synchronization policy to a single value.
///
/// Returns true if the field requires an update; the change is reported to
/// the recorder before `observed` is overwritten.
pub fn apply_rule<T: Serialize + Clone>(
    name: &str,
    policy: SyncPolicy,
    nils: NilPolicy,
    desired: &T,
    observed: &mut T,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    match policy {
        SyncPolicy::Always => sync_value(name, nils, desired, observed, recorder),
        SyncPolicy::IfSourceNonEmpty => {
            if is_zero(desired) {
                return false;
            }
            sync_value(name, nils, desired, observed, recorder)
        }
        SyncPolicy::IfSourcePresent => {
            let changed = !is_absent(desired) && !deep_equal(&*observed, desired, nils);
            if changed {
                record_change(recorder, name, &*observed, desired);
            }
            *observed = desired.clone();
            changed
        }
        SyncPolicy::UnlessDownstreamDefault(sentinel) => {
            let at_default = matches!(
                serde_json::to_value(&*observed),
                Ok(Value::String(ref s)) if s.as_str() == sentinel
            );
            if deep_equal(&*observed, desired, nils) || (is_zero(desired) && at_default) {
                return false;
            }
            record_change(recorder, name, &*observed, desired);
            *observed = desired.clone();
            true
        }
    }
}

/// Overwrite `observed` with `desired` when they differ
pub fn sync_value<T: Serialize + Clone>(
    name: &str,
    nils: NilPolicy,
    desired: &T,
    observed: &mut T,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    if deep_equal(&*observed, desired, nils) {
        return false;
    }
    record_change(recorder, name, &*observed, desired);
    *observed = desired.clone();
    true
}

macro_rules! field {
    ($name:literal, $policy:expr, $nils:expr, $ty:ty, $($path:ident).+) => {{
        fn get(spec: &ZookeeperClusterSpec) -> &$ty {
            &spec.$($path).+
        }
        fn get_mut(spec: &mut ZookeeperClusterSpec) -> &mut $ty {
            &mut spec.$($path).+
        }
        Box::new(FieldRule::<$ty> {
            name: $name,
            policy: $policy,
            nils: $nils,
            get,
            get_mut,
        }) as Box<dyn SyncField>
    }};
}

type StringMap = Option<BTreeMap<String, String>>;

/// Every scalar and whole-value field the controller owns.
///
/// Storage and compute resources need merging rather than overwriting and
/// are handled outside the table.
pub fn spec_fields() -> Vec<Box<dyn SyncField>> {
    use NilPolicy::{EqualsEmpty, PresenceStrict, Strict};
    use SyncPolicy::{Always, IfSourceNonEmpty, IfSourcePresent, UnlessDownstreamDefault};

    vec![
        field!("spec.replicas", Always, EqualsEmpty, i32, replicas),
        field!("spec.labels", Always, EqualsEmpty, StringMap, labels),
        field!("spec.image.repository", Always, EqualsEmpty, String, image.repository),
        field!("spec.image.tag", IfSourceNonEmpty, EqualsEmpty, String, image.tag),
        field!("spec.image.pullPolicy", Always, EqualsEmpty, String, image.pull_policy),
        field!("spec.storageType", Always, EqualsEmpty, StorageType, storage_type),
        field!("spec.pod.env", Always, EqualsEmpty, Option<Vec<EnvVar>>, pod.env),
        field!(
            "spec.pod.tolerations",
            Always,
            EqualsEmpty,
            Option<Vec<Toleration>>,
            pod.tolerations
        ),
        field!("spec.pod.nodeSelector", Always, EqualsEmpty, StringMap, pod.node_selector),
        field!("spec.pod.affinity", IfSourcePresent, Strict, Option<Affinity>, pod.affinity),
        field!(
            "spec.pod.serviceAccountName",
            UnlessDownstreamDefault(DEFAULT_SERVICE_ACCOUNT),
            EqualsEmpty,
            String,
            pod.service_account_name
        ),
        field!("spec.pod.labels", Always, EqualsEmpty, StringMap, pod.labels),
        field!("spec.pod.annotations", Always, EqualsEmpty, StringMap, pod.annotations),
        field!(
            "spec.pod.securityContext",
            Always,
            PresenceStrict,
            Option<PodSecurityContext>,
            pod.security_context
        ),
        field!(
            "spec.pod.terminationGracePeriodSeconds",
            Always,
            EqualsEmpty,
            i64,
            pod.termination_grace_period_seconds
        ),
        field!(
            "spec.pod.imagePullSecrets",
            Always,
            EqualsEmpty,
            Option<Vec<LocalObjectReference>>,
            pod.image_pull_secrets
        ),
        field!(
            "spec.pod.topologySpreadConstraints",
            Always,
            EqualsEmpty,
            Option<Vec<TopologySpreadConstraint>>,
            pod.topology_spread_constraints
        ),
        field!(
            "spec.kubernetesClusterDomain",
            IfSourceNonEmpty,
            EqualsEmpty,
            String,
            kubernetes_cluster_domain
        ),
        field!("spec.probes", Always, PresenceStrict, Option<Probes>, probes),
        field!("spec.conf", Always, EqualsEmpty, ZookeeperConfig, conf),
        field!("spec.containers", Always, EqualsEmpty, Option<Vec<Container>>, containers),
        field!(
            "spec.initContainers",
            Always,
            EqualsEmpty,
            Option<Vec<Container>>,
            init_containers
        ),
        field!("spec.volumes", Always, EqualsEmpty, Option<Vec<Volume>>, volumes),
        field!(
            "spec.volumeMounts",
            Always,
            EqualsEmpty,
            Option<Vec<VolumeMount>>,
            volume_mounts
        ),
        field!(
            "spec.adminServerService",
            Always,
            EqualsEmpty,
            AdminServerServicePolicy,
            admin_server_service
        ),
        field!("spec.clientService", Always, EqualsEmpty, ServicePolicy, client_service),
        field!("spec.headlessService", Always, EqualsEmpty, ServicePolicy, headless_service),
        field!(
            "spec.maxUnavailableReplicas",
            Always,
            EqualsEmpty,
            i32,
            max_unavailable_replicas
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_common::recorder::ChangeLog;
    use k8s_openapi::api::core::v1::NodeAffinity;
    use rstest::rstest;

    fn run(policy: SyncPolicy, desired: &str, observed: &str) -> (bool, String, ChangeLog) {
        let mut log = ChangeLog::new();
        let mut value = observed.to_string();
        let changed = apply_rule(
            "spec.field",
            policy,
            NilPolicy::EqualsEmpty,
            &desired.to_string(),
            &mut value,
            &mut log,
        );
        (changed, value, log)
    }

    #[rstest]
    #[case::always_differs(SyncPolicy::Always, "b", "a", true, "b")]
    #[case::always_equal(SyncPolicy::Always, "a", "a", false, "a")]
    #[case::always_clears(SyncPolicy::Always, "", "a", true, "")]
    #[case::nonempty_differs(SyncPolicy::IfSourceNonEmpty, "3.8", "3.7", true, "3.8")]
    #[case::nonempty_skips_empty(SyncPolicy::IfSourceNonEmpty, "", "v1", false, "v1")]
    #[case::sentinel_kept(SyncPolicy::UnlessDownstreamDefault("default"), "", "default", false, "default")]
    #[case::sentinel_replaced(SyncPolicy::UnlessDownstreamDefault("default"), "zk-sa", "default", true, "zk-sa")]
    #[case::sentinel_reset(SyncPolicy::UnlessDownstreamDefault("default"), "", "custom", true, "")]
    fn policies(
        #[case] policy: SyncPolicy,
        #[case] desired: &str,
        #[case] observed: &str,
        #[case] expect_changed: bool,
        #[case] expect_value: &str,
    ) {
        let (changed, value, log) = run(policy, desired, observed);
        assert_eq!(changed, expect_changed);
        assert_eq!(value, expect_value);
        assert_eq!(log.is_empty(), !expect_changed);
    }

    fn node_affinity() -> Option<Affinity> {
        Some(Affinity {
            node_affinity: Some(NodeAffinity::default()),
            ..Default::default()
        })
    }

    #[test]
    fn present_affinity_wins() {
        let mut log = ChangeLog::new();
        let mut observed: Option<Affinity> = Some(Affinity::default());
        let desired = node_affinity();
        assert!(apply_rule(
            "spec.pod.affinity",
            SyncPolicy::IfSourcePresent,
            NilPolicy::Strict,
            &desired,
            &mut observed,
            &mut log,
        ));
        assert_eq!(observed, desired);
        assert_eq!(log.fields(), vec!["spec.pod.affinity"]);
    }

    #[test]
    fn absent_affinity_is_assigned_without_signalling() {
        let mut log = ChangeLog::new();
        let mut observed = node_affinity();
        assert!(!apply_rule(
            "spec.pod.affinity",
            SyncPolicy::IfSourcePresent,
            NilPolicy::Strict,
            &None,
            &mut observed,
            &mut log,
        ));
        assert!(observed.is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn table_names_are_unique() {
        let fields = spec_fields();
        let mut names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn table_policies_match_downstream_defaulting() {
        let fields = spec_fields();
        let policy_of = |name: &str| {
            fields
                .iter()
                .find(|f| f.name() == name)
                .map(|f| f.policy())
        };
        assert_eq!(policy_of("spec.image.tag"), Some(SyncPolicy::IfSourceNonEmpty));
        assert_eq!(
            policy_of("spec.kubernetesClusterDomain"),
            Some(SyncPolicy::IfSourceNonEmpty)
        );
        assert_eq!(policy_of("spec.pod.affinity"), Some(SyncPolicy::IfSourcePresent));
        assert_eq!(
            policy_of("spec.pod.serviceAccountName"),
            Some(SyncPolicy::UnlessDownstreamDefault("default"))
        );
        assert_eq!(policy_of("spec.replicas"), Some(SyncPolicy::Always));
    }

    #[test]
    fn table_entry_reads_and_writes_its_field() {
        let fields = spec_fields();
        let replicas = fields
            .iter()
            .find(|f| f.name() == "spec.replicas")
            .unwrap();
        let desired = ZookeeperClusterSpec {
            replicas: 5,
            ..Default::default()
        };
        let mut observed = ZookeeperClusterSpec {
            replicas: 3,
            ..Default::default()
        };
        let mut log = ChangeLog::new();
        assert!(replicas.sync(&desired, &mut observed, &mut log));
        assert_eq!(observed.replicas, 5);
        assert_eq!(log.changes()[0].from, serde_json::json!(3));
        assert_eq!(log.changes()[0].to, serde_json::json!(5));
    }
}

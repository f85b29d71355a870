//! Shared Kubernetes helpers for building and merging object metadata
//!
//! The merge helpers take an observed object's fields and pull them towards
//! a desired value, reporting each change to a [`DriftRecorder`]. They return
//! true when anything was written.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ResourceRequirements, VolumeResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::recorder::{record_change, DriftRecorder};
use crate::{Error, Result};

// =============================================================================
// Labels and annotations
// =============================================================================

/// Merge two label or annotation maps. Keys in `base` win over `additional`.
pub fn merge_labels_or_annotations(
    base: &BTreeMap<String, String>,
    additional: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = additional.clone();
    merged.extend(base.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Copy every label and annotation of `from` onto `to`.
///
/// The merge is additive: keys only present on `to` are left alone, since
/// other controllers may own them.
pub fn merge_labels_and_annotations(
    from: &ObjectMeta,
    to: &mut ObjectMeta,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let labels = merge_string_map(
        from.labels.as_ref(),
        &mut to.labels,
        "metadata.labels",
        recorder,
    );
    let annotations = merge_string_map(
        from.annotations.as_ref(),
        &mut to.annotations,
        "metadata.annotations",
        recorder,
    );
    labels || annotations
}

fn merge_string_map(
    from: Option<&BTreeMap<String, String>>,
    to: &mut Option<BTreeMap<String, String>>,
    path: &str,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let Some(from) = from.filter(|m| !m.is_empty()) else {
        return false;
    };
    let to = to.get_or_insert_with(BTreeMap::new);
    let mut changed = false;
    for (key, value) in from {
        if to.get(key) != Some(value) {
            record_change(
                recorder,
                &format!("{path}.{key}"),
                &to.get(key),
                &Some(value),
            );
            to.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Controller owner reference pointing at `owner`.
///
/// Returns `None` when the owner has not been persisted yet (no uid).
pub fn controller_owner_ref<K>(owner: &K) -> Option<OwnerReference>
where
    K: Resource<DynamicType = ()>,
{
    let uid = owner.meta().uid.clone()?;
    Some(OwnerReference {
        api_version: K::api_version(&()).to_string(),
        kind: K::kind(&()).to_string(),
        name: owner.name_any(),
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    })
}

// =============================================================================
// Resource quantities
// =============================================================================

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1048576.0),
    ("Gi", 1073741824.0),
    ("Ti", 1099511627776.0),
    ("Pi", 1125899906842624.0),
    ("Ei", 1152921504606846976.0),
];

const DECIMAL_SUFFIXES: [(&str, f64); 9] = [
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Parse a Kubernetes quantity ("500m", "1Gi", "2e3") into its numeric value
pub fn parse_quantity(quantity: &Quantity) -> Option<f64> {
    let raw = quantity.0.trim();
    if raw.is_empty() {
        return None;
    }
    for (suffix, factor) in BINARY_SUFFIXES.iter().chain(DECIMAL_SUFFIXES.iter()) {
        if let Some(number) = raw.strip_suffix(suffix) {
            if let Ok(n) = number.parse::<f64>() {
                return Some(n * factor);
            }
        }
    }
    raw.parse::<f64>().ok()
}

/// Compare two quantities by value, so "1Gi" equals "1024Mi".
///
/// Unparseable quantities fall back to comparing their text.
pub fn quantities_equal(a: &Quantity, b: &Quantity) -> bool {
    match (parse_quantity(a), parse_quantity(b)) {
        (Some(x), Some(y)) => (x - y).abs() <= 1e-9 * x.abs().max(y.abs()),
        _ => a.0 == b.0,
    }
}

/// Pull a quantity map towards `from`: differing keys are adopted, keys
/// missing from `from` are removed.
pub fn merge_quantities(
    from: Option<&BTreeMap<String, Quantity>>,
    to: &mut Option<BTreeMap<String, Quantity>>,
    path: &str,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let empty = BTreeMap::new();
    let from = from.unwrap_or(&empty);
    let mut changed = false;

    if !from.is_empty() {
        let target = to.get_or_insert_with(BTreeMap::new);
        for (key, value) in from {
            let same = target
                .get(key)
                .is_some_and(|current| quantities_equal(current, value));
            if !same {
                record_change(recorder, &format!("{path}.{key}"), &target.get(key), &Some(value));
                target.insert(key.clone(), value.clone());
                changed = true;
            }
        }
    }

    if let Some(target) = to.as_mut() {
        let extra: Vec<String> = target
            .keys()
            .filter(|k| !from.contains_key(*k))
            .cloned()
            .collect();
        for key in extra {
            record_change(recorder, &format!("{path}.{key}"), &target.get(&key), &None::<&Quantity>);
            target.remove(&key);
            changed = true;
        }
    }
    changed
}

/// Merge container compute resources, requests and limits per key
pub fn merge_resource_requirements(
    from: &ResourceRequirements,
    to: &mut ResourceRequirements,
    path: &str,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let requests = merge_quantities(
        from.requests.as_ref(),
        &mut to.requests,
        &format!("{path}.requests"),
        recorder,
    );
    let limits = merge_quantities(
        from.limits.as_ref(),
        &mut to.limits,
        &format!("{path}.limits"),
        recorder,
    );
    requests || limits
}

/// Merge volume claim resources, requests and limits per key
pub fn merge_volume_resources(
    from: Option<&VolumeResourceRequirements>,
    to: &mut Option<VolumeResourceRequirements>,
    path: &str,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let (from_requests, from_limits) = match from {
        Some(r) => (r.requests.as_ref(), r.limits.as_ref()),
        None => (None, None),
    };
    if from.is_none() && to.is_none() {
        return false;
    }
    let target = to.get_or_insert_with(VolumeResourceRequirements::default);
    let requests = merge_quantities(
        from_requests,
        &mut target.requests,
        &format!("{path}.requests"),
        recorder,
    );
    let limits = merge_quantities(
        from_limits,
        &mut target.limits,
        &format!("{path}.limits"),
        recorder,
    );
    requests || limits
}

// =============================================================================
// Merge patches
// =============================================================================

/// JSON merge patch (RFC 7386) that turns `before` into `after`.
///
/// Objects are diffed key by key; keys dropped from `after` become `null`.
/// Anything else that differs is replaced whole. Keys neither side carries
/// are not mentioned, so the server keeps them.
pub fn merge_patch(before: &Value, after: &Value) -> Value {
    match (before, after) {
        (Value::Object(before), Value::Object(after)) => {
            let mut patch = Map::new();
            for (key, was) in before {
                match after.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(now) if now != was => {
                        patch.insert(key.clone(), merge_patch(was, now));
                    }
                    Some(_) => {}
                }
            }
            for (key, now) in after {
                if !before.contains_key(key) {
                    patch.insert(key.clone(), now.clone());
                }
            }
            Value::Object(patch)
        }
        _ => after.clone(),
    }
}

/// Merge patch between two versions of the same typed object
pub fn object_merge_patch<K>(before: &K, after: &K) -> Result<Value>
where
    K: Resource<DynamicType = ()> + Serialize,
{
    let kind = K::kind(&());
    let to_value = |object: &K| {
        serde_json::to_value(object).map_err(|e| Error::serialization_for_kind(kind.as_ref(), e))
    };
    Ok(merge_patch(&to_value(before)?, &to_value(after)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::ChangeLog;
    use rstest::rstest;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn quantities(pairs: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect()
    }

    #[test]
    fn base_keys_win_when_merging() {
        let base = map(&[("team", "search"), ("tier", "gold")]);
        let additional = map(&[("team", "platform"), ("solr-cloud", "example")]);
        let merged = merge_labels_or_annotations(&base, &additional);
        assert_eq!(merged["team"], "search");
        assert_eq!(merged["solr-cloud"], "example");
        assert_eq!(merged.len(), 3);
    }

    /// Story: labels added by another controller survive a metadata merge
    #[test]
    fn story_metadata_merge_is_additive() {
        let from = ObjectMeta {
            labels: Some(map(&[("solr-cloud", "example")])),
            annotations: Some(map(&[("owner", "search")])),
            ..Default::default()
        };
        let mut to = ObjectMeta {
            labels: Some(map(&[("solr-cloud", "old"), ("injected", "yes")])),
            ..Default::default()
        };
        let mut log = ChangeLog::new();
        assert!(merge_labels_and_annotations(&from, &mut to, &mut log));

        let labels = to.labels.as_ref().unwrap();
        assert_eq!(labels["solr-cloud"], "example");
        assert_eq!(labels["injected"], "yes");
        assert_eq!(to.annotations.as_ref().unwrap()["owner"], "search");
        assert_eq!(
            log.fields(),
            vec!["metadata.labels.solr-cloud", "metadata.annotations.owner"]
        );

        let mut log = ChangeLog::new();
        assert!(!merge_labels_and_annotations(&from, &mut to, &mut log));
        assert!(log.is_empty());
    }

    #[rstest]
    #[case::plain("2", 2.0)]
    #[case::milli("500m", 0.5)]
    #[case::kibi("1Ki", 1024.0)]
    #[case::gibi("20Gi", 20.0 * 1073741824.0)]
    #[case::mega("3M", 3e6)]
    #[case::exponent("2e3", 2000.0)]
    fn quantities_parse(#[case] raw: &str, #[case] expected: f64) {
        let parsed = parse_quantity(&Quantity(raw.to_string())).unwrap();
        assert!((parsed - expected).abs() < 1e-6 * expected.max(1.0));
    }

    #[test]
    fn empty_quantity_does_not_parse() {
        assert_eq!(parse_quantity(&Quantity(String::new())), None);
    }

    #[test]
    fn equivalent_quantities_compare_equal() {
        assert!(quantities_equal(&Quantity("1Gi".into()), &Quantity("1024Mi".into())));
        assert!(quantities_equal(&Quantity("0.5".into()), &Quantity("500m".into())));
        assert!(!quantities_equal(&Quantity("1Gi".into()), &Quantity("1G".into())));
    }

    /// Story: a resized claim request is adopted and a stale limit is dropped
    #[test]
    fn story_quantity_merge_adopts_and_removes() {
        let from = quantities(&[("storage", "10Gi")]);
        let mut to = Some(quantities(&[("storage", "5Gi"), ("ephemeral-storage", "1Gi")]));
        let mut log = ChangeLog::new();
        assert!(merge_quantities(Some(&from), &mut to, "spec.resources.requests", &mut log));
        assert_eq!(to.as_ref().unwrap(), &from);
        assert_eq!(
            log.fields(),
            vec![
                "spec.resources.requests.storage",
                "spec.resources.requests.ephemeral-storage"
            ]
        );
    }

    #[test]
    fn equivalent_quantities_are_not_rewritten() {
        let from = quantities(&[("memory", "1Gi")]);
        let mut to = Some(quantities(&[("memory", "1024Mi")]));
        let mut log = ChangeLog::new();
        assert!(!merge_quantities(Some(&from), &mut to, "r", &mut log));
        assert_eq!(to.unwrap()["memory"].0, "1024Mi");
    }

    #[test]
    fn resource_requirements_merge_requests_and_limits() {
        let from = ResourceRequirements {
            requests: Some(quantities(&[("cpu", "500m")])),
            limits: Some(quantities(&[("memory", "2Gi")])),
            ..Default::default()
        };
        let mut to = ResourceRequirements::default();
        let mut log = ChangeLog::new();
        assert!(merge_resource_requirements(&from, &mut to, "spec.pod.resources", &mut log));
        assert_eq!(to.requests, from.requests);
        assert_eq!(to.limits, from.limits);
        assert!(!merge_resource_requirements(&from, &mut to, "spec.pod.resources", &mut log));
    }

    #[test]
    fn volume_resources_cleared_when_desired_has_none() {
        let mut to = Some(VolumeResourceRequirements {
            requests: Some(quantities(&[("storage", "5Gi")])),
            ..Default::default()
        });
        let mut log = ChangeLog::new();
        assert!(merge_volume_resources(None, &mut to, "claim", &mut log));
        assert!(to.unwrap().requests.unwrap().is_empty());
        assert!(!merge_volume_resources(None, &mut None, "claim", &mut log));
    }

    #[test]
    fn owner_ref_requires_uid() {
        use crate::crd::{SolrCloud, SolrCloudSpec};

        let mut solr = SolrCloud::new("example", SolrCloudSpec::default());
        assert!(controller_owner_ref(&solr).is_none());

        solr.metadata.uid = Some("abc-123".to_string());
        let owner = controller_owner_ref(&solr).unwrap();
        assert_eq!(owner.api_version, "solr.apache.org/v1beta1");
        assert_eq!(owner.kind, "SolrCloud");
        assert_eq!(owner.name, "example");
        assert_eq!(owner.controller, Some(true));
    }

    #[test]
    fn merge_patch_of_equal_values_is_empty() {
        let v = serde_json::json!({"spec": {"replicas": 3, "ports": [1, 2]}});
        assert_eq!(merge_patch(&v, &v), serde_json::json!({}));
    }

    #[test]
    fn merge_patch_nulls_dropped_keys_and_replaces_arrays() {
        let before = serde_json::json!({"spec": {"ephemeral": {}, "ports": [1, 2], "replicas": 1}});
        let after = serde_json::json!({"spec": {"persistence": {}, "ports": [1], "replicas": 1}});
        assert_eq!(
            merge_patch(&before, &after),
            serde_json::json!({"spec": {"ephemeral": null, "persistence": {}, "ports": [1]}})
        );
    }

    /// Story: a key written by another client is not part of our model; the
    /// patch we send leaves it in place on the server
    #[test]
    fn story_merge_patch_keeps_keys_we_do_not_model() {
        use crate::crd::{ZookeeperCluster, ZookeeperClusterSpec};

        let mut live = serde_json::json!({
            "apiVersion": "zookeeper.pravega.io/v1beta1",
            "kind": "ZookeeperCluster",
            "metadata": {"name": "example-solrcloud-zookeeper"},
            "spec": {"replicas": 1, "triggerRollingRestart": true}
        });
        let before: ZookeeperCluster = serde_json::from_value(live.clone()).unwrap();
        let mut after = before.clone();
        after.spec.replicas = 3;

        let patch = object_merge_patch(&before, &after).unwrap();
        assert_eq!(patch, serde_json::json!({"spec": {"replicas": 3}}));

        json_patch::merge(&mut live, &patch);
        assert_eq!(live["spec"]["replicas"], serde_json::json!(3));
        assert_eq!(live["spec"]["triggerRollingRestart"], serde_json::json!(true));
        let _: ZookeeperClusterSpec = serde_json::from_value(live["spec"].clone()).unwrap();
    }
}

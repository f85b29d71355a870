//! Drift reconciliation between a desired and an observed ZookeeperCluster
//!
//! [`reconcile_zookeeper_cluster`] pulls the observed object towards the
//! desired one in place and reports whether it must be written back. Every
//! field that triggers the update is reported to a [`DriftRecorder`].
//!
//! The downstream operator also writes this object and fills in its own
//! defaults, so not every difference is drift; see [`fields::SyncPolicy`].
//! Writes go out as a merge patch from [`drift_patch`], which leaves fields
//! this crate does not model untouched on the server.

pub mod fields;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::Serialize;
use serde_json::{Map, Value};

use ensemble_common::crd::{Ephemeral, Persistence, StorageType, ZookeeperCluster, ZookeeperClusterSpec};
use ensemble_common::equality::NilPolicy;
use ensemble_common::kube_utils::{
    merge_labels_and_annotations, merge_resource_requirements, merge_volume_resources,
    object_merge_patch,
};
use ensemble_common::recorder::record_change;

pub use ensemble_common::recorder::{ChangeLog, DriftRecorder, FieldChange, NoopRecorder, TracingRecorder};
pub use fields::{spec_fields, SyncField, SyncPolicy};

use fields::sync_value;

/// Reconcile `observed` towards `desired`.
///
/// Returns true if `observed` was modified and must be persisted.
pub fn reconcile_zookeeper_cluster(
    desired: &ZookeeperCluster,
    observed: &mut ZookeeperCluster,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let mut changed =
        merge_labels_and_annotations(&desired.metadata, &mut observed.metadata, recorder);

    for field in spec_fields() {
        changed |= field.sync(&desired.spec, &mut observed.spec, recorder);
    }

    changed |= reconcile_storage(&desired.spec, &mut observed.spec, recorder);

    changed |= merge_resource_requirements(
        &desired.spec.pod.resources,
        &mut observed.spec.pod.resources,
        "spec.pod.resources",
        recorder,
    );

    changed
}

/// Merge patch carrying the reconciliation of `live` into `reconciled`.
///
/// The live resourceVersion is included so the write fails with a conflict
/// if another client updated the object in between.
pub fn drift_patch(
    live: &ZookeeperCluster,
    reconciled: &ZookeeperCluster,
) -> ensemble_common::Result<Value> {
    let mut patch = object_merge_patch(live, reconciled)?;
    if let (Some(version), Some(patch)) = (&live.metadata.resource_version, patch.as_object_mut()) {
        let metadata = patch
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(metadata) = metadata.as_object_mut() {
            metadata.insert("resourceVersion".to_string(), Value::String(version.clone()));
        }
    }
    Ok(patch)
}

/// Keep exactly the storage variant selected by the discriminant.
///
/// Runs after the discriminant itself has been synchronized, so the observed
/// `storage_type` already matches the desired one.
fn reconcile_storage(
    desired: &ZookeeperClusterSpec,
    observed: &mut ZookeeperClusterSpec,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    match observed.storage_type {
        StorageType::Persistence => {
            let cleared = clear("spec.ephemeral", &mut observed.ephemeral, recorder);
            let merged = reconcile_persistence(
                desired.persistence.as_ref(),
                &mut observed.persistence,
                recorder,
            );
            cleared || merged
        }
        StorageType::Ephemeral => {
            let cleared = clear("spec.persistence", &mut observed.persistence, recorder);
            let merged = reconcile_ephemeral(
                desired.ephemeral.as_ref(),
                &mut observed.ephemeral,
                recorder,
            );
            cleared || merged
        }
        StorageType::Unset => false,
    }
}

fn clear<T: Serialize>(
    field: &str,
    value: &mut Option<T>,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    if value.is_none() {
        return false;
    }
    record_change(recorder, field, &*value, &None);
    *value = None;
    true
}

fn adopt<T: Serialize + Clone>(
    field: &str,
    desired: &T,
    observed: &mut Option<T>,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    record_change(recorder, field, &*observed, &Some(desired.clone()));
    *observed = Some(desired.clone());
    true
}

fn reconcile_persistence(
    desired: Option<&Persistence>,
    observed: &mut Option<Persistence>,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let Some(want) = desired else {
        return clear("spec.persistence", observed, recorder);
    };
    if observed.is_none() {
        return adopt("spec.persistence", want, observed, recorder);
    }
    let Some(have) = observed.as_mut() else {
        return false;
    };

    let want_claim = &want.persistent_volume_claim_spec;
    let have_claim = &mut have.persistent_volume_claim_spec;
    let mut changed = merge_volume_resources(
        want_claim.resources.as_ref(),
        &mut have_claim.resources,
        "spec.persistence.spec.resources",
        recorder,
    );
    changed |= sync_value(
        "spec.persistence.spec.accessModes",
        NilPolicy::EqualsEmpty,
        &want_claim.access_modes,
        &mut have_claim.access_modes,
        recorder,
    );
    changed |= sync_value(
        "spec.persistence.spec.storageClassName",
        NilPolicy::EqualsEmpty,
        &want_claim.storage_class_name,
        &mut have_claim.storage_class_name,
        recorder,
    );
    changed |= sync_value(
        "spec.persistence.reclaimPolicy",
        NilPolicy::EqualsEmpty,
        &want.reclaim_policy,
        &mut have.reclaim_policy,
        recorder,
    );
    changed |= sync_value(
        "spec.persistence.annotations",
        NilPolicy::EqualsEmpty,
        &want.annotations,
        &mut have.annotations,
        recorder,
    );
    changed
}

fn reconcile_ephemeral(
    desired: Option<&Ephemeral>,
    observed: &mut Option<Ephemeral>,
    recorder: &mut dyn DriftRecorder,
) -> bool {
    let Some(want) = desired else {
        return clear("spec.ephemeral", observed, recorder);
    };
    if observed.is_none() {
        return adopt("spec.ephemeral", want, observed, recorder);
    }
    let Some(have) = observed.as_mut() else {
        return false;
    };

    let want_dir = &want.empty_dir_volume_source;
    let have_dir = &mut have.empty_dir_volume_source;
    let medium = sync_value(
        "spec.ephemeral.emptydirvolumesource.medium",
        NilPolicy::EqualsEmpty,
        &want_dir.medium,
        &mut have_dir.medium,
        recorder,
    );
    let size_limit = sync_value::<Option<Quantity>>(
        "spec.ephemeral.emptydirvolumesource.sizeLimit",
        NilPolicy::EqualsEmpty,
        &want_dir.size_limit,
        &mut have_dir.size_limit,
        recorder,
    );
    medium || size_limit
}

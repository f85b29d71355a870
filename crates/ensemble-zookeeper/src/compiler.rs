//! Desired-state compiler for provided ZooKeeper ensembles
//!
//! Turns a SolrCloud's `zookeeperRef.provided` block into the complete
//! `ZookeeperCluster` the controller should converge towards:
//! - Labels: the cloud's shared labels plus the technology label, with the
//!   provided block's own labels winning on conflict
//! - Fixed protocol ports
//! - Pod policy copied field for field, plus the singular pull secret
//! - Exactly one storage variant
//! - The downstream operator's defaults, applied last
//!
//! Compilation is pure and total.

use k8s_openapi::api::core::v1::LocalObjectReference;
use kube::api::ObjectMeta;
use kube::ResourceExt;

use ensemble_common::crd::{
    zookeeper_ports, Ephemeral, Persistence, PodPolicy, SolrCloud, StorageVariant,
    ZookeeperCluster, ZookeeperClusterSpec, ZookeeperImage, ZookeeperSpec, TECHNOLOGY_LABEL,
    ZOOKEEPER_TECHNOLOGY,
};
use ensemble_common::kube_utils::merge_labels_or_annotations;

/// Compile the ZookeeperCluster for a SolrCloud's provided ensemble spec
pub fn compile_zookeeper_cluster(solr: &SolrCloud, zk: &ZookeeperSpec) -> ZookeeperCluster {
    let mut labels = solr.shared_labels_with(solr.labels());
    labels.insert(TECHNOLOGY_LABEL.to_string(), ZOOKEEPER_TECHNOLOGY.to_string());
    let labels = match zk.labels.as_ref().filter(|l| !l.is_empty()) {
        Some(provided) => merge_labels_or_annotations(provided, &labels),
        None => labels,
    };

    let mut spec = ZookeeperClusterSpec {
        image: ZookeeperImage {
            repository: zk.image.repository.clone(),
            tag: zk.image.tag.clone(),
            pull_policy: zk.image.pull_policy.clone(),
        },
        labels: Some(labels.clone()),
        replicas: zk.replicas.unwrap_or_default(),
        ports: Some(zookeeper_ports()),
        pod: compile_pod_policy(zk),
        admin_server_service: zk.admin_server_service.clone(),
        client_service: zk.client_service.clone(),
        headless_service: zk.headless_service.clone(),
        conf: zk.config.clone(),
        containers: zk.containers.clone(),
        init_containers: zk.init_containers.clone(),
        volumes: zk.volumes.clone(),
        volume_mounts: zk.volume_mounts.clone(),
        probes: zk.probes.clone(),
        max_unavailable_replicas: zk.max_unavailable_replicas,
        ..Default::default()
    };
    spec.set_storage(select_storage(solr, zk));

    let domain = &solr.spec.solr_addressability.kube_domain;
    if !domain.is_empty() {
        spec.kubernetes_cluster_domain = domain.clone();
    }

    let mut cluster = ZookeeperCluster {
        metadata: ObjectMeta {
            name: Some(solr.provided_zookeeper_name()),
            namespace: solr.namespace(),
            labels: Some(labels),
            ..Default::default()
        },
        spec,
        status: None,
    };
    cluster.with_defaults();
    cluster
}

/// Compile the provided ensemble of a SolrCloud, if it asks for one
pub fn compile_provided_zookeeper(solr: &SolrCloud) -> Option<ZookeeperCluster> {
    solr.provided_zookeeper()
        .map(|zk| compile_zookeeper_cluster(solr, zk))
}

fn compile_pod_policy(zk: &ZookeeperSpec) -> PodPolicy {
    let pod = &zk.zookeeper_pod;
    let mut image_pull_secrets = pod.image_pull_secrets.clone();
    if !zk.image.image_pull_secret.is_empty() {
        image_pull_secrets
            .get_or_insert_with(Vec::new)
            .push(LocalObjectReference {
                name: zk.image.image_pull_secret.clone(),
            });
    }

    PodPolicy {
        labels: pod.labels.clone(),
        node_selector: pod.node_selector.clone(),
        affinity: pod.affinity.clone(),
        topology_spread_constraints: pod.topology_spread_constraints.clone(),
        resources: pod.resources.clone(),
        tolerations: pod.tolerations.clone(),
        env: pod.env.clone(),
        annotations: pod.annotations.clone(),
        security_context: pod.security_context.clone(),
        termination_grace_period_seconds: pod.termination_grace_period_seconds,
        service_account_name: pod.service_account_name.clone(),
        image_pull_secrets,
    }
}

/// Explicit persistence, then explicit ephemeral, then whatever Solr itself uses
fn select_storage(solr: &SolrCloud, zk: &ZookeeperSpec) -> StorageVariant {
    if let Some(p) = &zk.persistence {
        return StorageVariant::Persistence(Persistence {
            reclaim_policy: p.reclaim_policy,
            persistent_volume_claim_spec: p.persistent_volume_claim_spec.clone(),
            annotations: p.annotations.clone(),
        });
    }
    if let Some(e) = &zk.ephemeral {
        return StorageVariant::Ephemeral(Ephemeral {
            empty_dir_volume_source: e.empty_dir_volume_source.clone(),
        });
    }
    if solr.spec.storage_options.persistent_storage.is_some() {
        StorageVariant::Persistence(Persistence::default())
    } else {
        StorageVariant::Ephemeral(Ephemeral::default())
    }
}

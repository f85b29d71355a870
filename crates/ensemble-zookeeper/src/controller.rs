//! Create-or-update of the provided ZookeeperCluster
//!
//! One pass: compile the desired ensemble from the SolrCloud, then either
//! create it (owned by the SolrCloud) or reconcile the live object and
//! merge-patch it when it drifted. Conflicts and retries are left to the caller.

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use serde_json::Value;
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use ensemble_common::crd::{SolrCloud, ZookeeperCluster};
use ensemble_common::kube_utils::controller_owner_ref;
use ensemble_common::recorder::DriftRecorder;
use ensemble_common::DEFAULT_FIELD_MANAGER;

use crate::compiler::compile_provided_zookeeper;
use crate::drift::{drift_patch, reconcile_zookeeper_cluster};
use crate::error::ZookeeperError;

/// Access to ZookeeperCluster objects.
///
/// Abstracted so the create-or-update flow can be tested without a cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ZookeeperClusterApi: Send + Sync {
    /// Fetch a cluster, `None` if it does not exist
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ZookeeperCluster>, ZookeeperError>;

    /// Create a new cluster
    async fn create(
        &self,
        namespace: &str,
        cluster: &ZookeeperCluster,
    ) -> Result<ZookeeperCluster, ZookeeperError>;

    /// Apply a JSON merge patch to an existing cluster; a resourceVersion in
    /// the patch guards against concurrent writers
    async fn patch(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<ZookeeperCluster, ZookeeperError>;
}

/// Real Kubernetes implementation
pub struct KubeZookeeperClusterApi {
    client: Client,
    field_manager: String,
}

impl KubeZookeeperClusterApi {
    /// Wrap a kube Client, writing with the default field manager
    pub fn new(client: Client) -> Self {
        Self::with_field_manager(client, DEFAULT_FIELD_MANAGER)
    }

    /// Wrap a kube Client, writing with the given field manager
    pub fn with_field_manager(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }

    fn patch_params(&self) -> PatchParams {
        PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ZookeeperClusterApi for KubeZookeeperClusterApi {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ZookeeperCluster>, ZookeeperError> {
        let api: Api<ZookeeperCluster> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(cluster) => Ok(Some(cluster)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(
        &self,
        namespace: &str,
        cluster: &ZookeeperCluster,
    ) -> Result<ZookeeperCluster, ZookeeperError> {
        let api: Api<ZookeeperCluster> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.create(&self.post_params(), cluster).await?)
    }

    async fn patch(
        &self,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<ZookeeperCluster, ZookeeperError> {
        let api: Api<ZookeeperCluster> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .patch(name, &self.patch_params(), &Patch::Merge(patch))
            .await?)
    }
}

/// What a pass did to the live ZookeeperCluster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No cluster existed; one was created
    Created,
    /// The live cluster drifted and was patched
    Updated,
    /// The live cluster already matched
    Unchanged,
}

/// Create or update the provided ZookeeperCluster of a SolrCloud
pub async fn ensure_zookeeper_cluster<R>(
    api: &dyn ZookeeperClusterApi,
    solr: &SolrCloud,
    recorder: &mut R,
) -> Result<ApplyOutcome, ZookeeperError>
where
    R: DriftRecorder + Send,
{
    let solr_name = solr.name_any();
    let namespace = solr
        .namespace()
        .ok_or_else(|| ZookeeperError::MissingNamespace(solr_name.clone()))?;
    let mut desired = compile_provided_zookeeper(solr)
        .ok_or_else(|| ZookeeperError::NoProvidedZookeeper(solr_name.clone()))?;
    let zk_name = desired.name_any();

    let Some(live) = api.get(&namespace, &zk_name).await? else {
        if let Some(owner) = controller_owner_ref(solr) {
            desired.metadata.owner_references = Some(vec![owner]);
        }
        info!(solrcloud = %solr_name, zookeeper = %zk_name, %namespace, "creating ZookeeperCluster");
        api.create(&namespace, &desired).await?;
        return Ok(ApplyOutcome::Created);
    };

    let mut observed = live.clone();
    if !reconcile_zookeeper_cluster(&desired, &mut observed, recorder) {
        debug!(zookeeper = %zk_name, %namespace, "ZookeeperCluster up to date");
        return Ok(ApplyOutcome::Unchanged);
    }

    info!(solrcloud = %solr_name, zookeeper = %zk_name, %namespace, "updating ZookeeperCluster");
    let patch = drift_patch(&live, &observed)?;
    api.patch(&namespace, &zk_name, &patch).await?;
    Ok(ApplyOutcome::Updated)
}

//! ZooKeeper-specific error types

/// Errors from applying a provided ZooKeeper ensemble to the cluster
#[derive(Debug, thiserror::Error)]
pub enum ZookeeperError {
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("{0}")]
    Common(#[from] ensemble_common::Error),

    #[error("missing namespace on SolrCloud '{0}'")]
    MissingNamespace(String),

    #[error("SolrCloud '{0}' has no provided zookeeper spec")]
    NoProvidedZookeeper(String),
}

impl ZookeeperError {
    /// Whether the caller should retry the pass.
    ///
    /// Spec problems on the SolrCloud, and objects that cannot be turned
    /// into a patch, are not retryable until the input changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            ZookeeperError::Kube(e) => match e {
                kube::Error::Api(ae) if ae.code == 409 => true,
                kube::Error::Api(ae) => !(400..500).contains(&ae.code),
                _ => true,
            },
            ZookeeperError::Common(_)
            | ZookeeperError::MissingNamespace(_)
            | ZookeeperError::NoProvidedZookeeper(_) => false,
        }
    }
}

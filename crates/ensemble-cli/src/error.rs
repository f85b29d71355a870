//! Error types for the CLI

use std::path::PathBuf;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error(transparent)]
    Common(#[from] ensemble_common::Error),

    #[error(transparent)]
    Zookeeper(#[from] ensemble_zookeeper::ZookeeperError),

    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),
}

impl Error {
    pub fn kubeconfig(message: impl std::fmt::Display) -> Self {
        Error::Kubeconfig(message.to_string())
    }
}

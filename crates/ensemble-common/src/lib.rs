//! Common types for ensemble: CRDs, errors, manifests, equality and merge utilities

#![deny(missing_docs)]

pub mod crd;
pub mod equality;
pub mod error;
pub mod kube_utils;
pub mod manifest;
pub mod recorder;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Field manager recorded on objects this workspace writes
pub const DEFAULT_FIELD_MANAGER: &str = "ensemble";

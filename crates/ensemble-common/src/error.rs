//! Error types shared by the ensemble crates
//!
//! Errors are structured with fields to aid debugging in production.
//! Synthesis and drift reconciliation are total functions and never produce
//! these errors; they surface when manifests are read and when reconciled
//! objects are turned into patches.

use thiserror::Error;

/// Main error type for ensemble operations
#[derive(Debug, Error)]
pub enum Error {
    /// A manifest does not describe the expected resource
    #[error("validation error for {resource} at {field}: {message}")]
    Validation {
        /// Name of the resource, or `<unnamed>`
        resource: String,
        /// The invalid field path (e.g., "kind")
        field: String,
        /// Description of what's invalid
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error for {kind}: {message}")]
    Serialization {
        /// The resource kind being (de)serialized
        kind: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a validation error with resource context and field path
    pub fn validation_for_field(
        resource: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            resource: resource.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl std::fmt::Display) -> Self {
        Self::Serialization {
            kind: kind.into(),
            message: msg.to_string(),
        }
    }
}

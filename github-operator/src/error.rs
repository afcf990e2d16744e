//! Error types for the GitHub operator.

use crate::provider::ProviderError;
use thiserror::Error;

/// Errors that can occur during operator operations.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// Kubernetes API error.
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// A write was rejected because the object changed since it was read.
    #[error("Conflict updating {kind}/{name} in namespace {namespace}: resource version is stale")]
    Conflict {
        /// Resource kind.
        kind: String,
        /// Resource name.
        name: String,
        /// Resource namespace.
        namespace: String,
    },

    /// Provider call failed; retrying may succeed.
    #[error("Provider error: {0}")]
    Provider(#[source] ProviderError),

    /// Provider refused to create the repository as specified.
    #[error("Repository creation rejected: {0}")]
    CreateRejected(#[source] ProviderError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource spec failed validation.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The CRD could not be rendered.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl OperatorError {
    /// Errors that no amount of retrying will fix without a spec change.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OperatorError::CreateRejected(_) | OperatorError::ValidationError(_)
        )
    }

    /// Errors caused by a stale resource version.
    pub fn is_conflict(&self) -> bool {
        matches!(self, OperatorError::Conflict { .. })
    }
}

/// Result type for operator operations.
pub type OperatorResult<T> = Result<T, OperatorError>;

impl From<serde_yaml::Error> for OperatorError {
    fn from(err: serde_yaml::Error) -> Self {
        OperatorError::SerializationError(err.to_string())
    }
}

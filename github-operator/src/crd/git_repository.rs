//! GitRepository Custom Resource Definition.
//!
//! Declares a repository that should exist on GitHub.

use crate::error::OperatorResult;
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// GitRepository is the Schema for the gitrepositories API.
///
/// The operator creates a repository named `spec.name` on GitHub the first
/// time it sees the resource and deletes it when the resource is deleted.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vcs.github",
    version = "v1alpha1",
    kind = "GitRepository",
    plural = "gitrepositories",
    shortname = "gitrepo",
    namespaced,
    status = "GitRepositoryStatus",
    printcolumn = r#"{"name":"ID", "type":"string", "jsonPath":".status.id", "description":"The id of the Git repository"}"#,
    printcolumn = r#"{"name":"URL", "type":"string", "jsonPath":".status.url", "description":"The url of the Git repository"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    /// Repository name on the provider. Unique per owner.
    pub name: String,

    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,

    /// Repository description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// GitRepository status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryStatus {
    /// True once the provider has confirmed the repository exists.
    #[serde(default)]
    pub created: bool,

    /// Provider-assigned repository id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Provider-assigned repository URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Conditions representing the current state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RepositoryCondition>,
}

/// Condition representing repository state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCondition {
    /// Type of condition (Ready).
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Status of the condition (True, False, Unknown).
    pub status: String,

    /// Machine-readable reason for the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition's status changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl GitRepository {
    /// Whether the remote repository has been created.
    pub fn is_created(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.created)
    }

    /// Whether deletion of this resource has been requested.
    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// The CustomResourceDefinition as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::OperatorError::SerializationError`] if the
    /// definition cannot be rendered.
    pub fn crd_yaml() -> OperatorResult<String> {
        Ok(serde_yaml::to_string(&Self::crd())?)
    }
}

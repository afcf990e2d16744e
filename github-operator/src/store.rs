//! Resource store access.
//!
//! [`RepositoryStore`] is the reconciler's view of where `GitRepository`
//! objects live: keyed reads plus optimistic-concurrency writes. The
//! Kubernetes implementation sends JSON merge patches that carry the object's
//! `resourceVersion`, so the API server rejects writes based on a stale read
//! with HTTP 409.

use crate::crd::GitRepository;
use crate::error::{OperatorError, OperatorResult};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Namespace and name of a `GitRepository`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace.
    pub namespace: String,
    /// Name.
    pub name: String,
}

impl ObjectKey {
    /// Create a key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object has no namespace.
    pub fn from_object(repo: &GitRepository) -> OperatorResult<Self> {
        let namespace = repo.namespace().ok_or_else(|| {
            OperatorError::InvalidConfig("GitRepository must be namespaced".into())
        })?;
        Ok(Self::new(namespace, repo.name_any()))
    }

    fn conflict(&self) -> OperatorError {
        OperatorError::Conflict {
            kind: "GitRepository".into(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Type alias for async store futures.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = OperatorResult<T>> + Send + 'a>>;

/// Storage for `GitRepository` objects.
///
/// Writes take the object as last read and fail with
/// [`OperatorError::Conflict`] if it has changed since. Successful writes
/// return the stored object, carrying its new resource version.
pub trait RepositoryStore: Send + Sync {
    /// Fetch the latest version of an object, `None` if it does not exist.
    fn get(&self, key: ObjectKey) -> StoreFuture<'_, Option<GitRepository>>;

    /// Persist metadata changes (finalizers).
    fn update(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository>;

    /// Persist the status subresource.
    fn update_status(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository>;
}

/// [`RepositoryStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeRepositoryStore {
    client: Client,
}

impl KubeRepositoryStore {
    /// Create a store over a Kubernetes client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<GitRepository> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn patch_metadata(&self, repo: GitRepository) -> OperatorResult<GitRepository> {
        let key = ObjectKey::from_object(&repo)?;
        let patch = serde_json::json!({
            "metadata": {
                "resourceVersion": repo.resource_version(),
                "finalizers": repo.finalizers(),
            }
        });

        self.api(&key.namespace)
            .patch(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_write_error(&key, e))
    }

    async fn patch_status(&self, repo: GitRepository) -> OperatorResult<GitRepository> {
        let key = ObjectKey::from_object(&repo)?;
        let patch = serde_json::json!({
            "metadata": {
                "resourceVersion": repo.resource_version(),
            },
            "status": repo.status.unwrap_or_default(),
        });

        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_write_error(&key, e))
    }
}

fn map_write_error(key: &ObjectKey, err: kube::Error) -> OperatorError {
    match err {
        kube::Error::Api(ref api_err) if api_err.code == 409 => key.conflict(),
        other => OperatorError::KubeError(other),
    }
}

impl RepositoryStore for KubeRepositoryStore {
    fn get(&self, key: ObjectKey) -> StoreFuture<'_, Option<GitRepository>> {
        Box::pin(async move { Ok(self.api(&key.namespace).get_opt(&key.name).await?) })
    }

    fn update(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository> {
        Box::pin(self.patch_metadata(repo))
    }

    fn update_status(&self, repo: GitRepository) -> StoreFuture<'_, GitRepository> {
        Box::pin(self.patch_status(repo))
    }
}

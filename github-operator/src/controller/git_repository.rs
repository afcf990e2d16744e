//! GitRepository controller.
//!
//! Converges a GitHub repository towards its GitRepository resource: the
//! repository is created once, and deleted again before the resource is
//! allowed to go away.

use super::finalizer::{add_finalizer, has_finalizer, remove_finalizer};
use super::status::{
    CONDITION_READY, REASON_CREATE_FAILED, REASON_CREATE_REJECTED, REASON_CREATED,
    REASON_DELETE_FAILED, condition, project_status, set_condition,
};
use super::{ControllerContext, ReconcileAction};
use crate::crd::GitRepository;
use crate::error::{OperatorError, OperatorResult};
use crate::provider::{CreateRepository, ProviderError};
use crate::store::ObjectKey;
use kube::runtime::controller::Action;
use std::sync::Arc;

/// Lifecycle state of a GitRepository, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// The object does not exist.
    Absent,
    /// Deletion requested, remote cleanup still pending.
    PendingDeletion,
    /// Deletion requested and cleanup done; the store will remove it.
    Deleted,
    /// The remote repository has not been confirmed yet.
    Uninitialized,
    /// Created, but the finalizer is missing.
    Unguarded,
    /// Created and guarded; nothing to do.
    Active,
}

impl RepositoryState {
    /// Classify an object, `None` meaning it was not found.
    pub fn of(repo: Option<&GitRepository>) -> Self {
        let Some(repo) = repo else {
            return Self::Absent;
        };

        match (repo.is_being_deleted(), has_finalizer(repo), repo.is_created()) {
            (true, true, _) => Self::PendingDeletion,
            (true, false, _) => Self::Deleted,
            (false, _, false) => Self::Uninitialized,
            (false, false, true) => Self::Unguarded,
            (false, true, true) => Self::Active,
        }
    }
}

/// Controller for GitRepository resources.
#[derive(Clone)]
pub struct GitRepositoryController {
    ctx: Arc<ControllerContext>,
}

impl GitRepositoryController {
    /// Create a new controller.
    pub fn new(ctx: Arc<ControllerContext>) -> Self {
        Self { ctx }
    }

    /// Reconcile the GitRepository identified by `key`.
    ///
    /// Works from a fresh read of the object and issues at most one provider
    /// call and two store writes:
    /// 1. Object gone: nothing to do
    /// 2. Deletion requested: delete the remote repository, then drop the finalizer
    /// 3. Finalizer missing: add it before anything is created
    /// 4. Not created yet: create the remote repository and record it in status
    ///
    /// Every write is committed before the next step starts, so a crash at
    /// any point is picked up by the next invocation.
    pub async fn reconcile(&self, key: &ObjectKey) -> OperatorResult<ReconcileAction> {
        let repo = self.ctx.store.get(key.clone()).await?;
        let state = RepositoryState::of(repo.as_ref());

        tracing::debug!(
            name = %key.name,
            namespace = %key.namespace,
            state = ?state,
            "Reconciling GitRepository"
        );

        match (state, repo) {
            (RepositoryState::Absent, _) | (_, None) => {
                tracing::debug!(name = %key.name, "GitRepository no longer exists");
                Ok(ReconcileAction::Done)
            }
            (RepositoryState::PendingDeletion, Some(repo)) => self.finalize(key, repo).await,
            (RepositoryState::Uninitialized | RepositoryState::Unguarded, Some(repo)) => {
                self.initialize(key, repo).await
            }
            (RepositoryState::Deleted | RepositoryState::Active, Some(_)) => {
                Ok(ReconcileAction::Done)
            }
        }
    }

    /// Guard the object with the finalizer, then create the remote repository if needed.
    async fn initialize(
        &self,
        key: &ObjectKey,
        mut repo: GitRepository,
    ) -> OperatorResult<ReconcileAction> {
        if add_finalizer(&mut repo) {
            tracing::info!(name = %key.name, namespace = %key.namespace, "Adding finalizer");
            repo = self.ctx.store.update(repo).await?;
        }

        if repo.is_created() {
            return Ok(ReconcileAction::Done);
        }

        self.create(key, repo).await
    }

    async fn create(
        &self,
        key: &ObjectKey,
        mut repo: GitRepository,
    ) -> OperatorResult<ReconcileAction> {
        if repo.spec.name.trim().is_empty() {
            let err = OperatorError::ValidationError("spec.name must not be empty".into());
            self.record_failure(key, repo, REASON_CREATE_REJECTED, &err)
                .await;
            return Err(err);
        }

        let request = CreateRepository {
            name: repo.spec.name.clone(),
            description: repo.spec.description.clone(),
            private: repo.spec.private,
        };

        tracing::info!(
            name = %key.name,
            namespace = %key.namespace,
            repository = %request.name,
            private = request.private,
            "Creating remote repository"
        );

        let remote = match self.ctx.provider.create_repository(request).await {
            Ok(remote) => remote,
            Err(e) => {
                let (reason, err) = if e.is_transient() {
                    (REASON_CREATE_FAILED, OperatorError::Provider(e))
                } else {
                    (REASON_CREATE_REJECTED, OperatorError::CreateRejected(e))
                };
                self.record_failure(key, repo, reason, &err).await;
                return Err(err);
            }
        };

        let mut status = repo.status.clone().unwrap_or_default();
        project_status(&mut status, &remote);
        set_condition(
            &mut status.conditions,
            condition(
                CONDITION_READY,
                true,
                REASON_CREATED,
                format!("Repository {} created", repo.spec.name),
            ),
        );
        repo.status = Some(status);

        let repo = self.ctx.store.update_status(repo).await?;
        let status = repo.status.unwrap_or_default();

        tracing::info!(
            name = %key.name,
            namespace = %key.namespace,
            id = %status.id,
            url = %status.url,
            "Remote repository created"
        );
        Ok(ReconcileAction::Done)
    }

    /// Delete the remote repository, then release the object.
    ///
    /// The provider is asked even when status says nothing was created: a
    /// create can succeed without its status write landing.
    async fn finalize(
        &self,
        key: &ObjectKey,
        mut repo: GitRepository,
    ) -> OperatorResult<ReconcileAction> {
        let repository = repo.spec.name.clone();

        if repository.trim().is_empty() {
            tracing::info!(name = %key.name, "No repository name, skipping remote deletion");
        } else {
            tracing::info!(
                name = %key.name,
                namespace = %key.namespace,
                repository = %repository,
                "Deleting remote repository"
            );

            match self.ctx.provider.delete_repository(repository.clone()).await {
                Ok(()) => {}
                Err(ProviderError::NotFound(_)) => {
                    tracing::info!(repository = %repository, "Remote repository already absent");
                }
                Err(e) => {
                    let err = OperatorError::Provider(e);
                    self.record_failure(key, repo, REASON_DELETE_FAILED, &err)
                        .await;
                    return Err(err);
                }
            }
        }

        remove_finalizer(&mut repo);
        self.ctx.store.update(repo).await?;

        tracing::info!(name = %key.name, namespace = %key.namespace, "Finalizer removed");
        Ok(ReconcileAction::Done)
    }

    /// Surface a failure on the Ready condition.
    ///
    /// Only written when the condition changes. A failed write is logged and
    /// otherwise ignored; the caller reports the reconcile error.
    async fn record_failure(
        &self,
        key: &ObjectKey,
        mut repo: GitRepository,
        reason: &str,
        err: &OperatorError,
    ) {
        let mut status = repo.status.clone().unwrap_or_default();
        if !set_condition(
            &mut status.conditions,
            condition(CONDITION_READY, false, reason, err.to_string()),
        ) {
            return;
        }
        repo.status = Some(status);

        if let Err(e) = self.ctx.store.update_status(repo).await {
            tracing::warn!(
                name = %key.name,
                namespace = %key.namespace,
                reason = %reason,
                error = %e,
                "Failed to record condition"
            );
        }
    }
}

/// Reconcile entry point for `kube::runtime::Controller`.
///
/// # Errors
///
/// Propagates the state machine's error; [`error_policy`] decides the requeue.
pub async fn reconcile(
    repo: Arc<GitRepository>,
    ctx: Arc<ControllerContext>,
) -> OperatorResult<Action> {
    let key = ObjectKey::from_object(&repo)?;
    let action = GitRepositoryController::new(ctx.clone())
        .reconcile(&key)
        .await?;

    ctx.retries.reset(&key);
    Ok(action.into())
}

/// Handle errors during reconciliation.
pub fn error_policy(
    repo: Arc<GitRepository>,
    error: &OperatorError,
    ctx: Arc<ControllerContext>,
) -> Action {
    let key = match ObjectKey::from_object(&repo) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "Cannot requeue GitRepository without a namespace");
            return Action::await_change();
        }
    };

    match ctx.retries.next_delay(&key, error) {
        Some(delay) => {
            if error.is_conflict() {
                tracing::debug!(name = %key.name, namespace = %key.namespace, "Write conflict, retrying");
            } else {
                tracing::error!(
                    name = %key.name,
                    namespace = %key.namespace,
                    error = %error,
                    attempts = ctx.retries.attempts(&key),
                    retry_in = ?delay,
                    "Reconciliation error"
                );
            }
            Action::requeue(delay)
        }
        None => {
            tracing::error!(
                name = %key.name,
                namespace = %key.namespace,
                error = %error,
                "Reconciliation failed permanently, waiting for the resource to change"
            );
            Action::await_change()
        }
    }
}

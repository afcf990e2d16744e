//! Kubernetes controller for GitRepository resources.
//!
//! - [`GitRepositoryController`]: the reconciliation state machine
//! - [`reconcile`] / [`error_policy`]: adapters for `kube::runtime::Controller`
//!
//! # Usage with kube-runtime
//!
//! ```ignore
//! use github_operator::controller::{ControllerContext, error_policy, reconcile};
//!
//! Controller::new(repositories, watcher_config)
//!     .run(reconcile, error_policy, context)
//!     .for_each(|_| futures::future::ready(()))
//!     .await;
//! ```

pub mod finalizer;
mod git_repository;
mod retry;
pub mod status;

pub use git_repository::{GitRepositoryController, RepositoryState, error_policy, reconcile};
pub use retry::RetryTracker;

use crate::provider::RepositoryProvider;
use crate::store::RepositoryStore;
use kube::runtime::controller::Action;
use std::sync::Arc;

/// Shared context for the controller.
///
/// Holds the capabilities every reconciliation uses. Nothing in here is
/// specific to one object except the retry bookkeeping, which is keyed.
pub struct ControllerContext {
    /// Where GitRepository objects are read and written.
    pub store: Arc<dyn RepositoryStore>,
    /// Hosting platform the repositories live on.
    pub provider: Arc<dyn RepositoryProvider>,
    /// Requeue backoff state.
    pub retries: RetryTracker,
}

impl ControllerContext {
    /// Create a new controller context with default backoff.
    pub fn new(store: Arc<dyn RepositoryStore>, provider: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            store,
            provider,
            retries: RetryTracker::default(),
        }
    }

    /// Replace the backoff policy.
    #[must_use]
    pub fn with_retries(mut self, retries: RetryTracker) -> Self {
        self.retries = retries;
        self
    }
}

/// Result type for reconciliation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Requeue after the specified duration.
    Requeue(std::time::Duration),
    /// Don't requeue (reconciliation complete).
    Done,
}

impl From<ReconcileAction> for Action {
    fn from(action: ReconcileAction) -> Self {
        match action {
            ReconcileAction::Requeue(duration) => Action::requeue(duration),
            ReconcileAction::Done => Action::await_change(),
        }
    }
}

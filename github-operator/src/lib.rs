//! GitHub Kubernetes Operator
//!
//! Keeps GitHub repositories in step with `GitRepository` custom resources:
//! a repository is created when the resource appears and deleted when the
//! resource is deleted.
//!
//! # Custom Resource Definitions
//!
//! - **GitRepository**: a repository that should exist on GitHub
//!
//! # Example
//!
//! ```yaml
//! apiVersion: vcs.github/v1alpha1
//! kind: GitRepository
//! metadata:
//!   name: svc-a
//! spec:
//!   name: svc-a
//!   private: true
//!   description: demo
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod crd;
pub mod error;
pub mod observability;
pub mod provider;
pub mod store;

pub use crd::{GitRepository, GitRepositorySpec, GitRepositoryStatus};
pub use error::{OperatorError, OperatorResult};

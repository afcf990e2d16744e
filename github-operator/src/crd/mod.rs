//! Custom Resource Definitions for the GitHub operator.
//!
//! - [`GitRepository`]: a repository that should exist on GitHub

mod git_repository;

pub use git_repository::{
    GitRepository, GitRepositorySpec, GitRepositoryStatus, RepositoryCondition,
};

//! Finalizer bookkeeping for GitRepository objects.

use crate::crd::GitRepository;

/// Finalizer guarding remote cleanup.
pub const GITHUB_REPO_FINALIZER: &str = "github-repo-finalizer";

/// Whether the cleanup finalizer is present.
pub fn has_finalizer(repo: &GitRepository) -> bool {
    repo.metadata
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|name| name == GITHUB_REPO_FINALIZER))
}

/// Add the cleanup finalizer. Returns `false` if it was already there.
pub fn add_finalizer(repo: &mut GitRepository) -> bool {
    if has_finalizer(repo) {
        return false;
    }
    repo.metadata
        .finalizers
        .get_or_insert_with(Vec::new)
        .push(GITHUB_REPO_FINALIZER.to_string());
    true
}

/// Remove the cleanup finalizer, leaving any others in place.
/// Returns `false` if it was not there.
pub fn remove_finalizer(repo: &mut GitRepository) -> bool {
    match repo.metadata.finalizers.as_mut() {
        Some(finalizers) => {
            let before = finalizers.len();
            finalizers.retain(|name| name != GITHUB_REPO_FINALIZER);
            finalizers.len() != before
        }
        None => false,
    }
}

//! Status projection and condition bookkeeping.
//!
//! Everything here is pure: the controller decides when to persist.

use crate::crd::{GitRepositoryStatus, RepositoryCondition};
use crate::provider::RemoteRepository;

/// Condition type surfaced on every GitRepository.
pub const CONDITION_READY: &str = "Ready";

/// Repository exists and status is recorded.
pub const REASON_CREATED: &str = "Created";
/// Creation failed; it will be retried.
pub const REASON_CREATE_FAILED: &str = "CreateFailed";
/// Creation was refused; it will not be retried until the spec changes.
pub const REASON_CREATE_REJECTED: &str = "CreateRejected";
/// Remote deletion failed; the finalizer stays until it succeeds.
pub const REASON_DELETE_FAILED: &str = "DeleteFailed";

/// Map a provider response onto status fields.
///
/// Missing values become empty strings. The browser URL is preferred over
/// the API URL.
pub fn project_status(status: &mut GitRepositoryStatus, remote: &RemoteRepository) {
    status.created = true;
    status.id = remote.id.map(|id| id.to_string()).unwrap_or_default();
    status.url = remote
        .html_url
        .clone()
        .or_else(|| remote.api_url.clone())
        .unwrap_or_default();
}

/// Build a condition stamped with the current time.
pub fn condition(
    condition_type: &str,
    ready: bool,
    reason: &str,
    message: impl Into<String>,
) -> RepositoryCondition {
    RepositoryCondition {
        condition_type: condition_type.to_string(),
        status: if ready { "True" } else { "False" }.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.into()),
        last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// Insert or replace the condition with the same type.
///
/// The previous transition time is kept when the status value did not
/// change. Returns whether the stored conditions changed.
pub fn set_condition(conditions: &mut Vec<RepositoryCondition>, mut new: RepositoryCondition) -> bool {
    match conditions
        .iter_mut()
        .find(|c| c.condition_type == new.condition_type)
    {
        Some(existing) => {
            if existing.status == new.status {
                if existing.reason == new.reason && existing.message == new.message {
                    return false;
                }
                new.last_transition_time = existing.last_transition_time.clone();
            }
            *existing = new;
            true
        }
        None => {
            conditions.push(new);
            true
        }
    }
}

/// Look up a condition by type.
pub fn find_condition<'a>(
    conditions: &'a [RepositoryCondition],
    condition_type: &str,
) -> Option<&'a RepositoryCondition> {
    conditions.iter().find(|c| c.condition_type == condition_type)
}

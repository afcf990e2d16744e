//! Per-object requeue backoff.

use crate::error::OperatorError;
use crate::store::ObjectKey;
use dashmap::DashMap;
use std::time::Duration;

/// Tracks consecutive failures per object and turns them into requeue delays.
///
/// Delay doubles with every failure from `base` up to `max`. Conflicts
/// requeue immediately and do not count as failures; fatal errors do not
/// requeue at all.
#[derive(Debug)]
pub struct RetryTracker {
    base: Duration,
    max: Duration,
    attempts: DashMap<ObjectKey, u32>,
}

impl RetryTracker {
    /// Create a tracker with the given bounds.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            attempts: DashMap::new(),
        }
    }

    /// Decide when to retry after `error`. `None` means wait for the object to change.
    pub fn next_delay(&self, key: &ObjectKey, error: &OperatorError) -> Option<Duration> {
        if error.is_conflict() {
            return Some(Duration::ZERO);
        }
        if error.is_fatal() {
            self.reset(key);
            return None;
        }

        let mut attempts = self.attempts.entry(key.clone()).or_insert(0);
        *attempts = attempts.saturating_add(1);
        Some(self.delay_for(*attempts))
    }

    /// Forget failures for an object after it reconciled successfully.
    pub fn reset(&self, key: &ObjectKey) {
        self.attempts.remove(key);
    }

    /// Consecutive failures recorded for an object.
    pub fn attempts(&self, key: &ObjectKey) -> u32 {
        self.attempts.get(key).map(|a| *a).unwrap_or(0)
    }

    fn delay_for(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(16);
        self.base
            .checked_mul(1u32 << exponent)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl Default for RetryTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    fn key() -> ObjectKey {
        ObjectKey::new("default", "svc-a")
    }

    #[test]
    fn transient_errors_back_off_exponentially() {
        let tracker = RetryTracker::new(Duration::from_secs(5), Duration::from_secs(60));
        let err = OperatorError::Provider(ProviderError::Timeout);

        let delays: Vec<_> = (0..6)
            .map(|_| tracker.next_delay(&key(), &err).unwrap().as_secs())
            .collect();
        assert_eq!(delays, [5, 10, 20, 40, 60, 60]);
        assert_eq!(tracker.attempts(&key()), 6);
    }

    #[test]
    fn reset_starts_over() {
        let tracker = RetryTracker::default();
        let err = OperatorError::Provider(ProviderError::Timeout);
        tracker.next_delay(&key(), &err);
        tracker.next_delay(&key(), &err);

        tracker.reset(&key());
        assert_eq!(tracker.attempts(&key()), 0);
        assert_eq!(
            tracker.next_delay(&key(), &err),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn conflicts_requeue_immediately_without_counting() {
        let tracker = RetryTracker::default();
        let err = OperatorError::Conflict {
            kind: "GitRepository".into(),
            name: "svc-a".into(),
            namespace: "default".into(),
        };

        assert_eq!(tracker.next_delay(&key(), &err), Some(Duration::ZERO));
        assert_eq!(tracker.attempts(&key()), 0);
    }

    #[test]
    fn fatal_errors_do_not_requeue() {
        let tracker = RetryTracker::default();
        let err = OperatorError::CreateRejected(ProviderError::Rejected {
            status: 422,
            message: "invalid name".into(),
        });

        assert_eq!(tracker.next_delay(&key(), &err), None);
    }

    #[test]
    fn keys_are_independent() {
        let tracker = RetryTracker::default();
        let err = OperatorError::Provider(ProviderError::Timeout);
        let other = ObjectKey::new("default", "svc-b");

        tracker.next_delay(&key(), &err);
        tracker.next_delay(&key(), &err);
        assert_eq!(
            tracker.next_delay(&other, &err),
            Some(Duration::from_secs(5))
        );
    }
}

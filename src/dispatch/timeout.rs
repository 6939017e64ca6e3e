// Operation deadlines

use crate::client::CallOptions;
use crate::dispatch::descriptor::TimeoutClass;
use crate::session::TimeoutSettings;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline used when the timeout does not fit the clock; about 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Default durations used when the operator supplies no timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    standard: Duration,
    long_running: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(300))
    }
}

impl TimeoutPolicy {
    pub fn new(standard: Duration, long_running: Duration) -> Self {
        Self {
            standard,
            long_running,
        }
    }

    pub fn from_settings(settings: &TimeoutSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.default_secs),
            Duration::from_secs(settings.long_running_secs),
        )
    }

    /// Default timeout for a class
    pub fn timeout_for(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Standard => self.standard,
            TimeoutClass::LongRunning => self.long_running,
        }
    }

    /// Derive the deadline of one operation
    ///
    /// The returned token is a child of `parent`, so aborting the session
    /// cancels the operation as well.
    pub fn derive(
        &self,
        user_timeout: Option<Duration>,
        class: TimeoutClass,
        parent: &CancellationToken,
    ) -> OperationDeadline {
        let timeout = user_timeout.unwrap_or_else(|| self.timeout_for(class));
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout.min(FAR_FUTURE))
            .unwrap_or(now);
        OperationDeadline {
            timeout,
            deadline,
            cancel: parent.child_token(),
        }
    }
}

/// Effective timeout, absolute deadline and cancellation of one operation
#[derive(Debug, Clone)]
pub struct OperationDeadline {
    timeout: Duration,
    deadline: Instant,
    cancel: CancellationToken,
}

impl OperationDeadline {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Options handed to the remote call
    pub fn call_options(&self) -> CallOptions {
        CallOptions::new(self.remaining(), self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_timeout_wins() {
        let policy = TimeoutPolicy::default();
        let parent = CancellationToken::new();

        let deadline = policy.derive(Some(Duration::from_secs(30)), TimeoutClass::LongRunning, &parent);
        assert_eq!(deadline.timeout(), Duration::from_secs(30));

        let deadline = policy.derive(None, TimeoutClass::LongRunning, &parent);
        assert_eq!(deadline.timeout(), Duration::from_secs(300));

        let deadline = policy.derive(None, TimeoutClass::Standard, &parent);
        assert_eq!(deadline.timeout(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_parent_cancellation_propagates() {
        let policy = TimeoutPolicy::default();
        let parent = CancellationToken::new();
        let deadline = policy.derive(None, TimeoutClass::Standard, &parent);
        let options = deadline.call_options();

        assert!(!options.cancel.is_cancelled());
        parent.cancel();
        assert!(deadline.is_cancelled());
        assert!(options.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_cancellation_does_not_reach_parent() {
        let parent = CancellationToken::new();
        let deadline = TimeoutPolicy::default().derive(None, TimeoutClass::Standard, &parent);
        deadline.cancel_token().cancel();
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_oversized_timeout_is_clamped() {
        let parent = CancellationToken::new();
        let deadline = TimeoutPolicy::default().derive(
            Some(Duration::from_secs(u64::MAX)),
            TimeoutClass::Standard,
            &parent,
        );

        assert_eq!(deadline.timeout(), Duration::from_secs(u64::MAX));
        assert!(deadline.remaining() > Duration::from_secs(86_400 * 365));
        assert!(deadline.remaining() <= FAR_FUTURE);
    }

    #[test]
    fn test_from_settings() {
        let settings = TimeoutSettings {
            default_secs: 10,
            long_running_secs: 20,
        };
        let policy = TimeoutPolicy::from_settings(&settings);
        assert_eq!(policy.timeout_for(TimeoutClass::Standard), Duration::from_secs(10));
        assert_eq!(policy.timeout_for(TimeoutClass::LongRunning), Duration::from_secs(20));
    }
}

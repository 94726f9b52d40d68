use time::OffsetDateTime;

use super::error::LoginErrorKind;
use crate::user::User;

/// Snapshot of the controller's in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SessionState {
    /// `None` means anonymous. Provisional while `loading` is set.
    pub current_user: Option<User>,
    /// Set only while the start-up resume is in flight.
    pub loading: bool,
    pub last_error: Option<LoginErrorKind>,
    /// Bumped by every session exchange and logout.
    pub(super) epoch: u64,
}

impl SessionState {
    pub(super) fn initial() -> Self {
        Self {
            current_user: None,
            loading: true,
            last_error: None,
            epoch: 0,
        }
    }
}

/// A login that redirected to the identity provider and has not come back yet.
///
/// Persisted in durable storage, so it survives the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLogin {
    pub started_at: OffsetDateTime,
}

impl PendingLogin {
    /// Time left before the marker counts as abandoned, `None` if it already does.
    #[must_use]
    pub fn remaining(&self, timeout: std::time::Duration, now: OffsetDateTime) -> Option<std::time::Duration> {
        // A marker from the future (clock skew) counts as just started.
        let elapsed = std::time::Duration::try_from(now - self.started_at).unwrap_or_default();
        timeout.checked_sub(elapsed).filter(|left| !left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn remaining_counts_down_to_none() {
        let start = OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap();
        let pending = PendingLogin { started_at: start };
        let timeout = Duration::from_secs(10);

        assert_eq!(pending.remaining(timeout, start), Some(timeout));
        assert_eq!(
            pending.remaining(timeout, start + time::Duration::seconds(4)),
            Some(Duration::from_secs(6))
        );
        assert_eq!(pending.remaining(timeout, start + time::Duration::seconds(10)), None);
        assert_eq!(pending.remaining(timeout, start + time::Duration::hours(1)), None);
    }

    #[test]
    fn future_marker_gets_full_timeout() {
        let start = OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap();
        let pending = PendingLogin { started_at: start };
        let timeout = Duration::from_secs(10);
        assert_eq!(
            pending.remaining(timeout, start - time::Duration::seconds(30)),
            Some(timeout)
        );
    }
}

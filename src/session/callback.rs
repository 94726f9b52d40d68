use std::sync::atomic::{AtomicBool, Ordering};

use super::controller::SessionController;
use super::error::LoginErrorKind;
use super::traits::{AuthStorage, Backend, Host};
use crate::redirect::extract_session_id;
use crate::user::User;

/// One-shot guard for the callback page.
///
/// Create one per page mount and keep it outside re-render state; a second
/// effect run on the same mount then becomes a no-op.
#[derive(Debug, Default)]
pub struct CallbackGuard {
    consumed: AtomicBool,
}

impl CallbackGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` exactly once.
    pub fn try_consume(&self) -> bool {
        !self.consumed.swap(true, Ordering::AcqRel)
    }
}

/// What the callback page did.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CallbackOutcome {
    Authenticated(User),
    /// The fragment carried no `session_id`.
    MissingSessionId,
    /// This mount (or this code) was already handled.
    AlreadyHandled,
    Failed(LoginErrorKind),
}

/// Run the callback page: read `session_id` from the URL fragment, exchange
/// it, and navigate home whatever the result.
///
/// Failures have already been alerted and cleaned up by the controller; the
/// page only needs to leave.
pub async fn handle_callback<B, S, H>(
    controller: &SessionController<B, S, H>,
    guard: &CallbackGuard,
    fragment: &str,
) -> CallbackOutcome
where
    B: Backend,
    S: AuthStorage,
    H: Host,
{
    if !guard.try_consume() {
        tracing::debug!("Callback already handled on this mount");
        return CallbackOutcome::AlreadyHandled;
    }

    let Some(code) = extract_session_id(fragment) else {
        tracing::warn!("Callback without session_id");
        controller.go_home();
        return CallbackOutcome::MissingSessionId;
    };

    let outcome = match controller.process_session(code).await {
        Ok(Some(user)) => CallbackOutcome::Authenticated(user),
        Ok(None) => CallbackOutcome::AlreadyHandled,
        Err(e) => CallbackOutcome::Failed(e.kind()),
    };
    controller.go_home();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{FakeBackend, Reply, controller_with};

    #[test]
    fn guard_consumes_once() {
        let guard = CallbackGuard::new();
        assert!(guard.try_consume());
        assert!(!guard.try_consume());
        assert!(!guard.try_consume());
    }

    #[tokio::test]
    async fn double_effect_exchanges_once() {
        let backend = FakeBackend::new().with_session(Reply::user(User::new("u1")));
        let (controller, _, host) = controller_with(backend);
        let guard = CallbackGuard::new();

        let (first, second) = tokio::join!(
            handle_callback(&controller, &guard, "#session_id=abc123"),
            handle_callback(&controller, &guard, "#session_id=abc123"),
        );

        assert!(matches!(first, CallbackOutcome::Authenticated(_)));
        assert_eq!(second, CallbackOutcome::AlreadyHandled);
        assert_eq!(controller.backend().session_calls(), 1);
        assert_eq!(host.navigations(), vec!["/".to_owned()]);
    }

    #[tokio::test]
    async fn missing_session_id_goes_home_without_exchange() {
        let (controller, _, host) = controller_with(FakeBackend::new());
        let guard = CallbackGuard::new();

        let outcome = handle_callback(&controller, &guard, "#other=x").await;

        assert_eq!(outcome, CallbackOutcome::MissingSessionId);
        assert_eq!(controller.backend().session_calls(), 0);
        assert_eq!(host.navigations(), vec!["/".to_owned()]);
        assert!(host.alerts().is_empty());
    }

    #[tokio::test]
    async fn failure_still_navigates_home() {
        let backend = FakeBackend::new().with_session(Reply::Offline);
        let (controller, _, host) = controller_with(backend);
        let guard = CallbackGuard::new();

        let outcome = handle_callback(&controller, &guard, "#session_id=abc123").await;

        assert_eq!(
            outcome,
            CallbackOutcome::Failed(LoginErrorKind::ConnectionInterrupted)
        );
        assert_eq!(host.navigations(), vec!["/".to_owned()]);
        assert_eq!(host.alerts().len(), 1);
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::runtime::Handle;

use super::config::SessionSettings;
use super::error::{LoginError, LoginErrorKind};
use super::state::{PendingLogin, SessionState};
use super::storage::{self, AUTH_KEYS, AUTH_TOKEN_KEY, USER_KEY};
use super::traits::{AuthStorage, Backend, Host};
use super::watchdog::Watchdog;
use crate::authz::Capabilities;
use crate::error::Error;
use crate::redirect;
use crate::types::SessionCode;
use crate::user::User;

/// Owns the login/logout lifecycle and the current user.
///
/// A cheap handle: clones share the same state. Create one at the
/// application root and pass it down; it is the only writer of the current
/// user and of the persisted auth artifacts.
pub struct SessionController<B, S, H> {
    inner: Arc<Inner<B, S, H>>,
}

struct Inner<B, S, H> {
    backend: B,
    storage: S,
    host: H,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    watchdog: Mutex<Watchdog>,
    consumed_codes: Mutex<HashSet<SessionCode>>,
}

// Manual Clone: avoid derive adding `B: Clone, S: Clone, H: Clone` bounds.
impl<B, S, H> Clone for SessionController<B, S, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend, S: AuthStorage, H: Host> SessionController<B, S, H> {
    #[must_use]
    pub fn new(backend: B, storage: S, host: H, settings: SessionSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                storage,
                host,
                settings,
                state: Mutex::new(SessionState::initial()),
                watchdog: Mutex::new(Watchdog::default()),
                consumed_codes: Mutex::new(HashSet::new()),
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.inner.host
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.state.lock().current_user.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<LoginErrorKind> {
        self.inner.state.lock().last_error
    }

    /// Capabilities of the current user, computed from its tags on every call.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        let state = self.inner.state.lock();
        Capabilities::for_user(state.current_user.as_ref(), self.inner.settings.hierarchy)
    }

    #[must_use]
    pub fn pending_login(&self) -> Option<PendingLogin> {
        storage::read_pending(&self.inner.storage)
    }

    /// Locally persisted copy of the last exchanged user. For display only;
    /// [`current_user`](Self::current_user) is authoritative.
    #[must_use]
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.inner.storage.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cached user");
                None
            }
        }
    }

    // ── Resume ─────────────────────────────────────────────────────

    /// Silently restore the session at application start.
    ///
    /// Never surfaces an error: no session is a normal state. A 401 wipes the
    /// persisted auth artifacts; any other failure keeps them, since it may be
    /// transient.
    ///
    /// If a session exchange or logout happens while the check is in flight,
    /// the check's answer is stale and is dropped.
    pub async fn resume(&self) {
        let epoch = {
            let mut state = self.inner.state.lock();
            state.loading = true;
            state.epoch
        };
        self.recover_pending_login();

        let result = self.inner.backend.current_user().await;

        // Held through the cleanup so no exchange can land between check and clear.
        let mut state = self.inner.state.lock();
        state.loading = false;
        if state.epoch != epoch {
            tracing::debug!("Discarding session check overtaken by a newer session change");
            return;
        }
        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Session resumed");
                state.current_user = Some(user);
                state.last_error = None;
            }
            Err(e) if e.status() == Some(401) => {
                tracing::debug!("No active session");
                state.current_user = None;
                self.clear_auth_state();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed; keeping persisted credentials");
                state.current_user = None;
            }
        }
    }

    /// Timers do not survive the redirect, so a marker found at start-up is
    /// either re-armed for its remaining time or, if already too old, cleaned up.
    fn recover_pending_login(&self) {
        let Some(pending) = self.pending_login() else {
            return;
        };
        let timeout = self.inner.settings.login_timeout;
        match pending.remaining(timeout, OffsetDateTime::now_utc()) {
            Some(left) => {
                tracing::debug!(remaining_ms = left.as_millis() as u64, "Re-arming pending login watchdog");
                if let Err(e) = self.arm_watchdog(left) {
                    tracing::warn!(error = %e, "Pending login watchdog not re-armed");
                }
            }
            None => {
                tracing::warn!(started_at = %pending.started_at, "Clearing abandoned login");
                self.clear_auth_state();
            }
        }
    }

    // ── Login ──────────────────────────────────────────────────────

    /// Start a login: persist the pending marker, arm the watchdog, and
    /// redirect the page to the identity provider.
    ///
    /// The watchdog is a Tokio task, so this needs a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a classified [`LoginError`] if the watchdog cannot be armed
    /// (no runtime) or the redirect URL cannot be built. Local auth state is
    /// cleaned up and the user alerted first.
    pub fn login(&self) -> Result<(), LoginError> {
        self.inner.state.lock().last_error = None;
        storage::write_pending(&self.inner.storage, OffsetDateTime::now_utc());

        let return_url = self
            .arm_watchdog(self.inner.settings.login_timeout)
            .and_then(|()| {
                let location = self.inner.host.location();
                redirect::return_url(&location, &self.inner.settings.callback_path)
            })
            .map_err(|e| {
                tracing::error!(error = %e, "Could not start login");
                let err = self.fail(LoginError::from(e));
                self.go_home();
                err
            })?;
        let login_url = redirect::login_url(&self.inner.settings.provider_url, &return_url);

        tracing::info!(return_url = %return_url, "Redirecting to identity provider");
        self.inner.host.redirect(&login_url);
        Ok(())
    }

    fn arm_watchdog(&self, after: Duration) -> Result<(), Error> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Config(format!("login watchdog needs a Tokio runtime: {e}")))?;
        let mut watchdog = self.inner.watchdog.lock();
        let generation = watchdog.rearm();
        let controller = self.clone();
        watchdog.attach(runtime.spawn(async move {
            tokio::time::sleep(after).await;
            controller.on_login_timeout(generation);
        }));
        Ok(())
    }

    fn cancel_watchdog(&self) {
        if self.inner.watchdog.lock().cancel() {
            tracing::debug!("Pending login watchdog cancelled");
        }
    }

    fn on_login_timeout(&self, generation: u64) {
        if !self.inner.watchdog.lock().fire(generation) {
            return;
        }
        if self.pending_login().is_none() {
            return;
        }
        tracing::warn!(
            timeout_ms = self.inner.settings.login_timeout.as_millis() as u64,
            "Login did not complete in time"
        );
        let _ = self.fail(LoginError::new(LoginErrorKind::Timeout, None));
    }

    // ── Callback ───────────────────────────────────────────────────

    /// Exchange the provider's one-time code for a session.
    ///
    /// Returns `Ok(None)` without contacting the backend if this code was
    /// already submitted. A success that arrives after the watchdog fired is
    /// still accepted: the user did complete the login.
    ///
    /// The pending marker is cleared before the exchange starts, so a
    /// concurrent [`resume`](Self::resume) cannot re-arm the watchdog, and
    /// its answer is discarded once this call has started.
    ///
    /// # Errors
    ///
    /// Returns the classified [`LoginError`] after cleaning up local auth
    /// state and alerting the user, so the caller can still navigate away.
    pub async fn process_session(&self, code: SessionCode) -> Result<Option<User>, LoginError> {
        if !self.inner.consumed_codes.lock().insert(code.clone()) {
            tracing::debug!("Ignoring duplicate session exchange");
            return Ok(None);
        }
        self.cancel_watchdog();
        storage::clear_pending(&self.inner.storage);
        self.bump_epoch();

        let grant = self
            .inner
            .backend
            .create_session(&code)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Session exchange failed");
                self.fail(LoginError::from(e))
            })?;

        let user = grant.user;
        if let Some(token) = grant.session_token {
            self.inner.storage.set(AUTH_TOKEN_KEY, token);
        }
        match serde_json::to_string(&user) {
            Ok(json) => self.inner.storage.set(USER_KEY, json),
            Err(e) => tracing::warn!(error = %e, "Could not cache user locally"),
        }

        {
            let mut state = self.inner.state.lock();
            state.epoch += 1;
            state.current_user = Some(user.clone());
            state.last_error = None;
        }

        tracing::info!(user_id = %user.id, "Login successful");
        Ok(Some(user))
    }

    // ── Logout ─────────────────────────────────────────────────────

    /// End the session. The backend call is best-effort; local state is
    /// cleared regardless, and consumed callback codes are forgotten.
    pub async fn logout(&self) {
        self.bump_epoch();
        if let Err(e) = self.inner.backend.logout().await {
            tracing::warn!(error = %e, "Logout request failed");
        }
        self.cancel_watchdog();
        {
            let mut state = self.inner.state.lock();
            state.epoch += 1;
            state.current_user = None;
        }
        self.inner.consumed_codes.lock().clear();
        self.clear_auth_state();
        tracing::info!("Logged out");
    }

    // ── Helpers ────────────────────────────────────────────────────

    /// Remove every persisted auth artifact: durable keys and the session
    /// cookie on both the bare path and the current hostname.
    pub fn clear_auth_state(&self) {
        for key in AUTH_KEYS {
            self.inner.storage.remove(key);
        }
        let location = self.inner.host.location();
        for cookie in storage::expired_session_cookies(
            &self.inner.settings.session_cookie_name,
            location.host_str(),
        ) {
            self.inner.storage.set_cookie(cookie);
        }
    }

    /// Mark in-flight session checks as stale.
    fn bump_epoch(&self) {
        self.inner.state.lock().epoch += 1;
    }

    pub(crate) fn go_home(&self) {
        self.inner.host.navigate(&self.inner.settings.home_path);
    }

    /// Clean up, record, and surface a login failure.
    fn fail(&self, err: LoginError) -> LoginError {
        self.cancel_watchdog();
        self.clear_auth_state();
        {
            let mut state = self.inner.state.lock();
            state.epoch += 1;
            state.current_user = None;
            state.last_error = Some(err.kind());
        }
        self.inner.host.alert(err.user_message());
        if err.kind() == LoginErrorKind::Timeout {
            self.go_home();
        }
        err
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use cookie::Cookie;
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};

use super::state::PendingLogin;
use super::traits::AuthStorage;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";
pub const PENDING_LOGIN_KEY: &str = "pending_login";
pub const PENDING_LOGIN_TIMESTAMP_KEY: &str = "pending_login_timestamp";

/// Every durable key owned by the session controller.
pub(super) const AUTH_KEYS: [&str; 4] = [
    AUTH_TOKEN_KEY,
    USER_KEY,
    PENDING_LOGIN_KEY,
    PENDING_LOGIN_TIMESTAMP_KEY,
];

/// Backdated session cookies: one on the bare path, one scoped to `hostname`.
pub(super) fn expired_session_cookies(name: &str, hostname: Option<&str>) -> Vec<Cookie<'static>> {
    let mut cookies = vec![
        Cookie::build((name.to_owned(), ""))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build(),
    ];
    if let Some(hostname) = hostname {
        cookies.push(
            Cookie::build((name.to_owned(), ""))
                .path("/")
                .domain(hostname.to_owned())
                .expires(OffsetDateTime::UNIX_EPOCH)
                .build(),
        );
    }
    cookies
}

pub(super) fn write_pending(storage: &impl AuthStorage, started_at: OffsetDateTime) {
    let millis = started_at.unix_timestamp_nanos() / 1_000_000;
    storage.set(PENDING_LOGIN_KEY, "true".into());
    storage.set(PENDING_LOGIN_TIMESTAMP_KEY, millis.to_string());
}

/// Read the pending-login marker.
///
/// A marker without a readable timestamp is reported as started at the epoch
/// so that it counts as stale.
pub(super) fn read_pending(storage: &impl AuthStorage) -> Option<PendingLogin> {
    storage.get(PENDING_LOGIN_KEY)?;
    let started_at = storage
        .get(PENDING_LOGIN_TIMESTAMP_KEY)
        .and_then(|raw| raw.parse::<i128>().ok())
        .and_then(|millis| OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000).ok())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    Some(PendingLogin { started_at })
}

pub(super) fn clear_pending(storage: &impl AuthStorage) {
    storage.remove(PENDING_LOGIN_KEY);
    storage.remove(PENDING_LOGIN_TIMESTAMP_KEY);
}

fn is_expired(cookie: &Cookie<'_>) -> bool {
    if cookie.max_age().is_some_and(|age| age <= Duration::ZERO) {
        return true;
    }
    cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc())
}

/// In-memory [`AuthStorage`].
///
/// Clones share the same underlying map, so a test can keep a handle and
/// inspect what the controller persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    cookies: HashMap<(String, Option<String>), Cookie<'static>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither values nor cookies are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock();
        inner.values.is_empty() && inner.cookies.is_empty()
    }
}

impl AuthStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.inner.lock().values.insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) {
        self.inner.lock().values.remove(key);
    }

    fn set_cookie(&self, cookie: Cookie<'static>) {
        let key = (cookie.name().to_owned(), cookie.domain().map(str::to_owned));
        let mut inner = self.inner.lock();
        if is_expired(&cookie) {
            inner.cookies.remove(&key);
        } else {
            inner.cookies.insert(key, cookie);
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .cookies
            .iter()
            .find(|((n, _), _)| n == name)
            .map(|(_, c)| c.value().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_round_trip_and_remove() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "{}".into());
        assert_eq!(storage.get(USER_KEY).as_deref(), Some("{}"));
        storage.remove(USER_KEY);
        assert_eq!(storage.get(USER_KEY), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.set(AUTH_TOKEN_KEY, "tok".into());
        assert_eq!(view.get(AUTH_TOKEN_KEY).as_deref(), Some("tok"));
    }

    #[test]
    fn expired_cookies_remove_both_scopes() {
        let storage = MemoryStorage::new();
        storage.set_cookie(Cookie::build(("session_token", "abc")).path("/").build());
        storage.set_cookie(
            Cookie::build(("session_token", "abc"))
                .path("/")
                .domain("spotterscxj.com.br")
                .build(),
        );
        assert_eq!(storage.cookie("session_token").as_deref(), Some("abc"));

        for cookie in expired_session_cookies("session_token", Some("spotterscxj.com.br")) {
            storage.set_cookie(cookie);
        }
        assert_eq!(storage.cookie("session_token"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn expired_cookies_without_hostname_cover_bare_path_only() {
        let cookies = expired_session_cookies("session_token", None);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].path(), Some("/"));
        assert_eq!(cookies[0].domain(), None);
    }

    #[test]
    fn pending_marker_round_trips_at_millisecond_precision() {
        let storage = MemoryStorage::new();
        let at = OffsetDateTime::from_unix_timestamp(1_760_000_000).unwrap()
            + Duration::milliseconds(123);
        write_pending(&storage, at);

        let pending = read_pending(&storage).unwrap();
        assert_eq!(pending.started_at, at);

        clear_pending(&storage);
        assert_eq!(read_pending(&storage), None);
    }

    #[test]
    fn pending_marker_without_timestamp_is_epoch() {
        let storage = MemoryStorage::new();
        storage.set(PENDING_LOGIN_KEY, "true".into());
        let pending = read_pending(&storage).unwrap();
        assert_eq!(pending.started_at, OffsetDateTime::UNIX_EPOCH);
    }
}

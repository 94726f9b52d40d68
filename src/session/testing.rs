//! Scripted collaborators for controller tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use url::Url;

use super::config::SessionSettings;
use super::controller::SessionController;
use super::storage::MemoryStorage;
use super::traits::{Backend, Host};
use crate::error::Error;
use crate::types::SessionCode;
use crate::user::{SessionGrant, User};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Grant(SessionGrant),
    Empty,
    Status(u16, Option<String>),
    Offline,
}

impl Reply {
    pub(crate) fn user(user: User) -> Self {
        Self::Grant(SessionGrant::new(user))
    }

    fn into_grant(self, operation: &'static str) -> Result<SessionGrant, Error> {
        match self {
            Self::Grant(grant) => Ok(grant),
            Self::Empty => Err(Error::Api {
                operation,
                status: 500,
                detail: Some("empty body".into()),
            }),
            Self::Status(status, detail) => Err(Error::Api {
                operation,
                status,
                detail,
            }),
            Self::Offline => Err(Error::Connection("connection refused".into())),
        }
    }
}

pub(crate) struct FakeBackend {
    me: Mutex<Reply>,
    me_delay: Mutex<Option<Duration>>,
    session: Mutex<Reply>,
    logout: Mutex<Reply>,
    session_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            me: Mutex::new(Reply::Status(401, None)),
            me_delay: Mutex::new(None),
            session: Mutex::new(Reply::Status(500, None)),
            logout: Mutex::new(Reply::Empty),
            session_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_me(self, reply: Reply) -> Self {
        *self.me.lock() = reply;
        self
    }

    /// Answer "who am I" only after `delay`.
    pub(crate) fn with_me_delay(self, delay: Duration) -> Self {
        *self.me_delay.lock() = Some(delay);
        self
    }

    pub(crate) fn with_session(self, reply: Reply) -> Self {
        *self.session.lock() = reply;
        self
    }

    pub(crate) fn with_logout(self, reply: Reply) -> Self {
        *self.logout.lock() = reply;
        self
    }

    pub(crate) fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }
}

impl Backend for FakeBackend {
    async fn current_user(&self) -> Result<User, Error> {
        let delay = *self.me_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.me.lock().clone();
        reply.into_grant("session check").map(|grant| grant.user)
    }

    async fn create_session(&self, _code: &SessionCode) -> Result<SessionGrant, Error> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let reply = self.session.lock().clone();
        reply.into_grant("session exchange")
    }

    async fn logout(&self) -> Result<(), Error> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        match self.logout.lock().clone() {
            Reply::Empty | Reply::Grant(_) => Ok(()),
            other => other.into_grant("logout").map(|_| ()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeHost {
    inner: Arc<Mutex<HostLog>>,
}

#[derive(Debug)]
struct HostLog {
    location: Url,
    redirects: Vec<Url>,
    navigations: Vec<String>,
    alerts: Vec<String>,
}

impl FakeHost {
    pub(crate) fn new(location: Url) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HostLog {
                location,
                redirects: Vec::new(),
                navigations: Vec::new(),
                alerts: Vec::new(),
            })),
        }
    }

    pub(crate) fn set_location(&self, location: Url) {
        self.inner.lock().location = location;
    }

    pub(crate) fn redirects(&self) -> Vec<Url> {
        self.inner.lock().redirects.clone()
    }

    pub(crate) fn navigations(&self) -> Vec<String> {
        self.inner.lock().navigations.clone()
    }

    pub(crate) fn alerts(&self) -> Vec<String> {
        self.inner.lock().alerts.clone()
    }
}

impl Host for FakeHost {
    fn location(&self) -> Url {
        self.inner.lock().location.clone()
    }

    fn redirect(&self, url: &Url) {
        self.inner.lock().redirects.push(url.clone());
    }

    fn navigate(&self, path: &str) {
        self.inner.lock().navigations.push(path.to_owned());
    }

    fn alert(&self, message: &str) {
        self.inner.lock().alerts.push(message.to_owned());
    }
}

pub(crate) fn controller_with(
    backend: FakeBackend,
) -> (
    SessionController<FakeBackend, MemoryStorage, FakeHost>,
    MemoryStorage,
    FakeHost,
) {
    let storage = MemoryStorage::new();
    let host = FakeHost::new("http://www.spotterscxj.com.br/".parse().unwrap());
    let settings = SessionSettings::new("https://auth.example.com/".parse().unwrap());
    let controller = SessionController::new(backend, storage.clone(), host.clone(), settings);
    (controller, storage, host)
}

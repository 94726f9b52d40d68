use std::future::Future;

use cookie::Cookie;
use url::Url;

use crate::error::Error;
use crate::types::SessionCode;
use crate::user::{SessionGrant, User};

/// The backend's auth endpoints.
///
/// [`HttpBackend`](crate::HttpBackend) talks to the real REST API; tests
/// provide scripted implementations.
pub trait Backend: Send + Sync + 'static {
    /// "Who am I": the user behind the current credentials.
    ///
    /// A 401 means there is no session and must surface as an error whose
    /// [`Error::status`] is `Some(401)`.
    fn current_user(&self) -> impl Future<Output = Result<User, Error>> + Send;

    /// Exchange the provider's one-time code for a durable session.
    fn create_session(
        &self,
        code: &SessionCode,
    ) -> impl Future<Output = Result<SessionGrant, Error>> + Send;

    /// End the server-side session.
    fn logout(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Origin-scoped durable storage that survives a full-page redirect.
///
/// In a browser this is `localStorage` plus `document.cookie`.
pub trait AuthStorage: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);

    /// Store a cookie. A cookie whose expiry lies in the past deletes the
    /// stored cookie with the same name and domain.
    fn set_cookie(&self, cookie: Cookie<'static>);

    fn cookie(&self, name: &str) -> Option<String>;
}

/// The page hosting the controller.
pub trait Host: Send + Sync + 'static {
    /// Current page URL (`window.location`).
    fn location(&self) -> Url;

    /// Full-page navigation away from the application.
    fn redirect(&self, url: &Url);

    /// In-application route change.
    fn navigate(&self, path: &str);

    /// Blocking user-facing notification.
    fn alert(&self, message: &str);
}

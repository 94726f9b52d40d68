use std::time::Duration;

use url::Url;

use crate::authz::HierarchyTable;
use crate::error::Error;

const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Session controller settings.
///
/// The provider URL is the only required value; everything else has a
/// default that can be overridden with the `with_*` methods.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct SessionSettings {
    pub(crate) provider_url: Url,
    pub(crate) login_timeout: Duration,
    pub(crate) callback_path: String,
    pub(crate) home_path: String,
    pub(crate) session_cookie_name: String,
    pub(crate) hierarchy: HierarchyTable,
}

impl SessionSettings {
    #[must_use]
    pub fn new(provider_url: Url) -> Self {
        Self {
            provider_url,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            callback_path: "/auth/callback".into(),
            home_path: "/".into(),
            session_cookie_name: "session_token".into(),
            hierarchy: HierarchyTable::canonical(),
        }
    }

    /// Create settings from environment variables.
    ///
    /// # Required env vars
    /// - `SPOTTERS_AUTH_URL`: identity provider entry point
    ///
    /// # Optional env vars
    /// - `SPOTTERS_LOGIN_TIMEOUT_SECS`: pending-login watchdog in seconds (default 10)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, Error> {
        let raw = std::env::var("SPOTTERS_AUTH_URL")
            .map_err(|_| Error::Config("SPOTTERS_AUTH_URL is required".into()))?;
        let provider_url: Url = raw
            .parse()
            .map_err(|e| Error::Config(format!("SPOTTERS_AUTH_URL: {e}")))?;

        let mut settings = Self::new(provider_url);

        if let Ok(secs) = std::env::var("SPOTTERS_LOGIN_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("SPOTTERS_LOGIN_TIMEOUT_SECS: {e}")))?;
            settings = settings.with_login_timeout(Duration::from_secs(secs));
        }

        Ok(settings)
    }

    #[must_use]
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = path.into();
        self
    }

    #[must_use]
    pub fn with_home_path(mut self, path: impl Into<String>) -> Self {
        self.home_path = path.into();
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_hierarchy(mut self, table: HierarchyTable) -> Self {
        self.hierarchy = table;
        self
    }

    #[must_use]
    pub fn provider_url(&self) -> &Url {
        &self.provider_url
    }

    #[must_use]
    pub fn login_timeout(&self) -> Duration {
        self.login_timeout
    }

    #[must_use]
    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    #[must_use]
    pub fn hierarchy(&self) -> HierarchyTable {
        self.hierarchy
    }
}

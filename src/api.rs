use url::Url;

use crate::error::Error;

/// Path prefix of backend-served resources. Media paths starting with it are
/// resolved against the backend origin.
pub const API_PREFIX: &str = "/api/";

pub(crate) const ME_PATH: &str = "/api/auth/me";
pub(crate) const SESSION_PATH: &str = "/api/auth/session";
pub(crate) const LOGOUT_PATH: &str = "/api/auth/logout";

/// Backend location.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ApiConfig {
    pub(crate) base_url: Url,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Read the backend origin from `SPOTTERS_BACKEND_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the variable is missing or not a URL.
    pub fn from_env() -> Result<Self, Error> {
        let raw = std::env::var("SPOTTERS_BACKEND_URL")
            .map_err(|_| Error::Config("SPOTTERS_BACKEND_URL is required".into()))?;
        let base_url: Url = raw
            .parse()
            .map_err(|e| Error::Config(format!("SPOTTERS_BACKEND_URL: {e}")))?;
        Ok(Self::new(base_url))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a backend endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if `path` cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Into::into)
    }

    /// Rewrite backend-relative media paths (`/api/...`) to absolute URLs.
    ///
    /// Anything else, including already absolute URLs, is returned unchanged.
    #[must_use]
    pub fn resolve_media_url(&self, path: &str) -> String {
        if !path.starts_with(API_PREFIX) {
            return path.to_owned();
        }
        match self.base_url.join(path) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::warn!(error = %e, path, "Could not resolve media URL");
                path.to_owned()
            }
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers errors with `{ "detail": ... }`; anything else is
/// returned as trimmed text.
pub(crate) fn parse_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(body.to_owned()),
        },
        Err(_) => Some(body.to_owned()),
    }
}

#[cfg(feature = "http")]
pub use http::HttpBackend;

#[cfg(feature = "http")]
mod http {
    use serde_json::json;

    use super::{parse_detail, ApiConfig, LOGOUT_PATH, ME_PATH, SESSION_PATH};
    use crate::error::Error;
    use crate::session::Backend;
    use crate::types::SessionCode;
    use crate::user::{SessionGrant, User};

    /// [`Backend`] over HTTP.
    ///
    /// Requests are credentialed through the client's cookie store, the
    /// equivalent of `credentials: "include"` in the browser.
    pub struct HttpBackend {
        config: ApiConfig,
        http: reqwest::Client,
    }

    impl HttpBackend {
        /// # Errors
        ///
        /// Returns [`Error::Http`] if the HTTP client cannot be built.
        pub fn new(config: ApiConfig) -> Result<Self, Error> {
            let http = reqwest::Client::builder().cookie_store(true).build()?;
            Ok(Self { config, http })
        }

        /// Use a custom HTTP client (for connection pool reuse or testing).
        #[must_use]
        pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
            self.http = client;
            self
        }

        #[must_use]
        pub fn config(&self) -> &ApiConfig {
            &self.config
        }

        async fn ensure_success(
            response: reqwest::Response,
            operation: &'static str,
        ) -> Result<reqwest::Response, Error> {
            if response.status().is_success() {
                return Ok(response);
            }
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                operation,
                status,
                detail: parse_detail(&body),
            })
        }
    }

    impl Backend for HttpBackend {
        async fn current_user(&self) -> Result<User, Error> {
            let response = self.http.get(self.config.endpoint(ME_PATH)?).send().await?;
            let response = Self::ensure_success(response, "session check").await?;
            response.json::<User>().await.map_err(Into::into)
        }

        async fn create_session(&self, code: &SessionCode) -> Result<SessionGrant, Error> {
            let response = self
                .http
                .post(self.config.endpoint(SESSION_PATH)?)
                .json(&json!({ "session_id": code.as_str() }))
                .send()
                .await?;
            let response = Self::ensure_success(response, "session exchange").await?;
            response.json::<SessionGrant>().await.map_err(Into::into)
        }

        async fn logout(&self) -> Result<(), Error> {
            let response = self
                .http
                .post(self.config.endpoint(LOGOUT_PATH)?)
                .send()
                .await?;
            Self::ensure_success(response, "logout").await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig::new("https://api.spotterscxj.com.br".parse().unwrap())
    }

    #[test]
    fn endpoints_join_onto_base() {
        let c = config();
        assert_eq!(
            c.endpoint(ME_PATH).unwrap().as_str(),
            "https://api.spotterscxj.com.br/api/auth/me"
        );
        assert_eq!(
            c.endpoint(SESSION_PATH).unwrap().as_str(),
            "https://api.spotterscxj.com.br/api/auth/session"
        );
    }

    #[test]
    fn media_paths_under_api_prefix_become_absolute() {
        let c = config();
        assert_eq!(
            c.resolve_media_url("/api/uploads/photo.jpg"),
            "https://api.spotterscxj.com.br/api/uploads/photo.jpg"
        );
    }

    #[test]
    fn other_media_paths_pass_through() {
        let c = config();
        assert_eq!(
            c.resolve_media_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(c.resolve_media_url("/static/logo.png"), "/static/logo.png");
        assert_eq!(c.resolve_media_url(""), "");
    }

    #[test]
    fn detail_is_read_from_json_body() {
        assert_eq!(
            parse_detail(r#"{"detail":"Invalid session_id"}"#).as_deref(),
            Some("Invalid session_id")
        );
        assert_eq!(
            parse_detail(r#"{"detail":[{"msg":"field required"}]}"#).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
    }

    #[test]
    fn non_json_body_is_kept_as_text() {
        assert_eq!(parse_detail(" Bad Gateway \n").as_deref(), Some("Bad Gateway"));
        assert_eq!(parse_detail("   "), None);
    }
}

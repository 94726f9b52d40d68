#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{operation} failed with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        operation: &'static str,
        status: u16,
        detail: Option<String>,
    },
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of the failed response, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            #[cfg(feature = "http")]
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request never produced a response.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            #[cfg(feature = "http")]
            Self::Http(e) => e.status().is_none() && (e.is_connect() || e.is_timeout() || e.is_request()),
            _ => false,
        }
    }

    /// Server-provided `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

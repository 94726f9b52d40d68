use derive_more::Display;

use crate::error::Error;

/// Why a login attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
pub enum LoginErrorKind {
    /// The calling origin is not allowlisted by the provider or the backend.
    #[display("domain not authorized")]
    DomainNotAuthorized,
    /// The exchange never got a response.
    #[display("connection interrupted")]
    ConnectionInterrupted,
    /// The backend refused the one-time code with 401.
    #[display("session expired")]
    SessionExpired,
    /// The pending-login watchdog fired before the callback was processed.
    #[display("login timed out")]
    Timeout,
    #[display("unknown error")]
    Unknown,
}

impl LoginErrorKind {
    /// Classify a transport or API error raised during login.
    ///
    /// The domain check only looks at server-provided text, never at the
    /// request URL a transport error carries.
    #[must_use]
    pub fn classify(err: &Error) -> Self {
        let message = match err {
            Error::Api { detail, .. } => detail.as_deref(),
            Error::Connection(message) => Some(message.as_str()),
            _ => None,
        }
        .map(str::to_lowercase);
        if message.is_some_and(|m| m.contains("domain") || m.contains("origin")) {
            return Self::DomainNotAuthorized;
        }
        match err.status() {
            Some(403) => Self::DomainNotAuthorized,
            Some(401) => Self::SessionExpired,
            Some(_) => Self::Unknown,
            None if err.is_connection() => Self::ConnectionInterrupted,
            None => Self::Unknown,
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::DomainNotAuthorized => {
                "Este domínio não está autorizado para login. Acesse o site pelo endereço oficial e tente novamente."
            }
            Self::ConnectionInterrupted => {
                "A conexão foi interrompida durante o login. Verifique sua internet e tente novamente."
            }
            Self::SessionExpired => "Sua sessão de login expirou. Por favor, faça login novamente.",
            Self::Timeout => "O login demorou demais para ser concluído. Por favor, tente novamente.",
            Self::Unknown => "Não foi possível concluir o login. Por favor, tente novamente.",
        }
    }
}

/// A classified login failure, with the underlying error when there is one.
#[derive(Debug, thiserror::Error)]
#[error("Login failed: {kind}")]
pub struct LoginError {
    kind: LoginErrorKind,
    #[source]
    source: Option<Error>,
}

impl LoginError {
    pub(crate) fn new(kind: LoginErrorKind, source: Option<Error>) -> Self {
        Self { kind, source }
    }

    #[must_use]
    pub fn kind(&self) -> LoginErrorKind {
        self.kind
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl From<Error> for LoginError {
    fn from(e: Error) -> Self {
        Self::new(LoginErrorKind::classify(&e), Some(e))
    }
}

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend-issued user identifier (opaque string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One-time code handed back by the identity provider in the callback fragment.
///
/// Single use: the backend exchanges it for a durable session exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into)]
pub struct SessionCode(pub String);

impl SessionCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Role tag attached to a user (`"lider"`, `"avaliador"`, ...).
///
/// Tags are the only source of authorization truth. Unknown tags are kept
/// as-is and simply carry no hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct Tag(pub String);

impl Tag {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

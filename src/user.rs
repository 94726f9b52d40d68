use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Tag, UserId};

/// Authenticated user as returned by the backend.
///
/// Replaced wholesale on every resume or session exchange; never patched
/// locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    #[serde(alias = "user_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    /// Role tags, with set semantics (order and duplicates are irrelevant).
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    /// Whether the user may use contribution features such as uploads.
    #[serde(default)]
    pub approved: bool,
    #[serde(default, alias = "isVip")]
    pub is_vip: bool,
}

impl User {
    /// Create a user with only the required `id`.
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: None,
            picture: None,
            tags: BTreeSet::new(),
            approved: false,
            is_vip: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    #[must_use]
    pub fn with_vip(mut self, is_vip: bool) -> Self {
        self.is_vip = is_vip;
        self
    }

    /// Direct tag membership, bypassing the hierarchy.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }
}

/// Session-creation response: the user record plus an optional bearer token.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct SessionGrant {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl SessionGrant {
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            user,
            session_token: None,
        }
    }

    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

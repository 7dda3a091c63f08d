//! Caller authentication against an external session authority.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;

/// Whatever the transport carries that identifies the caller's session.
///
/// Values are opaque to this crate; they are handed to the authority as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredentials {
    pub cookie: Option<String>,
    pub authorization: Option<String>,
}

impl SessionCredentials {
    pub fn from_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie: Some(cookie.into()),
            authorization: None,
        }
    }

    /// No credentials at all, so there is nothing to ask the authority about.
    pub fn is_empty(&self) -> bool {
        self.cookie.as_deref().map_or(true, str::is_empty)
            && self.authorization.as_deref().map_or(true, str::is_empty)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A session as reported by the authority.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Sessions without an expiry are active until the authority says otherwise.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |expires| expires > now)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session authority unavailable: {0}")]
    Unavailable(String),

    #[error("malformed session response: {0}")]
    Malformed(String),
}

/// Resolves transport credentials to a session.
///
/// `Ok(None)` is "no valid session". `Err` is "could not find out".
pub trait SessionAuthority: Send + Sync {
    fn resolve(
        &self,
        credentials: &SessionCredentials,
    ) -> impl Future<Output = Result<Option<Session>, SessionError>> + Send;
}

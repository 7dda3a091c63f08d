//! Nullable session authority: deterministic caller authentication.

use chrono::{DateTime, Utc};
use proshow_verification::{Session, SessionAuthority, SessionCredentials, SessionError};
use proshow_verification::session::SessionUser;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Mode {
    /// Accept exactly these cookie headers.
    Tokens(HashSet<String>),
    AcceptAll,
    Unavailable,
}

/// A session authority whose answers are fixed up front.
pub struct NullSessionAuthority {
    mode: Mode,
    expires: Option<DateTime<Utc>>,
    calls: AtomicUsize,
}

impl NullSessionAuthority {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            expires: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Accepts a request whose cookie header equals one of `cookies`.
    pub fn accepting(cookies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_mode(Mode::Tokens(cookies.into_iter().map(Into::into).collect()))
    }

    pub fn accept_all() -> Self {
        Self::with_mode(Mode::AcceptAll)
    }

    pub fn reject_all() -> Self {
        Self::with_mode(Mode::Tokens(HashSet::new()))
    }

    /// Every resolution fails as if the authority could not be reached.
    pub fn unavailable() -> Self {
        Self::with_mode(Mode::Unavailable)
    }

    /// Sessions handed out carry this expiry.
    pub fn with_expiry(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn session(&self) -> Session {
        Session {
            user: SessionUser {
                email: Some("organizer@advitya.test".to_string()),
                name: Some("Organizer".to_string()),
            },
            expires: self.expires,
        }
    }
}

impl SessionAuthority for NullSessionAuthority {
    async fn resolve(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<Option<Session>, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            Mode::Unavailable => Err(SessionError::Unavailable(
                "null authority set unavailable".to_string(),
            )),
            Mode::AcceptAll => Ok(Some(self.session())),
            Mode::Tokens(tokens) => Ok(credentials
                .cookie
                .as_ref()
                .filter(|c| tokens.contains(*c))
                .map(|_| self.session())),
        }
    }
}

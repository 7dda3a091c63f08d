//! The verification service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use proshow_crypto::{KdfParams, SharedSecret};
use proshow_store::{ParticipantStore, StoreError};
use proshow_types::Participant;

use crate::{
    MultiMatchPolicy, SessionAuthority, SessionCredentials, SessionError, VerificationError,
    VerificationOutcome, VerificationRequest,
};

/// Enough candidates to tell "one match" from "more than one".
const CANDIDATE_LIMIT: usize = 2;

/// Tunables for [`VerificationService`].
#[derive(Clone, Debug)]
pub struct VerificationSettings {
    pub kdf: KdfParams,
    pub multi_match: MultiMatchPolicy,
    pub query_timeout: Duration,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            multi_match: MultiMatchPolicy::default(),
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Stateless apart from shared read-only handles; one instance serves every
/// request concurrently.
pub struct VerificationService<S, A> {
    store: Arc<S>,
    sessions: Arc<A>,
    secret: Arc<SharedSecret>,
    settings: VerificationSettings,
}

impl<S, A> VerificationService<S, A>
where
    S: ParticipantStore,
    A: SessionAuthority,
{
    pub fn new(
        store: Arc<S>,
        sessions: Arc<A>,
        secret: SharedSecret,
        settings: VerificationSettings,
    ) -> Self {
        Self {
            store,
            sessions,
            secret: Arc::new(secret),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn settings(&self) -> &VerificationSettings {
        &self.settings
    }

    /// Authenticate, validate, look up, seal.
    pub async fn verify(
        &self,
        credentials: &SessionCredentials,
        request: VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.authenticate(credentials).await?;
        let filter = request.into_filter()?;

        let candidates = tokio::time::timeout(
            self.settings.query_timeout,
            self.store.find_matching(&filter, CANDIDATE_LIMIT),
        )
        .await
        .map_err(|_| StoreError::Timeout(self.settings.query_timeout.as_millis() as u64))??;

        let participant = match self.select(candidates, &filter.event.raw)? {
            Some(p) => p,
            None => {
                debug!(email = %filter.email, event_id = %filter.event.raw, "no matching participant");
                return Ok(VerificationOutcome::NotFound);
            }
        };

        let payload = self.seal(&participant).await?;
        debug!(event_id = %participant.event_id, "participant verified");
        Ok(VerificationOutcome::Found { payload })
    }

    /// Resolve the caller's session. Exposed so a transport can reject an
    /// unauthenticated caller before it even looks at the body.
    pub async fn authenticate(
        &self,
        credentials: &SessionCredentials,
    ) -> Result<(), VerificationError> {
        if credentials.is_empty() {
            return Err(VerificationError::Unauthenticated);
        }
        match self.sessions.resolve(credentials).await {
            Ok(Some(session)) if session.is_active(Utc::now()) => Ok(()),
            Ok(_) => Err(VerificationError::Unauthenticated),
            Err(SessionError::Unavailable(e)) => Err(VerificationError::Internal(format!(
                "session authority unavailable: {e}"
            ))),
            Err(SessionError::Malformed(e)) => Err(VerificationError::Internal(format!(
                "malformed session response: {e}"
            ))),
        }
    }

    /// Apply the multi-match policy to candidates ordered oldest first.
    fn select(
        &self,
        mut candidates: Vec<Participant>,
        event_id: &str,
    ) -> Result<Option<Participant>, VerificationError> {
        if candidates.len() > 1 {
            match self.settings.multi_match {
                MultiMatchPolicy::Earliest => {
                    warn!(
                        event_id,
                        candidates = candidates.len(),
                        "duplicate participant records; using the earliest"
                    );
                }
                MultiMatchPolicy::Reject => {
                    return Err(VerificationError::Internal(format!(
                        "duplicate participant records for event {event_id}"
                    )));
                }
            }
        }
        if candidates.is_empty() {
            Ok(None)
        } else {
            Ok(Some(candidates.swap_remove(0)))
        }
    }

    /// Argon2 is deliberately slow, so sealing runs off the async workers.
    async fn seal(&self, participant: &Participant) -> Result<String, VerificationError> {
        let json = participant.to_canonical_json()?;
        let secret = Arc::clone(&self.secret);
        let kdf = self.settings.kdf;
        let sealed = tokio::task::spawn_blocking(move || {
            proshow_crypto::seal(json.as_bytes(), &secret, kdf)
        })
        .await
        .map_err(|e| VerificationError::Internal(format!("sealing task failed: {e}")))??;
        Ok(sealed)
    }
}

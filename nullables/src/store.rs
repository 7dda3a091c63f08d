//! Nullable store: thread-safe in-memory participant storage for testing.

use chrono::{DateTime, Utc};
use proshow_store::{ParticipantFilter, ParticipantStore, StoreError};
use proshow_types::{Attendance, EventRef, Participant};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a participant with placeholder registration and contact numbers.
pub fn participant(name: &str, email: &str, event_id: impl Into<EventRef>) -> Participant {
    Participant {
        id: None,
        name: name.to_string(),
        registration_number: format!("REG-{name}"),
        contact_number: "0000000000".to_string(),
        email: email.to_string(),
        event_id: event_id.into(),
        attendance: Attendance::default(),
        created_at: DateTime::<Utc>::default(),
    }
}

/// An in-memory participant store.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullParticipantStore {
    participants: Mutex<Vec<Participant>>,
    find_calls: AtomicUsize,
    ping_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl NullParticipantStore {
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(Vec::new()),
            find_calls: AtomicUsize::new(0),
            ping_calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let store = Self::new();
        for p in participants {
            store.insert(p);
        }
        store
    }

    /// Insert without any uniqueness check, so tests can break the email
    /// invariant on purpose.
    pub fn insert(&self, participant: Participant) {
        self.participants.lock().unwrap().push(participant);
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `find_matching` calls so far.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn ping_calls(&self) -> usize {
        self.ping_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("null store set unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullParticipantStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantStore for NullParticipantStore {
    async fn find_matching(
        &self,
        filter: &ParticipantFilter,
        limit: usize,
    ) -> Result<Vec<Participant>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut matches: Vec<Participant> = self
            .participants
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matches.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }
}

//! Participant storage trait.

use std::future::Future;

use proshow_types::Participant;

use crate::{ParticipantFilter, StoreError};

/// Read access to participant records.
///
/// Futures are `Send` so implementations can be driven from a
/// multithreaded HTTP server.
pub trait ParticipantStore: Send + Sync {
    /// Up to `limit` records satisfying `filter`, ordered by `createdAt`
    /// ascending, then `_id` ascending.
    fn find_matching(
        &self,
        filter: &ParticipantFilter,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Participant>, StoreError>> + Send;

    /// Cheap liveness check.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

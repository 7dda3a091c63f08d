//! Abstract participant storage.
//!
//! Every storage backend (MongoDB, in-memory for testing) implements
//! [`ParticipantStore`]. The verification service depends only on the trait.

pub mod error;
pub mod filter;
pub mod participant;

pub use error::StoreError;
pub use filter::{EventMatch, ParticipantFilter};
pub use participant::ParticipantStore;

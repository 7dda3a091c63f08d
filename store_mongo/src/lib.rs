//! MongoDB storage backend.
//!
//! Implements [`proshow_store::ParticipantStore`] on top of the official
//! driver. The client is created on first use and shared by every request
//! afterwards.

pub mod codec;
pub mod config;
pub mod error;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoStoreError;
pub use store::MongoParticipantStore;

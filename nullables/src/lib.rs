//! Nullable infrastructure for deterministic testing.
//!
//! The external collaborators of the verification service (participant store,
//! session authority) are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (including failure modes)
//! - Count calls, so tests can assert a collaborator was never reached
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod session;
pub mod store;

pub use session::NullSessionAuthority;
pub use store::{participant, NullParticipantStore};

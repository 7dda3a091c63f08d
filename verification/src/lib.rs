//! Participant verification.
//!
//! A caller with a valid session claims an identity (email + event id). The
//! service looks the claim up in the participant store, accepting either
//! encoding of the stored event reference, and answers with either a negative
//! result or the matched record sealed under the pre-shared secret.
//!
//! Session resolution and input validation both happen before the store is
//! touched.

pub mod error;
pub mod outcomes;
pub mod policy;
pub mod request;
pub mod service;
pub mod session;

pub use error::VerificationError;
pub use outcomes::VerificationOutcome;
pub use policy::MultiMatchPolicy;
pub use request::VerificationRequest;
pub use service::{VerificationService, VerificationSettings};
pub use session::{Session, SessionAuthority, SessionCredentials, SessionError};

//! Fundamental types for the proshow participant verification service.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the participant record, document identifiers, event references, normalized
//! emails, and attendance status.

pub mod attendance;
pub mod document_id;
pub mod email;
pub mod error;
pub mod event;
pub mod participant;

pub use attendance::Attendance;
pub use document_id::DocumentId;
pub use email::NormalizedEmail;
pub use error::TypesError;
pub use event::EventRef;
pub use participant::Participant;

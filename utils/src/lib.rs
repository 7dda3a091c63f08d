//! Shared utilities for the proshow service.

pub mod correlation;
pub mod logging;

pub use correlation::CorrelationId;
pub use logging::{init_logging, LogFormat};

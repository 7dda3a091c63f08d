//! Result of a verification call that got as far as the store.

/// A negative result is an outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No participant matches the claimed email and event.
    NotFound,
    /// The matched record, serialized and sealed.
    Found { payload: String },
}

impl VerificationOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Found { .. } => "found",
        }
    }
}

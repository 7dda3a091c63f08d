//! What to do when more than one record matches a claim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emails are unique by contract, but nothing in the lookup path enforces
/// it. This picks the behaviour when the contract is broken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiMatchPolicy {
    /// Use the record with the earliest `createdAt` (then lowest `_id`).
    #[default]
    Earliest,
    /// Treat duplicates as an internal consistency error.
    Reject,
}

impl FromStr for MultiMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "earliest" => Ok(Self::Earliest),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown multi-match policy {other:?} (expected earliest or reject)"
            )),
        }
    }
}

impl fmt::Display for MultiMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Earliest => "earliest",
            Self::Reject => "reject",
        })
    }
}

//! Attendance status of a participant.

use serde::{Serialize, Serializer};
use std::fmt;

/// Attendance recorded against a participant. Defaults to `absent`.
///
/// Values written by other tools that this service does not know about are
/// kept verbatim so a read never fails on them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Attendance {
    #[default]
    Absent,
    Present,
    Other(String),
}

impl Attendance {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for Attendance {
    fn from(s: &str) -> Self {
        match s {
            "absent" => Self::Absent,
            "present" => Self::Present,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Attendance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

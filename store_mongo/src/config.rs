//! Connection settings for the MongoDB backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string.
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Bound on connection establishment and server selection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Create the unique `email` index at startup.
    #[serde(default)]
    pub ensure_indexes: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "event_database".to_string()
}

fn default_collection() -> String {
    proshow_types::Participant::COLLECTION.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl MongoConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            collection: default_collection(),
            connect_timeout_ms: default_connect_timeout_ms(),
            ensure_indexes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: MongoConfig = toml::from_str("").unwrap();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "event_database");
        assert_eq!(config.collection, "participants");
        assert!(!config.ensure_indexes);
    }

    #[test]
    fn partial_table_overrides() {
        let config: MongoConfig = toml::from_str(
            r#"
            database = "advitya"
            connect_timeout_ms = 250
        "#,
        )
        .unwrap();
        assert_eq!(config.database, "advitya");
        assert_eq!(config.connect_timeout(), Duration::from_millis(250));
        assert_eq!(config.collection, "participants");
    }
}

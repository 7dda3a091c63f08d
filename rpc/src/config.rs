//! Server configuration with TOML file support and environment overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use proshow_crypto::{KdfParams, SharedSecret};
use proshow_store_mongo::MongoConfig;
use proshow_utils::LogFormat;
use proshow_verification::{MultiMatchPolicy, VerificationSettings};

use crate::RpcError;

const REDACTED: &str = "<redacted>";

/// Whether a missing encryption secret is tolerated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "unknown mode {other:?} (expected development or production)"
            )),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

/// Where caller sessions are resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_session_timeout_ms")]
    pub timeout_ms: u64,
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_session_endpoint(),
            timeout_ms: default_session_timeout_ms(),
        }
    }
}

/// Configuration for the verification server.
///
/// Can be loaded from a TOML file via [`ServerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Environment variables are layered
/// on top with [`ServerConfig::apply_env`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub mode: RunMode,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Filter directive, e.g. "info" or "debug,proshow_verification=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pre-shared secret the dashboard uses to open payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_secret: Option<String>,

    #[serde(default = "default_kdf_memory_kib")]
    pub kdf_memory_kib: u32,

    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u8,

    #[serde(default)]
    pub multi_match_policy: MultiMatchPolicy,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default)]
    pub store: MongoConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_kdf_memory_kib() -> u32 {
    KdfParams::default().memory_kib
}

fn default_kdf_iterations() -> u32 {
    KdfParams::default().iterations
}

fn default_kdf_parallelism() -> u8 {
    KdfParams::default().parallelism
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

fn default_session_endpoint() -> String {
    "http://127.0.0.1:3000/api/auth/session".to_string()
}

fn default_session_timeout_ms() -> u64 {
    3_000
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, RpcError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RpcError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, RpcError> {
        toml::from_str(s).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, RpcError> {
        toml::to_string_pretty(self).map_err(|e| RpcError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), RpcError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), RpcError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("MONGO_URI") {
            self.store.uri = uri;
        }
        if let Some(database) = lookup("DB_NAME") {
            self.store.database = database;
        }
        if let Some(collection) = lookup("PARTICIPANTS_COLLECTION") {
            self.store.collection = collection;
        }
        if let Some(secret) = lookup("ENCRYPTION_SECRET") {
            self.encryption_secret = Some(secret);
        }
        if let Some(endpoint) = lookup("SESSION_ENDPOINT") {
            self.session.endpoint = endpoint;
        }
        if let Some(mode) = lookup("PROSHOW_MODE") {
            self.mode = mode.parse().map_err(RpcError::Config)?;
        }
        if let Some(port) = lookup("PROSHOW_PORT") {
            self.port = port
                .parse()
                .map_err(|e| RpcError::Config(format!("PROSHOW_PORT {port:?}: {e}")))?;
        }
        Ok(())
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), RpcError> {
        if self.mode == RunMode::Production && self.configured_secret().is_none() {
            return Err(RpcError::Config(
                "ENCRYPTION_SECRET must be set in production mode".to_string(),
            ));
        }
        self.kdf_params().validate()?;
        if self.query_timeout_ms == 0 {
            return Err(RpcError::Config("query_timeout_ms must be positive".to_string()));
        }
        if self.store.uri.trim().is_empty() {
            return Err(RpcError::Config("store uri must not be empty".to_string()));
        }
        if self.store.database.is_empty() || self.store.collection.is_empty() {
            return Err(RpcError::Config(
                "store database and collection must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::new(self.kdf_memory_kib, self.kdf_iterations, self.kdf_parallelism)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn verification_settings(&self) -> VerificationSettings {
        VerificationSettings {
            kdf: self.kdf_params(),
            multi_match: self.multi_match_policy,
            query_timeout: self.query_timeout(),
        }
    }

    /// The configured secret, or in development mode a fresh random one.
    pub fn shared_secret(&self) -> Result<SharedSecret, RpcError> {
        match (self.configured_secret(), self.mode) {
            (Some(secret), _) => Ok(SharedSecret::try_from(secret)?),
            (None, RunMode::Development) => {
                tracing::warn!(
                    "ENCRYPTION_SECRET is not set; using an ephemeral secret. \
                     Payloads sealed now cannot be opened after a restart"
                );
                Ok(SharedSecret::generate_ephemeral())
            }
            (None, RunMode::Production) => Err(RpcError::Config(
                "ENCRYPTION_SECRET must be set in production mode".to_string(),
            )),
        }
    }

    /// Copy safe to print: the secret is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.encryption_secret.is_some() {
            copy.encryption_secret = Some(REDACTED.to_string());
        }
        copy
    }

    fn configured_secret(&self) -> Option<&str> {
        self.encryption_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            bind_address: default_bind_address(),
            port: default_port(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            encryption_secret: None,
            kdf_memory_kib: default_kdf_memory_kib(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            multi_match_policy: MultiMatchPolicy::default(),
            query_timeout_ms: default_query_timeout_ms(),
            store: MongoConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServerConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ServerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.port, config.port);
        assert_eq!(parsed.store.database, config.store.database);
        assert_eq!(parsed.session.endpoint, config.session.endpoint);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.mode, RunMode::Development);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.multi_match_policy, MultiMatchPolicy::Earliest);
        assert_eq!(config.query_timeout_ms, 5_000);
        assert_eq!(config.store.uri, "mongodb://localhost:27017");
        assert_eq!(config.store.database, "event_database");
        assert_eq!(config.store.collection, "participants");
        assert_eq!(config.session.timeout_ms, 3_000);
        assert!(config.encryption_secret.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            mode = "production"
            port = 8080
            log_format = "json"
            multi_match_policy = "reject"

            [store]
            database = "advitya"

            [session]
            endpoint = "http://auth.internal/api/auth/session"
        "#;
        let config = ServerConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.multi_match_policy, MultiMatchPolicy::Reject);
        assert_eq!(config.store.database, "advitya");
        assert_eq!(config.store.collection, "participants"); // default
        assert_eq!(config.session.endpoint, "http://auth.internal/api/auth/session");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000\nencryption_secret = \"k\"").unwrap();
        let config = ServerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.encryption_secret.as_deref(), Some("k"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::from_toml_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RpcError::Config(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ServerConfig::from_toml_str("port = 4000").unwrap();
        config
            .apply_env_from(env(&[
                ("MONGO_URI", "mongodb://db:27017"),
                ("DB_NAME", "advitya"),
                ("PARTICIPANTS_COLLECTION", "proshow"),
                ("ENCRYPTION_SECRET", "s3cret"),
                ("SESSION_ENDPOINT", "http://auth/api/auth/session"),
                ("PROSHOW_MODE", "production"),
                ("PROSHOW_PORT", "5000"),
            ]))
            .unwrap();
        assert_eq!(config.store.uri, "mongodb://db:27017");
        assert_eq!(config.store.database, "advitya");
        assert_eq!(config.store.collection, "proshow");
        assert_eq!(config.encryption_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.session.endpoint, "http://auth/api/auth/session");
        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn bad_env_values_rejected() {
        let mut config = ServerConfig::default();
        assert!(config.apply_env_from(env(&[("PROSHOW_PORT", "http")])).is_err());
        assert!(config.apply_env_from(env(&[("PROSHOW_MODE", "staging")])).is_err());
    }

    #[test]
    fn production_requires_secret() {
        let mut config = ServerConfig {
            mode: RunMode::Production,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.shared_secret().is_err());

        config.encryption_secret = Some("   ".into());
        assert!(config.validate().is_err());

        config.encryption_secret = Some("s3cret".into());
        assert!(config.validate().is_ok());
        assert_eq!(config.shared_secret().unwrap().expose(), b"s3cret");
    }

    #[test]
    fn development_generates_ephemeral_secret() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        let a = config.shared_secret().unwrap();
        let b = config.shared_secret().unwrap();
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn invalid_kdf_rejected() {
        let config = ServerConfig {
            kdf_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn redaction_masks_secret() {
        let config = ServerConfig {
            encryption_secret: Some("s3cret".into()),
            ..Default::default()
        };
        let printed = config.redacted().to_toml_string().unwrap();
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains(REDACTED));
        assert_eq!(config.encryption_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn settings_follow_config() {
        let config = ServerConfig {
            query_timeout_ms: 250,
            multi_match_policy: MultiMatchPolicy::Reject,
            ..Default::default()
        };
        let settings = config.verification_settings();
        assert_eq!(settings.query_timeout, Duration::from_millis(250));
        assert_eq!(settings.multi_match, MultiMatchPolicy::Reject);
        assert_eq!(settings.kdf, KdfParams::default());
    }
}

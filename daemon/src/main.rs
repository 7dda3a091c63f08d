//! Proshow daemon: entry point for the participant verification server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use proshow_crypto::SharedSecret;
use proshow_rpc::{
    router, AppState, HttpSessionAuthority, RpcServer, RunMode, ServerConfig, ServiceMetrics,
    ShutdownController,
};
use proshow_store_mongo::MongoParticipantStore;
use proshow_utils::LogFormat;
use proshow_verification::{MultiMatchPolicy, VerificationService};

#[derive(Parser)]
#[command(
    name = "proshow-daemon",
    about = "Participant verification server for the proshow dashboard"
)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// environment variables and then CLI flags override them.
    #[arg(long, env = "PROSHOW_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// "development" or "production".
    #[arg(long, global = true)]
    mode: Option<RunMode>,

    /// Log format: "human" or "json".
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Log level filter, e.g. "info" or "debug,proshow_verification=trace".
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP server until SIGINT/SIGTERM.
    Serve {
        /// Address to bind.
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,

        /// What to do when several records match: "earliest" or "reject".
        #[arg(long)]
        multi_match: Option<MultiMatchPolicy>,

        /// Create the unique email index before serving.
        #[arg(long)]
        ensure_indexes: bool,
    },

    /// Open a sealed payload with the configured secret and print the record.
    Decrypt {
        /// Base64 payload as returned in the `data` field.
        payload: String,
    },

    /// Validate the effective configuration and print it, secret redacted.
    CheckConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env().context("applying environment overrides")?;

    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Command::Serve {
        bind,
        port,
        multi_match,
        ensure_indexes,
    } = &cli.command
    {
        if let Some(bind) = bind {
            config.bind_address = bind.clone();
        }
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(policy) = multi_match {
            config.multi_match_policy = *policy;
        }
        config.store.ensure_indexes |= *ensure_indexes;
    }
    Ok(config)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let secret = config.shared_secret()?;

    tracing::info!(
        mode = %config.mode,
        database = %config.store.database,
        collection = %config.store.collection,
        multi_match = %config.multi_match_policy,
        "starting proshow verification server"
    );

    let store = Arc::new(MongoParticipantStore::new(
        config.store.clone(),
        config.query_timeout(),
    ));
    if config.store.ensure_indexes {
        store
            .ensure_indexes()
            .await
            .context("creating participant indexes")?;
    }
    let sessions = Arc::new(HttpSessionAuthority::new(&config.session)?);
    tracing::info!(endpoint = sessions.endpoint(), "session authority configured");

    let service = VerificationService::new(
        store,
        sessions,
        secret,
        config.verification_settings(),
    );
    let app = router(AppState::new(service, ServiceMetrics::new()?));

    let server = RpcServer::bind(&config.bind_addr()).await?;
    let shutdown = Arc::new(ShutdownController::new());
    let signal = shutdown.signalled();
    let watcher = Arc::clone(&shutdown);
    tokio::spawn(async move { watcher.wait_for_signal().await });

    server.serve(app, signal).await?;
    tracing::info!("proshow daemon exited cleanly");
    Ok(())
}

fn decrypt(config: &ServerConfig, payload: &str) -> anyhow::Result<()> {
    let Some(secret) = config.encryption_secret.as_deref() else {
        bail!("ENCRYPTION_SECRET is not configured; nothing can be decrypted");
    };
    let secret = SharedSecret::try_from(secret)?;
    let record = proshow_crypto::open_to_string(payload.trim(), &secret)
        .context("payload could not be opened with the configured secret")?;
    println!("{record}");
    Ok(())
}

fn check_config(config: &ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    print!("{}", config.redacted().to_toml_string()?);
    if config.mode == RunMode::Development && config.encryption_secret.is_none() {
        eprintln!("warning: no ENCRYPTION_SECRET; serve would use an ephemeral secret");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    proshow_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Serve { .. } => serve(config).await,
        Command::Decrypt { payload } => decrypt(&config, &payload),
        Command::CheckConfig => check_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cli = Cli::parse_from([
            "proshow-daemon",
            "--mode",
            "production",
            "--log-format",
            "json",
            "serve",
            "--port",
            "8080",
            "--multi-match",
            "reject",
            "--ensure-indexes",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.mode, RunMode::Production);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.port, 8080);
        assert_eq!(config.multi_match_policy, MultiMatchPolicy::Reject);
        assert!(config.store.ensure_indexes);
    }

    #[test]
    fn decrypt_requires_configured_secret() {
        let config = ServerConfig::default();
        assert!(decrypt(&config, "AAAA").is_err());
    }

    #[test]
    fn decrypt_opens_sealed_payload() {
        let secret = SharedSecret::try_from("k").unwrap();
        let payload = proshow_crypto::seal(
            br#"{"name":"Jane"}"#,
            &secret,
            proshow_crypto::KdfParams::new(256, 1, 1),
        )
        .unwrap();
        let config = ServerConfig {
            encryption_secret: Some("k".into()),
            ..Default::default()
        };
        assert!(decrypt(&config, &payload).is_ok());
    }
}

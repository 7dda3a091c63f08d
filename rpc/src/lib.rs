//! HTTP server for the proshow verification service.
//!
//! Provides endpoints for:
//! - Participant verification (`POST /api/advitya-proshow`)
//! - Store health (`GET /health`)
//! - Prometheus metrics (`GET /metrics`)
//!
//! Also hosts the server configuration and the HTTP-backed session authority,
//! since both only exist to run this server.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;
pub mod session;
pub mod shutdown;

pub use config::{RunMode, ServerConfig, SessionConfig};
pub use error::RpcError;
pub use handlers::AppState;
pub use metrics::ServiceMetrics;
pub use server::{router, RpcServer, VERIFY_PATH};
pub use session::HttpSessionAuthority;
pub use shutdown::ShutdownController;

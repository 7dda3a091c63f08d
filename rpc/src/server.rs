//! Axum-based HTTP server.

use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use proshow_store::ParticipantStore;
use proshow_verification::SessionAuthority;

use crate::error::internal_error_response;
use crate::handlers::{self, AppState};
use crate::RpcError;

/// Where the dashboard posts verification requests.
pub const VERIFY_PATH: &str = "/api/advitya-proshow";

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    internal_error_response(&format!("handler panicked: {detail}"))
}

/// Build the router with every endpoint and the tracing and panic layers.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
    S: ParticipantStore + 'static,
    A: SessionAuthority + 'static,
{
    // A panic unwinds past the handler's own bookkeeping, so the verify
    // route counts it here.
    let metrics = Arc::clone(&state.metrics);
    let count_panic = move |err: Box<dyn Any + Send + 'static>| {
        metrics.record_unfinished("internal");
        panic_response(err)
    };

    Router::new()
        .route(
            VERIFY_PATH,
            post(handlers::verify::<S, A>)
                .fallback(handlers::method_not_allowed)
                .layer(CatchPanicLayer::custom(count_panic)),
        )
        .route("/health", get(handlers::health::<S, A>))
        .route("/metrics", get(handlers::metrics::<S, A>))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound listener waiting to serve a router.
pub struct RpcServer {
    listener: TcpListener,
}

impl RpcServer {
    pub async fn bind(addr: &str) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` completes, then drain in-flight requests.
    pub async fn serve<F>(self, router: Router, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "verification server listening");
        }
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("verification server stopped");
        Ok(())
    }
}

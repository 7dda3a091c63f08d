//! HTTP request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use proshow_store::ParticipantStore;
use proshow_verification::{
    SessionAuthority, SessionCredentials, VerificationOutcome, VerificationRequest,
    VerificationService,
};

use crate::{RpcError, ServiceMetrics};

pub const NOT_FOUND_MESSAGE: &str = "Participant not found for the given email and event ID.";

/// Shared, read-only state handed to every handler.
pub struct AppState<S, A> {
    pub service: Arc<VerificationService<S, A>>,
    pub metrics: Arc<ServiceMetrics>,
}

impl<S, A> AppState<S, A> {
    pub fn new(service: VerificationService<S, A>, metrics: ServiceMetrics) -> Self {
        Self {
            service: Arc::new(service),
            metrics: Arc::new(metrics),
        }
    }
}

// Derived Clone would demand S: Clone and A: Clone.
impl<S, A> Clone for AppState<S, A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct VerifyResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

fn outcome_response(outcome: VerificationOutcome) -> Response {
    match outcome {
        VerificationOutcome::Found { payload } => (
            StatusCode::OK,
            Json(VerifyResponse {
                exists: true,
                data: Some(payload),
                message: None,
            }),
        )
            .into_response(),
        VerificationOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            Json(VerifyResponse {
                exists: false,
                data: None,
                message: Some(NOT_FOUND_MESSAGE),
            }),
        )
            .into_response(),
    }
}

fn header_string(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Clients may split cookies over several headers; they are folded back
/// into one `; `-separated list.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

pub fn credentials_from_headers(headers: &HeaderMap) -> SessionCredentials {
    SessionCredentials {
        cookie: cookie_header(headers),
        authorization: header_string(headers, AUTHORIZATION),
    }
}

pub async fn verify<S, A>(
    State(state): State<AppState<S, A>>,
    headers: HeaderMap,
    body: Result<Json<VerificationRequest>, JsonRejection>,
) -> Response
where
    S: ParticipantStore + 'static,
    A: SessionAuthority + 'static,
{
    let started = Instant::now();
    let credentials = credentials_from_headers(&headers);

    let result = handle_verify(&state, &credentials, body).await;
    let outcome = match &result {
        Ok(outcome) => outcome.kind(),
        Err(e) => e.kind(),
    };
    state.metrics.record(outcome, started.elapsed());

    match result {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => e.into_response(),
    }
}

async fn handle_verify<S, A>(
    state: &AppState<S, A>,
    credentials: &SessionCredentials,
    body: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<VerificationOutcome, RpcError>
where
    S: ParticipantStore,
    A: SessionAuthority,
{
    match body {
        Ok(Json(request)) => Ok(state.service.verify(credentials, request).await?),
        Err(rejection) => {
            // An anonymous caller learns nothing about body handling.
            state.service.authenticate(credentials).await?;
            Err(RpcError::MalformedBody(rejection.body_text()))
        }
    }
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method Not Allowed" })),
    )
        .into_response()
}

// ── Operations ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

pub async fn health<S, A>(State(state): State<AppState<S, A>>) -> Response
where
    S: ParticipantStore + 'static,
    A: SessionAuthority + 'static,
{
    match state.service.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "up",
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    store: "down",
                }),
            )
                .into_response()
        }
    }
}

pub async fn metrics<S, A>(State(state): State<AppState<S, A>>) -> Result<Response, RpcError> {
    let body = state.metrics.encode()?;
    Ok((
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

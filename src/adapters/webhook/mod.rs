//! Webhook Ingress
//!
//! HTTP endpoint the fee platform pushes creator-fee events to. Events land
//! in the shared [`QueueFeeSource`]; an optional shared secret in the
//! `x-webhook-secret` header gates writes.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::fee_source::QueueFeeSource;
use crate::domain::fee::FeeEvent;

/// Header carrying the shared secret
pub const SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub port: u16,
    pub secret: Option<String>,
}

#[derive(Clone)]
struct WebhookState {
    fee_source: QueueFeeSource,
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeePayload {
    /// Lamports as a string, so large amounts survive JSON number handling
    amount: String,
    mint: String,
    timestamp: u64,
    signature: Option<String>,
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct FeeAccepted {
    success: bool,
    timestamp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Build the ingress router over a shared fee queue
pub fn router(fee_source: QueueFeeSource, secret: Option<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/fees", post(receive_fees))
        .with_state(WebhookState { fee_source, secret })
}

/// Bind and serve the ingress until the process shuts down
pub async fn serve(settings: WebhookSettings, fee_source: QueueFeeSource) -> std::io::Result<()> {
    let app = router(fee_source, settings.secret);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!(port = settings.port, "webhook ingress listening");
    axum::serve(listener, app).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "timestamp": unix_now() }))
}

async fn receive_fees(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(payload): Json<FeePayload>,
) -> Response {
    if let Some(expected) = &state.secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            tracing::warn!("webhook request with missing or invalid secret");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response();
        }
    }

    let amount = match payload.amount.parse::<u64>() {
        Ok(amount) => amount,
        Err(_) => {
            tracing::warn!(amount = %payload.amount, "webhook payload with invalid amount");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid amount" })),
            )
                .into_response();
        }
    };

    state.fee_source.push(FeeEvent {
        amount,
        mint: payload.mint,
        timestamp: payload.timestamp,
        signature: payload.signature,
        metadata: payload.metadata,
    });

    Json(FeeAccepted {
        success: true,
        timestamp: unix_now(),
    })
    .into_response()
}

//! Scheduled-job routes

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SweepResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

pub fn create_cron_router(state: AppState) -> Router {
    Router::new()
        .route("/api/cron/followup", post(trigger_followup))
        .route("/api/cron/health", get(cron_health))
        .with_state(state)
}

pub(crate) fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

fn token_matches(token: &str, expected: &str) -> bool {
    token.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn verify_cron_token(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.cron_secret.as_deref() else {
        error!("CRON_SECRET_TOKEN not configured");
        return Err(ApiError::Misconfigured);
    };

    match bearer_token(headers) {
        Some(token) if token_matches(token, expected) => Ok(()),
        _ => {
            warn!("Unauthorized cron request attempt");
            Err(ApiError::Forbidden)
        }
    }
}

/// POST /api/cron/followup
async fn trigger_followup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SweepResponse>> {
    verify_cron_token(&state, &headers)?;

    let source = headers
        .get("x-cron-source")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    info!(source, "Follow-up cron job triggered");

    let count = state.followup.run_sweep().await?;

    Ok(Json(SweepResponse {
        success: true,
        message: "Follow-up reminders processed".to_string(),
        count,
        timestamp: iso_now(),
    }))
}

/// GET /api/cron/health
async fn cron_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "cron-jobs".to_string(),
        timestamp: iso_now(),
    })
}

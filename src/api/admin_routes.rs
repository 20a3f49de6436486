//! Admin panel routes
//!
//! Login, logout and check-session are open. Everything else sits behind
//! `require_admin`.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::{header, HeaderMap},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::session::{self, require_admin, AdminSession};
use super::state::AppState;
use crate::error::InquiryError;
use crate::models::{DashboardStats, Inquiry, InquiryStatus};
use crate::services::{ListQuery, PasswordChange};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: i64,
    pub status: InquiryStatus,
}

impl From<Inquiry> for StatusResponse {
    fn from(inquiry: Inquiry) -> Self {
        Self {
            id: inquiry.id,
            status: inquiry.status,
        }
    }
}

pub fn create_admin_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/admin/change-password", post(change_password))
        .route("/api/admin/stats", get(dashboard_stats))
        .route("/api/admin/inquiries", get(list_inquiries))
        .route("/api/admin/inquiries/:id/status", patch(update_status))
        .route("/api/admin/inquiries/:id/close", patch(close_inquiry))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_admin,
        ));

    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/check-session", get(check_session))
        .merge(protected)
        .with_state(state)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let (Some(username), Some(password)) =
        (non_empty(request.username), non_empty(request.password))
    else {
        return Err(ApiError::bad_request("Username and password required"));
    };

    let Some(account) = state.auth.authenticate(&username, &password).await? else {
        info!(username = %username, "Rejected admin login");
        return Err(InquiryError::Auth("Invalid credentials".to_string()).into());
    };

    let id = state.sessions.create(&account).await;
    info!(username = %account.username, "Admin logged in");

    Ok((
        [(header::SET_COOKIE, state.sessions.cookie(&id))],
        Json(LoginResponse {
            success: true,
            username: account.username,
        }),
    ))
}

/// POST /api/admin/logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(id) = session::session_id(&headers) {
        if let Some(ended) = state.sessions.remove(&id).await {
            info!(username = %ended.username, "Admin logged out");
        }
    }

    (
        [(header::SET_COOKIE, session::clear_cookie())],
        Json(LogoutResponse { success: true }),
    )
}

/// GET /api/admin/check-session
async fn check_session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionStatus> {
    let session = match session::session_id(&headers) {
        Some(id) => state.sessions.touch(&id).await,
        None => None,
    };

    Json(SessionStatus {
        authenticated: session.is_some(),
        username: session.map(|s| s.username),
    })
}

/// POST /api/admin/change-password
async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<PasswordChange>> {
    let Json(request) = payload?;
    let (Some(current), Some(new)) = (
        non_empty(request.current_password),
        non_empty(request.new_password),
    ) else {
        return Err(ApiError::bad_request("Current and new password required"));
    };

    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let outcome = state
        .auth
        .change_password(&session.username, &current, &new)
        .await?;

    if !outcome.success {
        return Err(ApiError::BadRequest(outcome.message));
    }
    Ok(Json(outcome))
}

/// GET /api/admin/stats
async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.queries.dashboard_stats().await?))
}

/// GET /api/admin/inquiries?priority=&status=&searchId=&sort=
async fn list_inquiries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Inquiry>>> {
    Ok(Json(state.queries.list_from_query(&query).await?))
}

/// PATCH /api/admin/inquiries/:id/status
async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;

    let inquiry = state
        .inquiries
        .update_status(id, request.status.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(inquiry.into()))
}

/// PATCH /api/admin/inquiries/:id/close
async fn close_inquiry(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Path(id) = id?;
    Ok(Json(state.inquiries.close(id).await?.into()))
}

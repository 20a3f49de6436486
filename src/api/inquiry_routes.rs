//! Public submission route

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::state::AppState;
use crate::models::{Inquiry, InquiryStatus, Priority, Sentiment, Urgency};

#[derive(Debug, Deserialize)]
pub struct SubmitInquiryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitInquiryResponse {
    pub id: i64,
    pub intent: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub priority: Priority,
    pub status: InquiryStatus,
}

impl From<Inquiry> for SubmitInquiryResponse {
    fn from(inquiry: Inquiry) -> Self {
        Self {
            id: inquiry.id,
            intent: inquiry.intent,
            sentiment: inquiry.sentiment,
            urgency: inquiry.urgency,
            priority: inquiry.priority,
            status: inquiry.status,
        }
    }
}

pub fn create_inquiry_router(state: AppState) -> Router {
    Router::new()
        .route("/api/inquiry", post(submit_inquiry))
        .with_state(state)
}

/// POST /api/inquiry
async fn submit_inquiry(
    State(state): State<AppState>,
    payload: Result<Json<SubmitInquiryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitInquiryResponse>)> {
    let Json(request) = payload?;

    let inquiry = state
        .inquiries
        .submit(
            request.name.as_deref().unwrap_or_default(),
            request.email.as_deref().unwrap_or_default(),
            request.message.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(inquiry.into())))
}

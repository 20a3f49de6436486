//! REST API
//!
//! One router per surface (public, admin, cron), merged by `create_router`
//! with health, static files and the tower-http layers.

pub mod admin_routes;
pub mod cron_routes;
pub mod error;
pub mod inquiry_routes;
pub mod session;
pub mod state;

pub use admin_routes::create_admin_router;
pub use cron_routes::create_cron_router;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use inquiry_routes::create_inquiry_router;
pub use session::{AdminSession, SessionStore, SESSION_COOKIE};
pub use state::AppState;

use std::path::Path;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Full application router. Unmatched paths fall through to `static_dir`
/// when one is given.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(create_inquiry_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .merge(create_cron_router(state));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            // Credentialed CORS: origin, methods and headers are mirrored
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        ),
    )
}

/// GET /health
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": cron_routes::iso_now() }))
}

//! Inquiry Desk server
//!
//! Wires the PostgreSQL stores, Gemini classifier and SMTP notifier into the
//! axum router and serves until ctrl-c.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inquiry_desk::{
    ai::GeminiClient,
    api::{create_router, AppState},
    database::DatabaseManager,
    notify::{NotificationService, SmtpNotifier},
    services::AdminAuthService,
    AppConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inquiry_desk=info,inquiry_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Starting Inquiry Desk server");

    let db = DatabaseManager::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.test_connection()
        .await
        .context("Database connectivity check failed")?;
    db.ensure_schema()
        .await
        .context("Failed to create database schema")?;

    let accounts = Arc::new(db.account_store());
    let auth = AdminAuthService::new(accounts.clone());
    auth.ensure_default_admin()
        .await
        .context("Failed to provision default admin")?;

    let classifier =
        GeminiClient::new(config.ai.clone()).context("Failed to create Gemini client")?;
    tracing::info!(model = %classifier.config().model, "Classifier ready");

    let notifier = SmtpNotifier::new(&config.smtp).context("Failed to create SMTP transport")?;
    let notifications = NotificationService::new(Arc::new(notifier), config.alert_email.clone())
        .with_timeout(config.notify_timeout);

    if config.cron_secret.is_none() {
        tracing::warn!("CRON_SECRET_TOKEN is not set; /api/cron/followup will refuse requests");
    }

    let state = AppState::new(
        Arc::new(db.inquiry_store()),
        accounts,
        Arc::new(classifier),
        notifications,
    )
    .with_auth(auth)
    .with_cron_secret(config.cron_secret.clone())
    .with_session_ttl(config.session_ttl)
    .with_followup_threshold(config.followup_threshold);

    let static_dir = config.static_dir.is_dir().then_some(config.static_dir.as_path());
    if static_dir.is_none() {
        tracing::warn!(
            "Static directory {} not found; UI will not be served",
            config.static_dir.display()
        );
    }

    let app = create_router(state, static_dir);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

//! Follow-up sweep trigger
//!
//! Calls `POST /api/cron/followup` with the shared bearer token. Meant to
//! run from cron, a systemd timer or any scheduler.
//!
//! Usage:
//!   API_URL=https://desk.example.com API_SECRET_TOKEN=... followup_trigger
//!   followup_trigger --api-url http://localhost:3000 --token s3cret --source manual

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FOLLOWUP_PATH: &str = "/api/cron/followup";

#[derive(Parser, Debug)]
#[command(name = "followup_trigger")]
#[command(about = "Trigger the inquiry follow-up reminder sweep")]
struct Args {
    /// Base URL of the inquiry server
    #[arg(long, env = "API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Bearer token matching the server's CRON_SECRET_TOKEN
    #[arg(long, env = "API_SECRET_TOKEN", hide_env_values = true)]
    token: String,

    /// Value sent in the X-Cron-Source header
    #[arg(long, default_value = "followup-trigger")]
    source: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "followup_trigger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match trigger(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Failed to trigger follow-up: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// POST to the sweep endpoint. `Ok(false)` for a non-200 answer.
async fn trigger(args: &Args) -> anyhow::Result<bool> {
    let url = format!("{}{}", args.api_url.trim_end_matches('/'), FOLLOWUP_PATH);

    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .context("Failed to build HTTP client")?;

    tracing::info!(url = %url, source = %args.source, "Triggering follow-up sweep");

    let response = client
        .post(&url)
        .bearer_auth(&args.token)
        .header("X-Cron-Source", &args.source)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let status = response.status();
    let body = response.text().await.context("Failed to read response")?;

    tracing::info!("Response status: {}", status);
    println!("{}", body);

    if status != reqwest::StatusCode::OK {
        tracing::error!("Follow-up trigger rejected: {}", status);
        return Ok(false);
    }
    Ok(true)
}

//! Environment configuration
//!
//! Everything is read once at startup. `from_lookup` takes any key lookup so
//! tests can feed a map instead of touching the process environment.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use url::Url;

use crate::ai::AiConfig;
use crate::database::DatabaseConfig;
use crate::notify::SmtpConfig;

/// Default Gmail SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default Gmail SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// libpq `sslmode` values sqlx understands
const SSL_MODES: [&str; 6] = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub ai: AiConfig,
    pub smtp: SmtpConfig,
    /// Recipient of high-priority alerts
    pub alert_email: String,
    pub notify_timeout: Duration,
    /// Bearer token for the follow-up trigger; `None` disables the endpoint
    pub cron_secret: Option<String>,
    pub session_ttl: Duration,
    pub followup_threshold: Duration,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port_raw = require("PORT")?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| ConfigError::Invalid {
                var: "PORT",
                reason: "PORT must be a positive integer".to_string(),
            })?;

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&get)?,
        };

        let smtp_username = require("SMTP_USER")?;
        let smtp_password = require("SMTP_PASS")?;

        let mut ai = AiConfig::new(require("AI_API_KEY")?);
        if let Some(model) = get("AI_MODEL") {
            ai.model = model;
        }
        if let Some(secs) = parse_opt::<u64>(&get, "AI_TIMEOUT_SECS")? {
            ai.timeout_seconds = secs;
        }

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_opt(&get, "DATABASE_POOL_SIZE")?.unwrap_or(20),
            ..DatabaseConfig::default()
        };

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: parse_opt(&get, "SMTP_PORT")?.unwrap_or(DEFAULT_SMTP_PORT),
            from_email: smtp_username.clone(),
            username: smtp_username.clone(),
            password: smtp_password,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database,
            ai,
            smtp,
            alert_email: get("ALERT_EMAIL").unwrap_or(smtp_username),
            notify_timeout: Duration::from_secs(
                parse_opt(&get, "NOTIFY_TIMEOUT_SECS")?.unwrap_or(30),
            ),
            cron_secret: get("CRON_SECRET_TOKEN"),
            session_ttl: parse_hours(&get, "SESSION_TTL_HOURS", 24)?,
            followup_threshold: parse_hours(&get, "FOLLOWUP_THRESHOLD_HOURS", 48)?,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "public".to_string())),
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Connection URL from `DB_*` parts. User, password and database name are
/// percent-encoded, so any characters are allowed in them.
fn database_url_from_parts(get: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
    let unusable = |var: &'static str| ConfigError::Invalid {
        var,
        reason: "cannot be used in a connection URL".to_string(),
    };

    let host = require("DB_HOST")?;
    let user = require("DB_USER")?;
    let password = require("DB_PASSWORD")?;
    let name = require("DB_NAME")?;
    let port = parse_opt::<u16>(get, "DB_PORT")?.unwrap_or(5432);

    let mut url = Url::parse(&format!("postgresql://{}:{}/", host.trim(), port)).map_err(|e| {
        ConfigError::Invalid {
            var: "DB_HOST",
            reason: e.to_string(),
        }
    })?;
    url.set_username(&user).map_err(|_| unusable("DB_USER"))?;
    url.set_password(Some(password.as_str()))
        .map_err(|_| unusable("DB_PASSWORD"))?;
    url.path_segments_mut()
        .map_err(|_| unusable("DB_NAME"))?
        .pop_if_empty()
        .push(&name);

    // A pinned CA without an explicit mode means full verification
    let root_cert = get("DB_SSLROOTCERT");
    let ssl_mode = match get("DB_SSLMODE") {
        Some(mode) => {
            let mode = mode.trim().to_ascii_lowercase();
            if !SSL_MODES.contains(&mode.as_str()) {
                return Err(ConfigError::Invalid {
                    var: "DB_SSLMODE",
                    reason: format!("expected one of {}", SSL_MODES.join(", ")),
                });
            }
            Some(mode)
        }
        None => root_cert.as_ref().map(|_| "verify-full".to_string()),
    };

    let mut params = Vec::new();
    if let Some(mode) = ssl_mode {
        params.push(("sslmode", mode));
    }
    if let Some(cert) = root_cert {
        params.push(("sslrootcert", cert));
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url.into())
}

/// An hour count that must stay representable as a timestamp offset
fn parse_hours(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let hours = parse_opt::<u64>(get, var)?.unwrap_or(default);
    let out_of_range = || ConfigError::Invalid {
        var,
        reason: format!("{} hours is out of range", hours),
    };

    let duration = hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(out_of_range)?;
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|offset| Utc::now().checked_sub_signed(offset))
        .ok_or_else(out_of_range)?;
    Ok(duration)
}

fn parse_opt<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            }),
    }
}

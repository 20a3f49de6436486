//! Server-side admin sessions
//!
//! A login stores an `AdminSession` under a random 256-bit hex id and hands
//! the id back in the `inquiry_sid` cookie. Sessions expire after a period
//! of inactivity; each authorized request slides the window forward.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::ApiError;
use crate::models::AdminAccount;

pub const SESSION_COOKIE: &str = "inquiry_sid";

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub account_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session and return its id. Expired sessions are purged first.
    pub async fn create(&self, account: &AdminAccount) -> String {
        self.create_at(account, Utc::now()).await
    }

    pub async fn create_at(&self, account: &AdminAccount, now: DateTime<Utc>) -> String {
        let id = hex::encode(rand::random::<[u8; 32]>());
        let session = AdminSession {
            account_id: account.id,
            username: account.username.clone(),
            created_at: now,
            last_seen_at: now,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!(purged, "Purged expired admin sessions");
        }
        sessions.insert(id.clone(), session);
        id
    }

    /// Look up a live session and refresh it. Expired sessions are dropped.
    pub async fn touch(&self, id: &str) -> Option<AdminSession> {
        self.touch_at(id, Utc::now()).await
    }

    pub async fn touch_at(&self, id: &str, now: DateTime<Utc>) -> Option<AdminSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;

        if self.is_expired(session, now) {
            debug!(username = %session.username, "Admin session expired");
            sessions.remove(id);
            return None;
        }

        session.last_seen_at = now;
        Some(session.clone())
    }

    fn is_expired(&self, session: &AdminSession, now: DateTime<Utc>) -> bool {
        let idle = (now - session.last_seen_at).to_std().unwrap_or_default();
        idle > self.ttl
    }

    pub async fn remove(&self, id: &str) -> Option<AdminSession> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn cookie(&self, id: &str) -> String {
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE,
            id,
            self.ttl.as_secs()
        )
    }
}

pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Session id from the `Cookie` header(s), if any
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Route layer for admin-only routes. Puts the `AdminSession` into request
/// extensions for the handler.
pub async fn require_admin(
    State(sessions): State<SessionStore>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match session_id(request.headers()) {
        Some(id) => sessions.touch(&id).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => ApiError::Unauthorized.into_response(),
    }
}

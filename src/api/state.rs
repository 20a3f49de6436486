//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use super::session::SessionStore;
use crate::ai::Classifier;
use crate::database::{AccountStore, InquiryStore};
use crate::notify::NotificationService;
use crate::services::{AdminAuthService, FollowUpSweep, InquiryQueryService, InquiryService};

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    pub inquiries: InquiryService,
    pub queries: InquiryQueryService,
    pub followup: FollowUpSweep,
    pub auth: AdminAuthService,
    pub sessions: SessionStore,
    /// Bearer token for the cron trigger. `None` answers 500.
    pub cron_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn InquiryStore>,
        accounts: Arc<dyn AccountStore>,
        classifier: Arc<dyn Classifier>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            inquiries: InquiryService::new(store.clone(), classifier, notifications.clone()),
            queries: InquiryQueryService::new(store.clone()),
            followup: FollowUpSweep::new(store, notifications),
            auth: AdminAuthService::new(accounts),
            sessions: SessionStore::default(),
            cron_secret: None,
        }
    }

    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron_secret = secret.map(Arc::from);
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionStore::new(ttl);
        self
    }

    pub fn with_followup_threshold(mut self, threshold: Duration) -> Self {
        self.followup = self.followup.with_threshold(threshold);
        self
    }

    pub fn with_auth(mut self, auth: AdminAuthService) -> Self {
        self.auth = auth;
        self
    }
}

//! Follow-up sweep
//!
//! Reminds submitters whose inquiries are still OPEN after the threshold.
//! Status is not touched and nothing records that a reminder went out, so a
//! record that stays open is reminded on every run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::database::InquiryStore;
use crate::error::{InquiryError, InquiryResult};
use crate::notify::NotificationService;

pub const DEFAULT_FOLLOWUP_THRESHOLD: Duration = Duration::from_secs(48 * 3600);

#[derive(Clone)]
pub struct FollowUpSweep {
    store: Arc<dyn InquiryStore>,
    notifications: NotificationService,
    threshold: Duration,
}

impl FollowUpSweep {
    pub fn new(store: Arc<dyn InquiryStore>, notifications: NotificationService) -> Self {
        Self {
            store,
            notifications,
            threshold: DEFAULT_FOLLOWUP_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    pub async fn run_sweep(&self) -> InquiryResult<usize> {
        self.run_sweep_at(Utc::now()).await
    }

    /// Sweep as of `now`. Returns how many inquiries were selected.
    pub async fn run_sweep_at(&self, now: DateTime<Utc>) -> InquiryResult<usize> {
        let cutoff = chrono::Duration::from_std(self.threshold)
            .ok()
            .and_then(|threshold| now.checked_sub_signed(threshold))
            .ok_or_else(|| {
                InquiryError::Config(ConfigError::Invalid {
                    var: "FOLLOWUP_THRESHOLD_HOURS",
                    reason: format!("threshold of {:?} is out of range", self.threshold),
                })
            })?;

        let pending = self.store.list_stale_open(cutoff).await?;
        info!(
            count = pending.len(),
            cutoff = %cutoff.to_rfc3339(),
            "Running follow-up sweep"
        );

        let mut delivered = 0usize;
        for inquiry in &pending {
            if self.notifications.send_follow_up(inquiry).await {
                delivered += 1;
                info!(id = inquiry.id, "Sent follow-up reminder");
            } else {
                warn!(id = inquiry.id, "Follow-up reminder was not delivered");
            }
        }

        info!(
            selected = pending.len(),
            delivered, "Follow-up processing complete"
        );
        Ok(pending.len())
    }
}

//! Inquiry lifecycle: submission and status transitions
//!
//! Submission runs validate -> classify -> derive priority -> persist ->
//! notify. Notifications are best-effort; once the record is stored the
//! submission succeeds whatever the mail transport does.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

use crate::ai::Classifier;
use crate::database::InquiryStore;
use crate::error::{InquiryError, InquiryResult};
use crate::models::{Inquiry, InquiryStatus, NewInquiry, Priority, Sentiment, Urgency};
use crate::notify::NotificationService;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

/// Loose shape check: something@something.something
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// HIGH if urgency is HIGH or sentiment is NEGATIVE, MEDIUM if urgency is
/// MEDIUM, LOW otherwise.
pub fn derive_priority(sentiment: Sentiment, urgency: Urgency) -> Priority {
    match (sentiment, urgency) {
        (_, Urgency::High) | (Sentiment::Negative, _) => Priority::High,
        (_, Urgency::Medium) => Priority::Medium,
        _ => Priority::Low,
    }
}

/// Creates inquiries and moves them through their states
#[derive(Clone)]
pub struct InquiryService {
    store: Arc<dyn InquiryStore>,
    classifier: Arc<dyn Classifier>,
    notifications: NotificationService,
}

impl InquiryService {
    pub fn new(
        store: Arc<dyn InquiryStore>,
        classifier: Arc<dyn Classifier>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            classifier,
            notifications,
        }
    }

    /// Validate, classify, store and acknowledge a public submission
    pub async fn submit(&self, name: &str, email: &str, message: &str) -> InquiryResult<Inquiry> {
        let (name, email, message) = (name.trim(), email.trim(), message.trim());

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(InquiryError::validation(
                "name, email, and message are required",
            ));
        }
        if !is_valid_email(email) {
            return Err(InquiryError::validation("Invalid email address"));
        }

        let classification = self.classifier.classify(message).await;
        let priority = derive_priority(classification.sentiment, classification.urgency);

        let inquiry = self
            .store
            .insert(NewInquiry {
                name: name.to_string(),
                email: email.to_string(),
                message: message.to_string(),
                intent: classification.intent,
                sentiment: classification.sentiment,
                urgency: classification.urgency,
                priority,
                status: InquiryStatus::Open,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            id = inquiry.id,
            intent = %inquiry.intent,
            priority = %inquiry.priority,
            "Inquiry submitted"
        );

        if !self
            .notifications
            .send_acknowledgement(&inquiry.name, &inquiry.email)
            .await
        {
            warn!(id = inquiry.id, "Acknowledgement email was not delivered");
        }

        if inquiry.priority == Priority::High
            && !self.notifications.send_admin_alert(&inquiry).await
        {
            warn!(id = inquiry.id, "High-priority alert was not delivered");
        }

        Ok(inquiry)
    }

    /// Set the status from its wire label. Any state may move to any other.
    pub async fn update_status(&self, id: i64, status: &str) -> InquiryResult<Inquiry> {
        let status: InquiryStatus = status
            .parse()
            .map_err(|_| InquiryError::validation("Invalid status"))?;
        self.transition(id, status).await
    }

    /// Legacy shortcut for `update_status(id, CLOSED)`
    pub async fn close(&self, id: i64) -> InquiryResult<Inquiry> {
        self.transition(id, InquiryStatus::Closed).await
    }

    async fn transition(&self, id: i64, status: InquiryStatus) -> InquiryResult<Inquiry> {
        let inquiry = self
            .store
            .update_status(id, status)
            .await?
            .ok_or(InquiryError::NotFound(id))?;

        info!(id, status = %inquiry.status, "Inquiry status updated");
        Ok(inquiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_priority_grid() {
        use Sentiment::*;

        let cases = [
            (Positive, Urgency::Low, Priority::Low),
            (Positive, Urgency::Medium, Priority::Medium),
            (Positive, Urgency::High, Priority::High),
            (Neutral, Urgency::Low, Priority::Low),
            (Neutral, Urgency::Medium, Priority::Medium),
            (Neutral, Urgency::High, Priority::High),
            (Negative, Urgency::Low, Priority::High),
            (Negative, Urgency::Medium, Priority::High),
            (Negative, Urgency::High, Priority::High),
        ];

        for (sentiment, urgency, expected) in cases {
            assert_eq!(
                derive_priority(sentiment, urgency),
                expected,
                "{sentiment} / {urgency}"
            );
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@."));
    }
}

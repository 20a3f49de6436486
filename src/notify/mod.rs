//! Outbound notifications
//!
//! `Notifier` is the transport seam (SMTP in production, recorders in
//! tests). `NotificationService` composes the three messages the system
//! sends and bounds every send with a timeout. Sends report `bool`.
//! They never return an error to the caller.

pub mod smtp;

pub use smtp::{NotifyError, SmtpConfig, SmtpNotifier};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::models::Inquiry;

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail transport. Returns whether delivery succeeded.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> bool;
}

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Composes and sends the acknowledgement, alert and follow-up emails
#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    staff_address: String,
    send_timeout: Duration,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, staff_address: impl Into<String>) -> Self {
        Self {
            notifier,
            staff_address: staff_address.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub async fn send_acknowledgement(&self, name: &str, email: &str) -> bool {
        self.deliver(acknowledgement(name, email)).await
    }

    pub async fn send_admin_alert(&self, inquiry: &Inquiry) -> bool {
        self.deliver(admin_alert(inquiry, &self.staff_address)).await
    }

    pub async fn send_follow_up(&self, inquiry: &Inquiry) -> bool {
        self.deliver(follow_up_reminder(inquiry)).await
    }

    async fn deliver(&self, email: OutboundEmail) -> bool {
        match tokio::time::timeout(self.send_timeout, self.notifier.send(&email)).await {
            Ok(delivered) => delivered,
            Err(_) => {
                warn!(
                    subject = %email.subject,
                    "Email send timed out after {:?}",
                    self.send_timeout
                );
                false
            }
        }
    }
}

/// "We received your inquiry" message to the submitter
pub fn acknowledgement(name: &str, email: &str) -> OutboundEmail {
    OutboundEmail {
        to: vec![email.to_string()],
        subject: "We received your inquiry".to_string(),
        body: [
            format!("Hi {},", name).as_str(),
            "",
            "Thanks for reaching out. Your inquiry has been received and our team will review it shortly.",
            "We will follow up if we need more details.",
            "",
            "Best regards,",
            "Customer Support",
        ]
        .join("\n"),
    }
}

/// Internal alert with the full record, sent for HIGH priority inquiries
pub fn admin_alert(inquiry: &Inquiry, staff_address: &str) -> OutboundEmail {
    OutboundEmail {
        to: vec![staff_address.to_string()],
        subject: "New high-priority customer inquiry".to_string(),
        body: [
            "A high-priority inquiry was submitted.".to_string(),
            format!("ID: {}", inquiry.id),
            format!("Name: {}", inquiry.name),
            format!("Email: {}", inquiry.email),
            format!("Intent: {}", inquiry.intent),
            format!("Sentiment: {}", inquiry.sentiment),
            format!("Urgency: {}", inquiry.urgency),
            format!("Priority: {}", inquiry.priority),
            format!("Received: {}", inquiry.created_at.to_rfc3339()),
            String::new(),
            "Message:".to_string(),
            inquiry.message.clone(),
        ]
        .join("\n"),
    }
}

/// Reminder for an inquiry that is still open
pub fn follow_up_reminder(inquiry: &Inquiry) -> OutboundEmail {
    OutboundEmail {
        to: vec![inquiry.email.clone()],
        subject: "Follow-up on your inquiry".to_string(),
        body: [
            format!("Hi {},", inquiry.name).as_str(),
            "",
            "Our support team is currently reviewing your request and will get back to you shortly.",
            "We appreciate your patience.",
            "",
            "If your issue has already been resolved, you can ignore this message.",
            "",
            "Thank you for your patience.",
            "Customer Support",
        ]
        .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InquiryStatus, Priority, Sentiment, Urgency};
    use chrono::Utc;
    use tokio::sync::Mutex;

    struct Recorder(Mutex<Vec<OutboundEmail>>);

    #[async_trait]
    impl Notifier for Recorder {
        async fn send(&self, email: &OutboundEmail) -> bool {
            self.0.lock().await.push(email.clone());
            true
        }
    }

    struct Stalled;

    #[async_trait]
    impl Notifier for Stalled {
        async fn send(&self, _email: &OutboundEmail) -> bool {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            true
        }
    }

    fn sample() -> Inquiry {
        Inquiry {
            id: 42,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            message: "Charged twice".to_string(),
            intent: "Billing".to_string(),
            sentiment: Sentiment::Negative,
            urgency: Urgency::Medium,
            priority: Priority::High,
            status: InquiryStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_alert_carries_full_record() {
        let email = admin_alert(&sample(), "staff@example.com");
        assert_eq!(email.to, vec!["staff@example.com".to_string()]);
        assert!(email.body.contains("Name: Grace"));
        assert!(email.body.contains("Sentiment: NEGATIVE"));
        assert!(email.body.contains("Priority: HIGH"));
        assert!(email.body.ends_with("Charged twice"));
    }

    #[test]
    fn test_acknowledgement_greets_submitter() {
        let email = acknowledgement("Grace", "grace@example.com");
        assert_eq!(email.to, vec!["grace@example.com".to_string()]);
        assert!(email.body.starts_with("Hi Grace,"));
    }

    #[tokio::test]
    async fn test_service_routes_messages() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let service = NotificationService::new(recorder.clone(), "staff@example.com");

        assert!(service.send_follow_up(&sample()).await);
        assert!(service.send_admin_alert(&sample()).await);

        let sent = recorder.0.lock().await;
        assert_eq!(sent[0].subject, "Follow-up on your inquiry");
        assert_eq!(sent[0].to, vec!["grace@example.com".to_string()]);
        assert_eq!(sent[1].to, vec!["staff@example.com".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_transport_times_out_as_failure() {
        let service = NotificationService::new(Arc::new(Stalled), "staff@example.com")
            .with_timeout(Duration::from_secs(5));
        assert!(!service.send_acknowledgement("Grace", "grace@example.com").await);
    }
}

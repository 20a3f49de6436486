//! Shared fixtures: a scripted classifier and a recording mail transport

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use inquiry_desk::ai::{parse_classification, Classification, Classifier};
use inquiry_desk::database::memory::MemoryInquiryStore;
use inquiry_desk::database::InquiryStore;
use inquiry_desk::notify::{NotificationService, Notifier, OutboundEmail};
use inquiry_desk::services::derive_priority;
use inquiry_desk::{Inquiry, InquiryStatus, NewInquiry, Sentiment, Urgency};

pub const STAFF: &str = "staff@example.com";

/// Classifier that answers with whatever raw model text it was given
pub struct ScriptedClassifier {
    raw: Mutex<String>,
}

impl ScriptedClassifier {
    pub fn new(raw: &str) -> Arc<Self> {
        Arc::new(Self {
            raw: Mutex::new(raw.to_string()),
        })
    }

    pub fn labels(sentiment: Sentiment, urgency: Urgency) -> Arc<Self> {
        Self::new(&format!(
            r#"{{"intent":"Billing","sentiment":"{}","urgency":"{}"}}"#,
            sentiment, urgency
        ))
    }

    pub async fn set(&self, raw: &str) {
        *self.raw.lock().await = raw.to_string();
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _message: &str) -> Classification {
        parse_classification(&self.raw.lock().await)
    }
}

/// Transport that records every email and can be switched to failing
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &OutboundEmail) -> bool {
        self.sent.lock().await.push(email.clone());
        !self.failing.load(Ordering::SeqCst)
    }
}

pub fn notifications(notifier: Arc<RecordingNotifier>) -> NotificationService {
    NotificationService::new(notifier, STAFF)
}

/// Insert a record directly, bypassing classification
pub async fn seed(
    store: &MemoryInquiryStore,
    email: &str,
    sentiment: Sentiment,
    urgency: Urgency,
    status: InquiryStatus,
    created_at: DateTime<Utc>,
) -> Inquiry {
    store
        .insert(NewInquiry {
            name: email.split('@').next().unwrap_or("customer").to_string(),
            email: email.to_string(),
            message: "Seeded inquiry".to_string(),
            intent: "General".to_string(),
            sentiment,
            urgency,
            priority: derive_priority(sentiment, urgency),
            status,
            created_at,
        })
        .await
        .expect("seed insert")
}

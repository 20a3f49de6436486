//! Inquiry Desk - customer inquiry intake and triage
//!
//! Public submissions are classified by an LLM, stored, and acknowledged by
//! email. Staff triage them from an admin panel, and a scheduled sweep
//! reminds customers whose inquiries have been open too long.
//!
//! ## Call chain
//! Submission -> Classifier -> Priority -> Store -> Notifier
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use inquiry_desk::ai::{Classification, Classifier};
//! use inquiry_desk::database::memory::MemoryInquiryStore;
//! use inquiry_desk::notify::{NotificationService, Notifier, OutboundEmail};
//! use inquiry_desk::services::InquiryService;
//!
//! struct Fixed;
//!
//! #[async_trait::async_trait]
//! impl Classifier for Fixed {
//!     async fn classify(&self, _message: &str) -> Classification {
//!         Classification::default()
//!     }
//! }
//!
//! struct Quiet;
//!
//! #[async_trait::async_trait]
//! impl Notifier for Quiet {
//!     async fn send(&self, _email: &OutboundEmail) -> bool {
//!         true
//!     }
//! }
//!
//! # async fn run() -> Result<(), inquiry_desk::InquiryError> {
//! let service = InquiryService::new(
//!     Arc::new(MemoryInquiryStore::new()),
//!     Arc::new(Fixed),
//!     NotificationService::new(Arc::new(Quiet), "support@example.com"),
//! );
//! let inquiry = service
//!     .submit("Ada", "ada@example.com", "My order never arrived")
//!     .await?;
//! assert_eq!(inquiry.status.as_str(), "OPEN");
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Environment-driven configuration
pub mod config;

// Inquiry and admin account types
pub mod models;

// Classifier adapter (Gemini)
pub mod ai;

// Outbound email
pub mod notify;

// Stores (Postgres when enabled, in-memory always)
pub mod database;

// Lifecycle, query engine, follow-up sweep, admin access
pub mod services;

// HTTP surface
#[cfg(feature = "server")]
pub mod api;

pub use config::{AppConfig, ConfigError};
pub use error::{InquiryError, InquiryResult, StoreError};
pub use models::{
    AdminAccount, DashboardStats, Inquiry, InquiryStatus, NewInquiry, Priority, Sentiment, Urgency,
};

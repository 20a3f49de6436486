//! Business logic over the stores and adapters
//!
//! Each service owns `Arc`s to its collaborators and is cheap to clone into
//! axum state.

pub mod admin_auth;
pub mod followup;
pub mod inquiry_lifecycle;
pub mod inquiry_query;

// Submission and status transitions
pub use inquiry_lifecycle::{derive_priority, is_valid_email, InquiryService};

// Admin list and dashboard
pub use inquiry_query::{InquiryQueryService, ListQuery};

// Scheduled reminders
pub use followup::{FollowUpSweep, DEFAULT_FOLLOWUP_THRESHOLD};

// Credentials
pub use admin_auth::{AdminAuthService, PasswordChange, DEFAULT_ADMIN_USERNAME, MIN_HASH_COST};

//! Error taxonomy for the inquiry service
//!
//! Client-facing failures (validation, not found, auth) are distinct from
//! server-side failures (configuration, storage). Classifier and mail
//! failures never appear here: their adapters absorb them.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for inquiry operations
#[derive(Error, Debug)]
pub enum InquiryError {
    #[error("{0}")]
    Validation(String),

    #[error("Inquiry not found: {0}")]
    NotFound(i64),

    #[error("{0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl InquiryError {
    pub fn validation(message: impl Into<String>) -> Self {
        InquiryError::Validation(message.into())
    }
}

/// Persistence failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored value for {column}: '{value}'")]
    InvalidValue { column: &'static str, value: String },

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type InquiryResult<T> = Result<T, InquiryError>;

//! Persistence for inquiries and admin accounts
//!
//! The services talk to `InquiryStore` and `AccountStore`. PostgreSQL
//! implementations live behind the `database` feature; the in-memory ones in
//! `memory` are always available and back the tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{AdminAccount, Inquiry, InquiryStatus, NewInquiry, Priority};

pub mod memory;

#[cfg(feature = "database")]
mod admin_repository;
#[cfg(feature = "database")]
mod inquiry_repository;

#[cfg(feature = "database")]
pub use admin_repository::PgAccountStore;
#[cfg(feature = "database")]
pub use inquiry_repository::PgInquiryStore;

#[cfg(feature = "database")]
pub use manager::DatabaseManager;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost:5432/inquiries".to_string(),
            max_connections: 20,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)), // 10 minutes
            max_lifetime: Some(Duration::from_secs(1800)), // 30 minutes
        }
    }
}

/// Conjunctive filter over the inquiry table. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InquiryFilter {
    pub id: Option<i64>,
    pub priority: Option<Priority>,
    pub status: Option<InquiryStatus>,
}

impl InquiryFilter {
    pub fn with_status(status: InquiryStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn matches(&self, inquiry: &Inquiry) -> bool {
        self.id.map_or(true, |id| inquiry.id == id)
            && self.priority.map_or(true, |p| inquiry.priority == p)
            && self.status.map_or(true, |s| inquiry.status == s)
    }
}

/// Ordering on `created_at`, ties broken by id in the same direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Inquiry persistence. There is no delete and no way to
/// rewrite priority or `created_at`.
#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Inquiry>, StoreError>;

    /// Returns the updated record, or `None` if the id is unknown
    async fn update_status(
        &self,
        id: i64,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, StoreError>;

    async fn list(
        &self,
        filter: &InquiryFilter,
        sort: SortDirection,
    ) -> Result<Vec<Inquiry>, StoreError>;

    async fn count(&self, filter: &InquiryFilter) -> Result<i64, StoreError>;

    /// OPEN inquiries created strictly before `cutoff`, oldest first
    async fn list_stale_open(&self, cutoff: DateTime<Utc>) -> Result<Vec<Inquiry>, StoreError>;
}

/// Admin credential persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError>;

    async fn create(&self, username: &str, password_hash: &str)
        -> Result<AdminAccount, StoreError>;

    /// Replaces the hash and bumps `updated_at`. False if the user is unknown.
    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}

#[cfg(feature = "database")]
mod manager {
    use sqlx::{postgres::PgPoolOptions, PgPool};
    use tracing::{info, warn};

    use super::{DatabaseConfig, PgAccountStore, PgInquiryStore};

    const SCHEMA: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS inquiries (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            intent TEXT NOT NULL,
            sentiment TEXT NOT NULL,
            urgency TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_inquiries_status_created ON inquiries (status, created_at)",
        r#"
        CREATE TABLE IF NOT EXISTS admin_users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(100) UNIQUE NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ];

    /// Database connection manager
    pub struct DatabaseManager {
        pool: PgPool,
    }

    impl DatabaseManager {
        /// Create a new database manager with the given configuration
        pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
            info!(
                "Connecting to database: {}",
                mask_database_url(&config.database_url)
            );

            let mut pool_options = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.connection_timeout);

            if let Some(idle_timeout) = config.idle_timeout {
                pool_options = pool_options.idle_timeout(idle_timeout);
            }

            if let Some(max_lifetime) = config.max_lifetime {
                pool_options = pool_options.max_lifetime(max_lifetime);
            }

            let pool = pool_options
                .connect(&config.database_url)
                .await
                .map_err(|e| {
                    warn!("Failed to connect to database: {}", e);
                    e
                })?;

            info!("Database connection pool created successfully");

            Ok(Self { pool })
        }

        pub fn pool(&self) -> &PgPool {
            &self.pool
        }

        pub fn inquiry_store(&self) -> PgInquiryStore {
            PgInquiryStore::new(self.pool.clone())
        }

        pub fn account_store(&self) -> PgAccountStore {
            PgAccountStore::new(self.pool.clone())
        }

        /// Test database connectivity
        pub async fn test_connection(&self) -> Result<(), sqlx::Error> {
            sqlx::query("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map(|_| ())
        }

        /// Create tables and indexes if they do not exist
        pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
            info!("Ensuring database schema");
            for statement in SCHEMA {
                sqlx::query(statement).execute(&self.pool).await?;
            }
            Ok(())
        }

        /// Close the database connection pool
        pub async fn close(self) {
            info!("Closing database connection pool");
            self.pool.close().await;
        }
    }

    /// Mask the password in a database URL for logging
    pub(crate) fn mask_database_url(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(parsed) => {
                let mut masked = parsed.clone();
                if parsed.password().is_some() {
                    let _ = masked.set_password(Some("***"));
                }
                masked.to_string()
            }
            Err(_) => "***".to_string(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mask_database_url() {
            assert_eq!(
                mask_database_url("postgresql://desk:hunter2@db:5432/inquiries"),
                "postgresql://desk:***@db:5432/inquiries"
            );
            assert_eq!(
                mask_database_url("postgresql://localhost:5432/inquiries"),
                "postgresql://localhost:5432/inquiries"
            );
            assert_eq!(mask_database_url("not a url"), "***");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sentiment, Urgency};

    fn inquiry(id: i64, priority: Priority, status: InquiryStatus) -> Inquiry {
        Inquiry {
            id,
            name: "n".to_string(),
            email: "n@example.com".to_string(),
            message: "m".to_string(),
            intent: "General".to_string(),
            sentiment: Sentiment::Neutral,
            urgency: Urgency::Medium,
            priority,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let record = inquiry(3, Priority::High, InquiryStatus::Open);
        assert!(InquiryFilter::default().matches(&record));
        assert!(InquiryFilter::with_priority(Priority::High).matches(&record));

        let filter = InquiryFilter {
            priority: Some(Priority::High),
            status: Some(InquiryStatus::Closed),
            ..Default::default()
        };
        assert!(!filter.matches(&record));

        let filter = InquiryFilter {
            id: Some(4),
            ..Default::default()
        };
        assert!(!filter.matches(&record));
    }

    #[test]
    fn test_default_sort_is_descending() {
        assert_eq!(SortDirection::default(), SortDirection::Descending);
        assert_eq!(SortDirection::Ascending.as_sql(), "ASC");
    }
}

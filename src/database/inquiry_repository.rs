//! PostgreSQL inquiry store
//!
//! Enum columns are TEXT holding the upper-case wire labels. Rows are mapped
//! by hand so an unknown label surfaces as `StoreError::InvalidValue`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};

use super::{InquiryFilter, InquiryStore, SortDirection};
use crate::error::StoreError;
use crate::models::{Inquiry, InquiryStatus, NewInquiry};

const COLUMNS: &str =
    "id, name, email, message, intent, sentiment, urgency, priority, status, created_at";

pub struct PgInquiryStore {
    pool: PgPool,
}

impl PgInquiryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn label<T>(row: &PgRow, column: &'static str) -> Result<T, StoreError>
where
    T: std::str::FromStr,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|_| StoreError::InvalidValue { column, value: raw })
}

fn row_to_inquiry(row: &PgRow) -> Result<Inquiry, StoreError> {
    Ok(Inquiry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        intent: row.try_get("intent")?,
        sentiment: label(row, "sentiment")?,
        urgency: label(row, "urgency")?,
        priority: label(row, "priority")?,
        status: label(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &InquiryFilter) {
    if let Some(id) = filter.id {
        builder.push(" AND id = ");
        builder.push_bind(id);
    }

    if let Some(priority) = filter.priority {
        builder.push(" AND priority = ");
        builder.push_bind(priority.as_str());
    }

    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
}

#[async_trait]
impl InquiryStore for PgInquiryStore {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO inquiries (
                name, email, message, intent, sentiment, urgency, priority, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.message)
        .bind(&inquiry.intent)
        .bind(inquiry.sentiment.as_str())
        .bind(inquiry.urgency.as_str())
        .bind(inquiry.priority.as_str())
        .bind(inquiry.status.as_str())
        .bind(inquiry.created_at)
        .fetch_one(&self.pool)
        .await?;

        let created = row_to_inquiry(&row)?;
        info!("Created inquiry {} ({})", created.id, created.priority);
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Inquiry>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM inquiries WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_inquiry).transpose()
    }

    async fn update_status(
        &self,
        id: i64,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE inquiries SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_inquiry).transpose()
    }

    async fn list(
        &self,
        filter: &InquiryFilter,
        sort: SortDirection,
    ) -> Result<Vec<Inquiry>, StoreError> {
        let mut query_builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM inquiries WHERE 1=1"));
        push_filter(&mut query_builder, filter);

        let direction = sort.as_sql();
        query_builder.push(format!(
            " ORDER BY created_at {direction}, id {direction}"
        ));

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        debug!("Listed {} inquiries for {:?}", rows.len(), filter);

        rows.iter().map(row_to_inquiry).collect()
    }

    async fn count(&self, filter: &InquiryFilter) -> Result<i64, StoreError> {
        let mut query_builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM inquiries WHERE 1=1");
        push_filter(&mut query_builder, filter);

        let row = query_builder.build().fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    async fn list_stale_open(&self, cutoff: DateTime<Utc>) -> Result<Vec<Inquiry>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS} FROM inquiries
            WHERE status = $1 AND created_at < $2
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(InquiryStatus::Open.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_inquiry).collect()
    }
}

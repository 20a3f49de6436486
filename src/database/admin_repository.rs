//! PostgreSQL admin account store

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use super::AccountStore;
use crate::error::StoreError;
use crate::models::AdminAccount;

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &PgRow) -> Result<AdminAccount, StoreError> {
    Ok(AdminAccount {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at, updated_at
            FROM admin_users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, StoreError> {
        // A concurrent insert of the same name keeps the existing row
        let row = sqlx::query(
            r#"
            INSERT INTO admin_users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING id, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        let account = row_to_account(&row)?;
        info!("Admin account '{}' ready (id {})", account.username, account.id);
        Ok(account)
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE admin_users
            SET password_hash = $2, updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

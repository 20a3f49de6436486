//! Admin credentials
//!
//! bcrypt is CPU-bound, so hashing and verification run on the blocking
//! pool rather than on a runtime worker.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::database::AccountStore;
use crate::error::StoreError;
use crate::models::AdminAccount;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// bcrypt work factor for stored hashes
pub const HASH_COST: u32 = 10;

/// Lowest work factor bcrypt accepts; fast enough for tests
pub const MIN_HASH_COST: u32 = 4;

/// Outcome of a password change. A wrong current password is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub success: bool,
    pub message: String,
}

impl PasswordChange {
    fn rejected() -> Self {
        Self {
            success: false,
            message: "Invalid current password".to_string(),
        }
    }

    fn accepted() -> Self {
        Self {
            success: true,
            message: "Password changed successfully".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AdminAuthService {
    accounts: Arc<dyn AccountStore>,
    cost: u32,
}

impl AdminAuthService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            accounts,
            cost: HASH_COST,
        }
    }

    /// Override the bcrypt cost (tests use `MIN_HASH_COST`)
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// `None` for an unknown user or a wrong password
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AdminAccount>, StoreError> {
        let Some(account) = self.accounts.find_by_username(username).await? else {
            return Ok(None);
        };

        let candidate = password.to_string();
        let stored = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &stored)).await?;

        match valid {
            Ok(true) => Ok(Some(account)),
            Ok(false) => Ok(None),
            Err(e) => {
                warn!(username, "Stored password hash is unreadable: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<PasswordChange, StoreError> {
        if self.authenticate(username, current_password).await?.is_none() {
            return Ok(PasswordChange::rejected());
        }

        let hash = self.hash(new_password).await?;
        if !self.accounts.update_password_hash(username, &hash).await? {
            return Ok(PasswordChange::rejected());
        }

        info!(username, "Admin password changed");
        Ok(PasswordChange::accepted())
    }

    /// Create `admin` / `admin123` when no such account exists
    pub async fn ensure_default_admin(&self) -> Result<(), StoreError> {
        if self
            .accounts
            .find_by_username(DEFAULT_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let hash = self.hash(DEFAULT_ADMIN_PASSWORD).await?;
        self.accounts.create(DEFAULT_ADMIN_USERNAME, &hash).await?;
        warn!(
            "Default admin user created (username: {}, password: {}). Change it now.",
            DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD
        );
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<String, StoreError> {
        let password = password.to_string();
        let cost = self.cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }
}

//! In-memory stores
//!
//! Same contracts as the PostgreSQL stores. Used by the tests and by
//! anything that wants the service without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AccountStore, InquiryFilter, InquiryStore, SortDirection};
use crate::error::StoreError;
use crate::models::{AdminAccount, Inquiry, InquiryStatus, NewInquiry};

/// Inquiries keyed by id
#[derive(Debug, Default)]
pub struct MemoryInquiryStore {
    records: RwLock<BTreeMap<i64, Inquiry>>,
    next_id: AtomicI64,
}

impl MemoryInquiryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl InquiryStore for MemoryInquiryStore {
    async fn insert(&self, inquiry: NewInquiry) -> Result<Inquiry, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = inquiry.into_inquiry(id);
        self.records.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<Inquiry>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: i64,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|record| {
            record.status = status;
            record.clone()
        }))
    }

    async fn list(
        &self,
        filter: &InquiryFilter,
        sort: SortDirection,
    ) -> Result<Vec<Inquiry>, StoreError> {
        let records = self.records.read().await;
        let mut matched: Vec<Inquiry> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        matched.sort_by_key(|r| (r.created_at, r.id));
        if sort == SortDirection::Descending {
            matched.reverse();
        }
        Ok(matched)
    }

    async fn count(&self, filter: &InquiryFilter) -> Result<i64, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn list_stale_open(&self, cutoff: DateTime<Utc>) -> Result<Vec<Inquiry>, StoreError> {
        let records = self.records.read().await;
        let mut stale: Vec<Inquiry> = records
            .values()
            .filter(|r| r.status == InquiryStatus::Open && r.created_at < cutoff)
            .cloned()
            .collect();
        stale.sort_by_key(|r| (r.created_at, r.id));
        Ok(stale)
    }
}

/// Admin accounts keyed by username
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<BTreeMap<String, AdminAccount>>,
    next_id: AtomicI64,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, StoreError> {
        let mut accounts = self.accounts.write().await;
        if let Some(existing) = accounts.get(username) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let account = AdminAccount {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(username.to_string(), account.clone());
        Ok(account)
    }

    async fn update_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(username) {
            Some(account) => {
                account.password_hash = password_hash.to_string();
                account.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

//! Admin read views: filtered inquiry lists and dashboard counters

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::database::{InquiryFilter, InquiryStore, SortDirection};
use crate::error::{InquiryError, InquiryResult};
use crate::models::{DashboardStats, Inquiry, InquiryStatus, Priority};

/// Raw list parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub priority: Option<String>,
    pub status: Option<String>,
    pub search_id: Option<String>,
    pub sort: Option<String>,
}

impl ListQuery {
    /// Resolve into a typed filter and sort order
    pub fn parse(&self) -> InquiryResult<(InquiryFilter, SortDirection)> {
        let id = match non_blank(&self.search_id) {
            None => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| InquiryError::validation("Invalid inquiry id"))?,
            ),
        };

        let priority = match selector(&self.priority) {
            None => None,
            Some(raw) => Some(
                raw.parse::<Priority>()
                    .map_err(|_| InquiryError::validation("Invalid priority"))?,
            ),
        };

        let status = match selector(&self.status) {
            None => None,
            Some(raw) => Some(
                raw.parse::<InquiryStatus>()
                    .map_err(|_| InquiryError::validation("Invalid status"))?,
            ),
        };

        Ok((
            InquiryFilter {
                id,
                priority,
                status,
            },
            parse_sort(self.sort.as_deref()),
        ))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Like `non_blank`, but "all" also means no filter
fn selector(value: &Option<String>) -> Option<&str> {
    non_blank(value).filter(|v| !v.eq_ignore_ascii_case("all"))
}

/// Ascending only for an explicit "asc"; everything else is newest first
pub fn parse_sort(token: Option<&str>) -> SortDirection {
    match token {
        Some(t) if t.trim().eq_ignore_ascii_case("asc") => SortDirection::Ascending,
        _ => SortDirection::Descending,
    }
}

/// Read-only queries for the admin panel
#[derive(Clone)]
pub struct InquiryQueryService {
    store: Arc<dyn InquiryStore>,
}

impl InquiryQueryService {
    pub fn new(store: Arc<dyn InquiryStore>) -> Self {
        Self { store }
    }

    pub async fn list_inquiries(
        &self,
        filter: &InquiryFilter,
        sort: SortDirection,
    ) -> InquiryResult<Vec<Inquiry>> {
        let inquiries = self.store.list(filter, sort).await?;
        debug!(count = inquiries.len(), ?filter, ?sort, "Listed inquiries");
        Ok(inquiries)
    }

    /// Parse wire parameters and list
    pub async fn list_from_query(&self, query: &ListQuery) -> InquiryResult<Vec<Inquiry>> {
        let (filter, sort) = query.parse()?;
        self.list_inquiries(&filter, sort).await
    }

    /// Independent counts; no snapshot across fields
    pub async fn dashboard_stats(&self) -> InquiryResult<DashboardStats> {
        Ok(DashboardStats {
            total: self.count(InquiryFilter::default()).await?,
            open: self.count(InquiryFilter::with_status(InquiryStatus::Open)).await?,
            in_progress: self
                .count(InquiryFilter::with_status(InquiryStatus::InProgress))
                .await?,
            closed: self.count(InquiryFilter::with_status(InquiryStatus::Closed)).await?,
            high_priority: self.count(InquiryFilter::with_priority(Priority::High)).await?,
            medium_priority: self.count(InquiryFilter::with_priority(Priority::Medium)).await?,
            low_priority: self.count(InquiryFilter::with_priority(Priority::Low)).await?,
        })
    }

    async fn count(&self, filter: InquiryFilter) -> InquiryResult<i64> {
        Ok(self.store.count(&filter).await?)
    }
}

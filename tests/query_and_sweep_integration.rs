//! Admin list/stats views and the follow-up sweep over the in-memory store

mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use common::{notifications, seed, RecordingNotifier};
use inquiry_desk::database::memory::MemoryInquiryStore;
use inquiry_desk::database::{InquiryFilter, SortDirection};
use inquiry_desk::services::{FollowUpSweep, InquiryQueryService, ListQuery};
use inquiry_desk::{DashboardStats, InquiryError, InquiryStatus, Priority, Sentiment, Urgency};

async fn populated() -> Arc<MemoryInquiryStore> {
    let store = Arc::new(MemoryInquiryStore::new());
    let base = Utc::now() - Duration::days(1);

    // id 1: HIGH / OPEN
    seed(&store, "a@example.com", Sentiment::Negative, Urgency::Low, InquiryStatus::Open, base).await;
    // id 2: MEDIUM / IN_PROGRESS
    seed(
        &store,
        "b@example.com",
        Sentiment::Neutral,
        Urgency::Medium,
        InquiryStatus::InProgress,
        base + Duration::hours(1),
    )
    .await;
    // id 3: LOW / CLOSED
    seed(
        &store,
        "c@example.com",
        Sentiment::Positive,
        Urgency::Low,
        InquiryStatus::Closed,
        base + Duration::hours(2),
    )
    .await;
    // id 4: HIGH / CLOSED
    seed(
        &store,
        "d@example.com",
        Sentiment::Neutral,
        Urgency::High,
        InquiryStatus::Closed,
        base + Duration::hours(3),
    )
    .await;

    store
}

fn ids(inquiries: &[inquiry_desk::Inquiry]) -> Vec<i64> {
    inquiries.iter().map(|i| i.id).collect()
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let queries = InquiryQueryService::new(populated().await);

    let filter = InquiryFilter {
        priority: Some(Priority::High),
        status: Some(InquiryStatus::Closed),
        ..Default::default()
    };
    let found = queries
        .list_inquiries(&filter, SortDirection::Descending)
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![4]);

    let found = queries
        .list_inquiries(&InquiryFilter::with_priority(Priority::High), SortDirection::Descending)
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![4, 1]);
}

#[tokio::test]
async fn test_sort_defaults_to_newest_first() {
    let queries = InquiryQueryService::new(populated().await);

    let newest_first = queries.list_from_query(&ListQuery::default()).await.unwrap();
    assert_eq!(ids(&newest_first), vec![4, 3, 2, 1]);

    let oldest_first = queries
        .list_from_query(&ListQuery {
            sort: Some("asc".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ids(&oldest_first), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_wire_query_with_search_id_and_all() {
    let queries = InquiryQueryService::new(populated().await);

    let found = queries
        .list_from_query(&ListQuery {
            priority: Some("all".to_string()),
            status: Some("in_progress".to_string()),
            search_id: Some("2".to_string()),
            sort: None,
        })
        .await
        .unwrap();
    assert_eq!(ids(&found), vec![2]);

    let none = queries
        .list_from_query(&ListQuery {
            search_id: Some("2".to_string()),
            status: Some("CLOSED".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_dashboard_stats() {
    let queries = InquiryQueryService::new(populated().await);
    let stats = queries.dashboard_stats().await.unwrap();

    assert_eq!(
        stats,
        DashboardStats {
            total: 4,
            open: 1,
            in_progress: 1,
            closed: 2,
            high_priority: 2,
            medium_priority: 1,
            low_priority: 1,
        }
    );
}

#[tokio::test]
async fn test_empty_store_stats_are_zero() {
    let queries = InquiryQueryService::new(Arc::new(MemoryInquiryStore::new()));
    tokio_test::assert_ok!(queries.dashboard_stats().await);
    assert_eq!(
        queries.dashboard_stats().await.unwrap(),
        DashboardStats::default()
    );
}

#[tokio::test]
async fn test_sweep_selects_only_stale_open() {
    let store = Arc::new(MemoryInquiryStore::new());
    let now = Utc::now();

    let stale = seed(
        &store,
        "old@example.com",
        Sentiment::Neutral,
        Urgency::Low,
        InquiryStatus::Open,
        now - Duration::hours(49),
    )
    .await;
    seed(
        &store,
        "fresh@example.com",
        Sentiment::Neutral,
        Urgency::Low,
        InquiryStatus::Open,
        now - Duration::hours(47),
    )
    .await;
    seed(
        &store,
        "done@example.com",
        Sentiment::Neutral,
        Urgency::Low,
        InquiryStatus::Closed,
        now - Duration::hours(100),
    )
    .await;

    let notifier = RecordingNotifier::new();
    let sweep = FollowUpSweep::new(store.clone(), notifications(notifier.clone()));

    assert_eq!(sweep.run_sweep_at(now).await.unwrap(), 1);
    let sent = notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![stale.email.clone()]);
    assert_eq!(sent[0].subject, "Follow-up on your inquiry");

    // status untouched, so the next run reminds again
    assert_eq!(sweep.run_sweep_at(now).await.unwrap(), 1);
    assert_eq!(notifier.count().await, 2);
}

#[tokio::test]
async fn test_sweep_counts_selected_even_when_sends_fail() {
    let store = Arc::new(MemoryInquiryStore::new());
    let now = Utc::now();
    for email in ["x@example.com", "y@example.com"] {
        seed(
            &store,
            email,
            Sentiment::Neutral,
            Urgency::Low,
            InquiryStatus::Open,
            now - Duration::hours(72),
        )
        .await;
    }

    let notifier = RecordingNotifier::new();
    notifier.fail(true);
    let sweep = FollowUpSweep::new(store, notifications(notifier.clone()));

    assert_eq!(sweep.run_sweep_at(now).await.unwrap(), 2);
    assert_eq!(notifier.count().await, 2);
}

#[tokio::test]
async fn test_sweep_threshold_is_configurable() {
    let store = Arc::new(MemoryInquiryStore::new());
    let now = Utc::now();
    seed(
        &store,
        "z@example.com",
        Sentiment::Neutral,
        Urgency::Low,
        InquiryStatus::Open,
        now - Duration::hours(3),
    )
    .await;

    let notifier = RecordingNotifier::new();
    let sweep = FollowUpSweep::new(store, notifications(notifier.clone()))
        .with_threshold(StdDuration::from_secs(2 * 3600));

    assert_eq!(sweep.run_sweep_at(now).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sweep_rejects_unrepresentable_threshold() {
    let store = Arc::new(MemoryInquiryStore::new());
    let notifier = RecordingNotifier::new();

    // past the earliest representable timestamp
    let sweep = FollowUpSweep::new(store.clone(), notifications(notifier.clone()))
        .with_threshold(StdDuration::from_secs(10_000_000_000 * 3600));
    assert!(matches!(
        sweep.run_sweep_at(Utc::now()).await,
        Err(InquiryError::Config(_))
    ));

    // too large for a signed duration
    let sweep = FollowUpSweep::new(store, notifications(notifier.clone()))
        .with_threshold(StdDuration::MAX);
    assert!(matches!(
        sweep.run_sweep_at(Utc::now()).await,
        Err(InquiryError::Config(_))
    ));
    assert_eq!(notifier.count().await, 0);
}

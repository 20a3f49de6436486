//! PostgreSQL store tests
//!
//! Needs a scratch database. Run with:
//!   DATABASE_URL=postgresql://localhost:5432/inquiries_test \
//!     cargo test --features database --test pg_store_integration -- --ignored

#![cfg(feature = "database")]

use chrono::{Duration, Utc};

use inquiry_desk::database::{
    AccountStore, DatabaseConfig, DatabaseManager, InquiryFilter, InquiryStore, SortDirection,
};
use inquiry_desk::{InquiryStatus, NewInquiry, Priority, Sentiment, Urgency};

async fn connect() -> DatabaseManager {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a scratch database");
    let config = DatabaseConfig {
        database_url,
        max_connections: 2,
        ..DatabaseConfig::default()
    };
    let db = DatabaseManager::new(&config).await.expect("connect");
    db.ensure_schema().await.expect("schema");
    db
}

fn new_inquiry(tag: &str, status: InquiryStatus, hours_ago: i64) -> NewInquiry {
    NewInquiry {
        name: tag.to_string(),
        email: format!("{tag}@example.com"),
        message: "pg store test".to_string(),
        intent: "General".to_string(),
        sentiment: Sentiment::Negative,
        urgency: Urgency::Low,
        priority: Priority::High,
        status,
        created_at: Utc::now() - Duration::hours(hours_ago),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_get_update_roundtrip() {
    let db = connect().await;
    let store = db.inquiry_store();

    let created = store
        .insert(new_inquiry("pg-roundtrip", InquiryStatus::Open, 0))
        .await
        .unwrap();
    assert!(created.id > 0);

    let updated = store
        .update_status(created.id, InquiryStatus::InProgress)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, InquiryStatus::InProgress);
    assert_eq!(updated.priority, Priority::High);

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, InquiryStatus::InProgress);
    assert_eq!(store.update_status(-1, InquiryStatus::Closed).await.unwrap(), None);

    let filter = InquiryFilter {
        id: Some(created.id),
        status: Some(InquiryStatus::InProgress),
        ..Default::default()
    };
    assert_eq!(store.count(&filter).await.unwrap(), 1);
    let listed = store.list(&filter, SortDirection::Ascending).await.unwrap();
    assert_eq!(listed.len(), 1);

    db.close().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_open_selection() {
    let db = connect().await;
    let store = db.inquiry_store();

    let stale = store
        .insert(new_inquiry("pg-stale", InquiryStatus::Open, 49))
        .await
        .unwrap();
    let fresh = store
        .insert(new_inquiry("pg-fresh", InquiryStatus::Open, 47))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::hours(48);
    let selected: Vec<i64> = store
        .list_stale_open(cutoff)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert!(selected.contains(&stale.id));
    assert!(!selected.contains(&fresh.id));

    // keep later sweeps clean
    store.update_status(stale.id, InquiryStatus::Closed).await.unwrap();
    db.close().await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_account_store() {
    let db = connect().await;
    let accounts = db.account_store();
    let username = format!("pg-admin-{}", Utc::now().timestamp_micros());

    let created = accounts.create(&username, "hash-1").await.unwrap();
    assert!(accounts.update_password_hash(&username, "hash-2").await.unwrap());

    let found = accounts.find_by_username(&username).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, "hash-2");
    assert!(!accounts.update_password_hash("pg-nobody", "x").await.unwrap());

    db.close().await;
}

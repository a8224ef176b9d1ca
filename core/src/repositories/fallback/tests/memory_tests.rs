//! Unit tests for the in-memory fallback store

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::entities::FallbackEntry;
use crate::domain::value_objects::CodePurpose;
use crate::repositories::fallback::{FallbackStore, InMemoryFallbackStore};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

fn entry(code: &str, purpose: CodePurpose) -> FallbackEntry {
    FallbackEntry::new("a@x.com", code, purpose, t0() + Duration::minutes(10))
}

#[tokio::test]
async fn test_lookup_and_consume_deletes_on_match() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("123456", CodePurpose::EmailVerification), t0()).await.unwrap();

    assert!(store
        .lookup_and_consume("a@x.com", "123456", CodePurpose::EmailVerification, t0())
        .await
        .unwrap());
    assert!(!store
        .lookup_and_consume("a@x.com", "123456", CodePurpose::EmailVerification, t0())
        .await
        .unwrap());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_wrong_code_leaves_entry_in_place() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("123456", CodePurpose::EmailVerification), t0()).await.unwrap();

    assert!(!store
        .lookup_and_consume("a@x.com", "000000", CodePurpose::EmailVerification, t0())
        .await
        .unwrap());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_store_replaces_previous_entry() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("111111", CodePurpose::PasswordReset), t0()).await.unwrap();
    store.store(entry("222222", CodePurpose::PasswordReset), t0()).await.unwrap();

    assert_eq!(store.len().await, 1);
    assert!(!store
        .peek("a@x.com", "111111", CodePurpose::PasswordReset, t0())
        .await
        .unwrap());
    assert!(store
        .peek("a@x.com", "222222", CodePurpose::PasswordReset, t0())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_purposes_are_separate_keys() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("123456", CodePurpose::EmailVerification), t0()).await.unwrap();

    assert!(!store
        .lookup_and_consume("a@x.com", "123456", CodePurpose::PasswordReset, t0())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_expired_entry_is_not_accepted() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("123456", CodePurpose::EmailVerification), t0()).await.unwrap();

    let later = t0() + Duration::minutes(10);
    assert!(!store
        .lookup_and_consume("a@x.com", "123456", CodePurpose::EmailVerification, later)
        .await
        .unwrap());

    assert_eq!(store.purge_expired(later).await.unwrap(), 1);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_discard() {
    let store = InMemoryFallbackStore::new();
    store.store(entry("123456", CodePurpose::EmailVerification), t0()).await.unwrap();

    assert!(store.discard("a@x.com", CodePurpose::EmailVerification).await.unwrap());
    assert!(!store.discard("a@x.com", CodePurpose::EmailVerification).await.unwrap());
}

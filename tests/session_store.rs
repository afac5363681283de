//! Integration tests for session persistence across store instances.
//!
//! Each case opens its own in-memory database.

use proptest::prelude::*;
use rssdeck::api::UserRecord;
use rssdeck::session::{SessionStore, SESSION_KEY};
use rssdeck::storage::Database;
use serde_json::json;

fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(fut)
}

/// Restoring `content` must report no session, empty the slot, and stay that way.
async fn assert_discarded(content: &str) {
    let db = Database::open(":memory:").await.unwrap();
    db.set_preference(SESSION_KEY, content).await.unwrap();
    let store = SessionStore::new(db.clone());

    assert!(store.restore().await.is_none());
    assert!(!store.is_active());
    assert_eq!(db.get_preference(SESSION_KEY).await.unwrap(), None);

    // A second restore sees the emptied slot
    assert!(store.restore().await.is_none());
    assert_eq!(db.get_preference(SESSION_KEY).await.unwrap(), None);
}

/// Text that cannot hold a usable user record: not JSON at all, or JSON
/// whose username or API key is missing or blank.
fn unusable_content() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\PC*".prop_filter("must not decode as a complete user", |s| {
            serde_json::from_str::<UserRecord>(s)
                .map(|u| u.username.trim().is_empty() || u.api_key.trim().is_empty())
                .unwrap_or(true)
        }),
        ("[a-z]{0,8}", prop_oneof![Just(String::new()), Just("   ".to_string())]).prop_map(
            |(username, api_key)| json!({"Username": username, "ApiKey": api_key}).to_string()
        ),
        "[a-z]{1,8}".prop_map(|username| json!({"Username": username}).to_string()),
        Just("null".to_string()),
        Just("[]".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_unusable_session_is_discarded(content in unusable_content()) {
        block_on(assert_discarded(&content));
    }
}

#[tokio::test]
async fn test_session_survives_restart() {
    let db = Database::open(":memory:").await.unwrap();
    let record: UserRecord = serde_json::from_value(json!({
        "ID": "u-1",
        "Username": "alice",
        "ApiKey": "key-123",
        "CreatedAt": "2024-03-01T10:00:00Z"
    }))
    .unwrap();
    SessionStore::new(db.clone())
        .establish(record.clone())
        .await
        .unwrap();

    let restored = SessionStore::new(db).restore().await.unwrap();
    assert_eq!(restored.identity(), "alice");
    assert_eq!(restored.raw(), &record);
}

#[tokio::test]
async fn test_clear_then_restore_is_absent() {
    let db = Database::open(":memory:").await.unwrap();
    let store = SessionStore::new(db.clone());
    store
        .establish(
            serde_json::from_value(json!({"Username": "alice", "ApiKey": "key-123"})).unwrap(),
        )
        .await
        .unwrap();
    store.clear().await.unwrap();

    assert!(SessionStore::new(db).restore().await.is_none());
}

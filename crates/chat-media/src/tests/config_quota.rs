use crate::{adapters::ConfigQuota, config::AccountConfig};

use chat_media_core::QuotaSource;

fn account(limit: u32, is_premium: bool) -> AccountConfig {
    AccountConfig {
        owner_id: "user-1".to_string(),
        quota_limit: limit,
        is_premium,
    }
}

/// WHAT: Each recorded send shows up in the next snapshot
/// WHY: The quota gate reads the count before every capture
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_sends_recorded_when_snapshotting_then_count_advances() {
    // Given: A fresh free-tier quota of 2
    let quota = ConfigQuota::new(&account(2, false));
    assert!(quota.snapshot("user-1").await.unwrap().allows_capture());

    // When: Two sends are counted
    quota.record_send();
    quota.record_send();

    // Then: Nothing left, capture refused
    let snapshot = quota.snapshot("user-1").await.unwrap();
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.remaining(), 0);
    assert!(!snapshot.allows_capture());
}

/// WHAT: Premium accounts are admitted past the limit
/// WHY: Only the free tier is limited
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_premium_account_over_limit_when_snapshotting_then_allowed() {
    let quota = ConfigQuota::new(&account(1, true));
    quota.record_send();
    quota.record_send();

    let snapshot = quota.snapshot("user-1").await.unwrap();

    assert!(snapshot.is_premium);
    assert!(snapshot.allows_capture());
}

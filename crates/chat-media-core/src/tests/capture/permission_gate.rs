use crate::{
    Permission, PermissionGate,
    tests::fakes::FakePermissions,
};

use std::sync::Arc;

/// WHAT: Platforms without a permission model always grant
/// WHY: Web and desktop hosts have no capture sandbox to ask
#[tokio::test]
async fn given_unrestricted_platform_when_requesting_then_granted_without_prompt() {
    // Given: An unrestricted platform (whose provider would deny if asked)
    let provider = Arc::new(FakePermissions::unrestricted());
    let gate = PermissionGate::new(Arc::clone(&provider) as _);

    // When: Requesting
    let granted = gate.request().await;

    // Then: Granted, nobody prompted
    assert!(granted);
    assert_eq!(provider.requests(), 0);
}

/// WHAT: All three permissions are requested and a grant is remembered
/// WHY: The flow asks once, not on every capture
#[tokio::test]
async fn given_all_granted_when_requesting_twice_then_prompted_once() {
    // Given: A sandboxed platform granting everything
    let provider = Arc::new(FakePermissions::granting());
    let gate = PermissionGate::new(Arc::clone(&provider) as _);

    // When: Requesting twice
    let first = gate.request().await;
    let second = gate.request().await;

    // Then: Granted both times, three prompts total
    assert!(first);
    assert!(second);
    assert_eq!(provider.requests(), 3);
}

/// WHAT: Denying any one permission closes the gate
/// WHY: No partial-permission mode exists, even for photo-only use
#[tokio::test]
async fn given_microphone_denied_when_requesting_then_gate_closed_and_asked_again() {
    // Given: A platform denying only the microphone
    let provider = Arc::new(FakePermissions::denying(Permission::Microphone));
    let gate = PermissionGate::new(Arc::clone(&provider) as _);

    // When: Requesting twice
    let first = gate.request().await;
    let second = gate.request().await;

    // Then: Denied both times, denial not cached
    assert!(!first);
    assert!(!second);
    assert_eq!(provider.requests(), 6);
}

/// WHAT: A failing permission service counts as denial
/// WHY: An unanswered prompt must not open the microphone
#[tokio::test]
async fn given_broken_provider_when_requesting_then_denied() {
    // Given: A provider erroring on every request
    let gate = PermissionGate::new(Arc::new(FakePermissions::broken()));

    // When/Then: Denied
    assert!(!gate.request().await);
}

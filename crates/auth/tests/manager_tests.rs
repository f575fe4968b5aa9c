//! Behavioural tests for the auth state manager over the mock backend.

use ayf_auth::testing::MockAuthApi;
use ayf_auth::{AuthManager, AuthOutcome, Identity, SignIn, SignUp};
use ayf_store::UserMetadata;

const ADMIN_DOMAIN: &str = "gwarinpaayf.org";

fn metadata_with_role(role: &str) -> UserMetadata {
    UserMetadata {
        role: Some(role.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn sign_in_success_installs_session_and_notifies() {
    let api = MockAuthApi::new().with_user("member@example.com", "hunter2", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);
    let mut changes = manager.subscribe();

    let outcome = manager.sign_in("member@example.com", "hunter2").await;

    match outcome {
        SignIn::Granted { user } => {
            assert_eq!(user.email.as_deref(), Some("member@example.com"))
        }
        SignIn::Denied { message } => panic!("unexpected denial: {message}"),
    }

    assert!(manager.is_authenticated());

    let change = changes.try_recv().expect("a change should be published");
    assert_eq!(
        change.user.and_then(|u| u.email),
        Some("member@example.com".to_string())
    );
    assert!(change.session.is_some());
}

#[tokio::test]
async fn sign_in_failure_is_a_value_not_an_error() {
    let api = MockAuthApi::new().with_user("member@example.com", "hunter2", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);
    let mut changes = manager.subscribe();

    let outcome = manager.sign_in("member@example.com", "wrong-password").await;

    assert!(matches!(outcome, SignIn::Denied { .. }));
    assert!(!manager.is_authenticated());
    assert!(changes.try_recv().is_err(), "no change on failed sign-in");
}

#[tokio::test]
async fn sign_up_signals_pending_confirmation_without_session() {
    let api = MockAuthApi::new().requiring_confirmation();
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    let outcome = manager
        .sign_up("new@example.com", "hunter2", Default::default())
        .await;

    assert!(matches!(outcome, SignUp::AwaitingConfirmation { .. }));
    assert!(!manager.is_authenticated());
}

#[tokio::test]
async fn sign_up_with_immediate_session_is_active() {
    let api = MockAuthApi::new();
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    let outcome = manager
        .sign_up("new@example.com", "hunter2", Default::default())
        .await;

    assert!(matches!(outcome, SignUp::Active { .. }));
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn sign_out_is_idempotent() {
    let api = MockAuthApi::new().with_user("member@example.com", "hunter2", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    // No session yet: still fine.
    assert_eq!(manager.sign_out().await, AuthOutcome::Ok);

    manager.sign_in("member@example.com", "hunter2").await;
    assert_eq!(manager.sign_out().await, AuthOutcome::Ok);
    assert!(!manager.is_authenticated());

    // And again, after the session is gone.
    assert_eq!(manager.sign_out().await, AuthOutcome::Ok);
}

#[tokio::test]
async fn sign_out_clears_session_even_when_revoke_fails() {
    let api = MockAuthApi::new()
        .with_user("member@example.com", "hunter2", Default::default())
        .failing_sign_out();
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    manager.sign_in("member@example.com", "hunter2").await;
    let outcome = manager.sign_out().await;

    assert!(matches!(outcome, AuthOutcome::Failed { .. }));
    assert!(!manager.is_authenticated(), "local session must be cleared");
}

#[tokio::test]
async fn refresh_failure_clears_the_prior_session() {
    let api = MockAuthApi::new()
        .with_user("member@example.com", "hunter2", Default::default())
        .failing_refresh();
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);
    manager.sign_in("member@example.com", "hunter2").await;

    let mut changes = manager.subscribe();
    let outcome = manager.refresh_session().await;

    assert!(matches!(outcome, AuthOutcome::Failed { .. }));
    assert!(!manager.is_authenticated());

    let change = changes.try_recv().expect("clearing publishes a change");
    assert!(change.user.is_none());
}

#[tokio::test]
async fn refresh_replaces_the_session_tokens() {
    let api = MockAuthApi::new().with_user("member@example.com", "hunter2", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);
    manager.sign_in("member@example.com", "hunter2").await;

    let before = manager.current_session().unwrap().access_token;
    assert_eq!(manager.refresh_session().await, AuthOutcome::Ok);
    let after = manager.current_session().unwrap().access_token;

    assert_ne!(before, after);
}

#[tokio::test]
async fn role_predicates_follow_metadata_and_domain() {
    let api = MockAuthApi::new()
        .with_user("admin@example.com", "pw", metadata_with_role("admin"))
        .with_user("editor@example.com", "pw", metadata_with_role("editor"))
        .with_user("member@example.com", "pw", Default::default())
        .with_user("staff@gwarinpaayf.org", "pw", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    manager.sign_in("member@example.com", "pw").await;
    assert!(!manager.is_admin());
    assert!(!manager.is_editor());

    manager.sign_in("editor@example.com", "pw").await;
    assert!(!manager.is_admin());
    assert!(manager.is_editor());

    manager.sign_in("admin@example.com", "pw").await;
    assert!(manager.is_admin());
    assert!(manager.is_editor(), "admin implies editor");

    // Privileged domain allowlist, no role claim needed.
    manager.sign_in("staff@gwarinpaayf.org", "pw").await;
    assert!(manager.is_admin());
}

#[tokio::test]
async fn update_profile_refreshes_cached_user_and_notifies() {
    let api = MockAuthApi::new().with_user("member@example.com", "pw", Default::default());
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);
    manager.sign_in("member@example.com", "pw").await;

    let mut changes = manager.subscribe();
    let outcome = manager.update_profile(metadata_with_role("editor")).await;

    assert_eq!(outcome, AuthOutcome::Ok);
    assert!(manager.is_editor());

    let change = changes.try_recv().expect("profile update publishes a change");
    assert_eq!(
        change.user.unwrap().role(),
        Some("editor"),
        "notification carries the refreshed user"
    );
}

#[tokio::test]
async fn update_password_requires_a_session() {
    let api = MockAuthApi::new();
    let manager = AuthManager::with_api(api, ADMIN_DOMAIN);

    let outcome = manager.update_password("new-password").await;
    assert!(matches!(outcome, AuthOutcome::Failed { .. }));
}

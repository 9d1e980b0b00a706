mod common;

use chrono::Duration;
use common::{harness, FailingStore, ManualClock};
use course_assistant_core::auth::{
    AdminAuthenticator, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
use course_assistant_core::ports::DatabaseService;
use course_assistant_core::{AuthError, SessionStatus};
use std::sync::Arc;

fn valid_for(username: &str) -> SessionStatus {
    SessionStatus::Valid {
        username: username.to_string(),
    }
}

#[tokio::test]
async fn seeded_admin_logs_in_on_first_run() {
    let h = harness().await;
    let session = h
        .state
        .auth
        .authenticate(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
        .await
        .expect("default admin authenticates");
    assert!(!session.token.is_empty());
    assert_eq!(session.username, "admin");
    assert_eq!(session.expires_at, common::t0() + Duration::hours(24));
}

#[tokio::test]
async fn seeding_happens_only_once() {
    let h = harness().await;
    assert!(!h.state.auth.ensure_default_admin().await.expect("second seed"));
    assert_eq!(h.db.count_admins().await.expect("count"), 1);
}

#[tokio::test]
async fn wrong_password_or_unknown_user_is_rejected() {
    let h = harness().await;
    let attempts = [
        ("admin", "admin124"),
        ("root", "admin123"),
        ("", ""),
        ("Admin", "admin123"),
    ];
    for (user, pass) in attempts {
        let err = h.state.auth.authenticate(user, pass).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials), "{user}/{pass}");
    }
}

#[tokio::test]
async fn fresh_token_validates_immediately() {
    let h = harness().await;
    let session = h.state.auth.authenticate("admin", "admin123").await.expect("login");
    assert_eq!(
        h.state.auth.validate_session(Some(session.token.as_str())).await,
        valid_for("admin")
    );
}

#[tokio::test]
async fn empty_or_unknown_tokens_fail_closed() {
    let h = harness().await;
    h.state.auth.authenticate("admin", "admin123").await.expect("login");
    assert_eq!(h.state.auth.validate_session(None).await, SessionStatus::Invalid);
    assert_eq!(h.state.auth.validate_session(Some("")).await, SessionStatus::Invalid);
    assert_eq!(h.state.auth.validate_session(Some("   ")).await, SessionStatus::Invalid);
    assert_eq!(
        h.state.auth.validate_session(Some("0123456789abcdef")).await,
        SessionStatus::Invalid
    );
}

#[tokio::test]
async fn token_expires_after_a_day_without_use() {
    let h = harness().await;
    let session = h.state.auth.authenticate("admin", "admin123").await.expect("login");

    h.clock.advance(Duration::hours(24) + Duration::seconds(1));
    assert_eq!(
        h.state.auth.validate_session(Some(session.token.as_str())).await,
        SessionStatus::Invalid
    );
}

#[tokio::test]
async fn token_is_still_live_at_exactly_one_day() {
    let h = harness().await;
    let session = h.state.auth.authenticate("admin", "admin123").await.expect("login");

    h.clock.advance(Duration::hours(24));
    assert!(h.state.auth.validate_session(Some(session.token.as_str())).await.is_valid());
}

#[tokio::test]
async fn validation_slides_the_expiry_window() {
    let h = harness().await;
    let session = h.state.auth.authenticate("admin", "admin123").await.expect("login");
    let token = Some(session.token.as_str());

    h.clock.advance(Duration::hours(1));
    assert!(h.state.auth.validate_session(token).await.is_valid());
    h.clock.advance(Duration::hours(1));
    assert!(h.state.auth.validate_session(token).await.is_valid());

    // t+2h+23h is past the original t+24h deadline but inside the slid one.
    h.clock.advance(Duration::hours(23));
    assert!(h.state.auth.validate_session(token).await.is_valid());

    h.clock.advance(Duration::hours(24) + Duration::minutes(1));
    assert!(!h.state.auth.validate_session(token).await.is_valid());
}

#[tokio::test]
async fn new_login_supersedes_the_previous_token() {
    let h = harness().await;
    let first = h.state.auth.authenticate("admin", "admin123").await.expect("first login");
    let second = h.state.auth.authenticate("admin", "admin123").await.expect("second login");

    assert_ne!(first.token, second.token);
    assert_eq!(
        h.state.auth.validate_session(Some(first.token.as_str())).await,
        SessionStatus::Invalid
    );
    assert!(h.state.auth.validate_session(Some(second.token.as_str())).await.is_valid());
}

#[tokio::test]
async fn logout_clears_the_session_slot() {
    let h = harness().await;
    let session = h.state.auth.authenticate("admin", "admin123").await.expect("login");

    h.state.auth.logout(&session.token).await.expect("logout");
    assert_eq!(
        h.state.auth.validate_session(Some(session.token.as_str())).await,
        SessionStatus::Invalid
    );
    // Unknown and repeated logouts are harmless.
    h.state.auth.logout(&session.token).await.expect("repeat logout");
    h.state.auth.logout("").await.expect("empty logout");
}

#[tokio::test]
async fn store_fault_during_validation_is_invalid_not_an_error() {
    let auth = AdminAuthenticator::new(Arc::new(FailingStore), ManualClock::new(common::t0()));
    assert_eq!(
        auth.validate_session(Some("any-token")).await,
        SessionStatus::Invalid
    );
}

#[tokio::test]
async fn store_fault_during_login_is_reported_as_storage() {
    let auth = AdminAuthenticator::new(Arc::new(FailingStore), ManualClock::new(common::t0()));
    let err = auth.authenticate("admin", "admin123").await.unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
}

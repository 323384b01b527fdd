//! Auth gate behaviour against the in-memory backend

mod common;

use std::sync::Arc;

use common::MockBackend;
use sacco_client::session::{EMPTY_CREDENTIALS_MESSAGE, login_error_message};
use sacco_client::{
    Access, AdminPanel, AuthState, Capability, ClientConfig, ClientError, Role, Section,
    SessionHandle,
};

fn backend() -> MockBackend {
    MockBackend::new()
        .with_user(1, "admin", "admin-pass", Role::SuperAdmin)
        .with_user(2, "manager", "manager-pass", Role::MemberManager)
        .with_user(3, "verifier", "verifier-pass", Role::VerificationViewer)
        .with_user(4, "corrector", "corrector-pass", Role::CorrectionViewer)
        .with_members(3)
}

#[tokio::test]
async fn check_restores_existing_session() {
    let backend = backend().logged_in_as(2);
    let session = SessionHandle::new();

    let state = session.check(&backend).await;
    assert!(matches!(state, AuthState::Authenticated(ref u) if u.username == "manager"));
    assert!(session.can(Capability::ManageMembers));
    assert!(!session.can(Capability::ManageUsers));
}

#[tokio::test]
async fn anonymous_visitor_is_denied_without_error() {
    let backend = backend();
    let session = SessionHandle::new();

    assert_eq!(session.check(&backend).await, AuthState::Anonymous);
    assert_eq!(session.guard(), Access::Denied);
    assert_eq!(session.guard_capability(Capability::ViewVerifications), Access::Denied);
}

#[tokio::test]
async fn nothing_protected_while_check_is_pending() {
    let backend = MockBackend::new().with_members(3);
    let shared: Arc<dyn sacco_client::Backend> = Arc::new(backend.clone());
    let session = SessionHandle::new();
    let mut panel = AdminPanel::new(shared, session.clone(), &ClientConfig::default());

    assert_eq!(session.guard(), Access::Pending);
    assert!(panel.visible_sections().is_empty());
    assert!(panel.members.items().is_empty());

    let err = panel.enter().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn blank_credentials_fail_locally() {
    let backend = backend();
    let session = SessionHandle::new();

    let err = session.login(&backend, "  ", "admin-pass").await.unwrap_err();
    assert_eq!(login_error_message(&err), EMPTY_CREDENTIALS_MESSAGE);
    let err = session.login(&backend, "admin", "").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(backend.count("login"), 0);
}

#[tokio::test]
async fn failed_login_surfaces_server_error() {
    let backend = backend();
    let session = SessionHandle::new();

    let err = session.login(&backend, "admin", "wrong").await.unwrap_err();
    assert_eq!(login_error_message(&err), "Invalid username or password");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn login_lands_on_role_section() {
    let cases = [
        ("admin", "admin-pass", Section::Members),
        ("manager", "manager-pass", Section::Members),
        ("verifier", "verifier-pass", Section::Verifications),
        ("corrector", "corrector-pass", Section::Corrections),
    ];

    for (username, password, expected) in cases {
        let backend = backend();
        let session = SessionHandle::new();
        let user = session.login(&backend, username, password).await.unwrap();
        assert_eq!(user.username, username);

        let mut panel = AdminPanel::new(
            Arc::new(backend.clone()),
            session.clone(),
            &ClientConfig::default(),
        );
        panel.enter().await.unwrap();
        assert_eq!(panel.section(), expected, "{username}");
        assert!(panel.stats().is_some());
    }
}

#[tokio::test]
async fn sections_are_hidden_by_capability() {
    let backend = backend().logged_in_as(3);
    let session = SessionHandle::new();
    session.check(&backend).await;
    let panel = AdminPanel::new(Arc::new(backend), session, &ClientConfig::default());

    assert_eq!(
        panel.visible_sections(),
        vec![Section::Verifications, Section::SearchLogs]
    );
}

#[tokio::test]
async fn logout_clears_local_state_even_when_offline() {
    let backend = backend().logged_in_as(1);
    let session = SessionHandle::new();
    session.check(&backend).await;

    backend.go_offline();
    session.logout(&backend).await;
    assert_eq!(session.state(), AuthState::Anonymous);
    assert_eq!(backend.count("logout"), 1);
}

#[tokio::test]
async fn expired_session_logs_everyone_out() {
    let backend = backend().logged_in_as(1);
    let session = SessionHandle::new();
    session.check(&backend).await;
    let mut panel = AdminPanel::new(
        Arc::new(backend.clone()),
        session.clone(),
        &ClientConfig::default(),
    );
    panel.enter().await.unwrap();

    backend.expire_session();
    let err = panel.refresh().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(
        panel.notice.error_message(),
        Some("Session expired. Please login again.")
    );
    assert_eq!(session.guard(), Access::Denied);
}

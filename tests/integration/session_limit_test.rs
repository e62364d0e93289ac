//! Integration tests for the concurrent-session cap.

mod helpers;

use futures::future::join_all;
use http::StatusCode;

use formgate_core::config::{AppConfig, OverflowStrategy};

#[tokio::test]
async fn test_second_login_is_rejected_and_first_survives() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut first = app.client();
    first.login_ok("alice", "password123").await;

    let mut second = app.client();
    let response = second.login("alice", "password123").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login?error=session_limit"));

    assert_eq!(first.get("/my").await.status, StatusCode::OK);
    assert_eq!(second.get_json("/my").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.sessions.active_sessions("alice").await, 1);
}

#[tokio::test]
async fn test_logout_frees_the_slot() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut first = app.client();
    first.login_ok("alice", "password123").await;
    first.get("/logout").await;

    let mut second = app.client();
    second.login_ok("alice", "password123").await;
    assert_eq!(second.get("/my").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_relogin_on_same_session_does_not_count() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    client.login_ok("alice", "password123").await;
    let before = client.session.clone();

    client.login_ok("alice", "password123").await;
    assert_ne!(client.session, before);
    assert_eq!(app.state.sessions.active_sessions("alice").await, 1);
}

#[tokio::test]
async fn test_other_users_are_not_limited() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;
    app.create_test_user("bob", "password123", "USER").await;

    let mut alice = app.client();
    alice.login_ok("alice", "password123").await;
    let mut bob = app.client();
    bob.login_ok("bob", "password123").await;
}

#[tokio::test]
async fn test_evict_oldest_logs_out_previous_session() {
    let mut config = AppConfig::default();
    config.session.limits.on_limit_exceeded = OverflowStrategy::EvictOldest;
    let app = helpers::TestApp::with_config(config).await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut first = app.client();
    first.login_ok("alice", "password123").await;

    let mut second = app.client();
    second.login_ok("alice", "password123").await;

    assert_eq!(second.get("/my").await.status, StatusCode::OK);
    let evicted = first.get("/my").await;
    assert_eq!(evicted.status, StatusCode::FOUND);
    assert_eq!(evicted.location(), Some("/login"));
    assert_eq!(app.state.sessions.active_sessions("alice").await, 1);
}

#[tokio::test]
async fn test_higher_cap_allows_that_many_sessions() {
    let mut config = AppConfig::default();
    config.session.limits.max_sessions = 2;
    let app = helpers::TestApp::with_config(config).await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut first = app.client();
    first.login_ok("alice", "password123").await;
    let mut second = app.client();
    second.login_ok("alice", "password123").await;

    let mut third = app.client();
    let response = third.login("alice", "password123").await;
    assert_eq!(response.location(), Some("/login?error=session_limit"));
}

#[tokio::test]
async fn test_concurrent_logins_grant_exactly_one_session() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut clients: Vec<_> = (0..6).map(|_| app.client()).collect();
    for client in &mut clients {
        client.fetch_csrf_token().await;
    }

    let responses = join_all(clients.iter_mut().map(|client| {
        client.post_form(
            "/loginProc",
            &[("username", "alice"), ("password", "password123")],
        )
    }))
    .await;

    let granted = responses
        .iter()
        .filter(|r| r.location() == Some("/"))
        .count();
    let refused = responses
        .iter()
        .filter(|r| r.location() == Some("/login?error=session_limit"))
        .count();

    assert_eq!(granted, 1);
    assert_eq!(refused, 5);
    assert_eq!(app.state.sessions.active_sessions("alice").await, 1);
}

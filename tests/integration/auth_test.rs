//! Integration tests for the form login flow.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_login_rotates_session_and_redirects_home() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    client.fetch_csrf_token().await;
    let anonymous = client.session.clone().expect("login page issues a session");

    let response = client
        .post_form("/loginProc", &[("username", "alice"), ("password", "password123")])
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
    let authenticated = client.session.clone().expect("login sets a session cookie");
    assert_ne!(anonymous, authenticated);

    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body["user"]["username"], "alice");
    assert_eq!(home.body["user"]["role"], "USER");
}

#[tokio::test]
async fn test_pre_login_identifier_is_not_authenticated() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    client.fetch_csrf_token().await;
    let anonymous = client.session.clone();
    client.login_ok("alice", "password123").await;

    let mut attacker = app.client().with_session(anonymous);
    let response = attacker.get_json("/my").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let wrong = client.login("alice", "wrongpassword").await;
    let unknown = client.login("nobody", "password123").await;

    for response in [&wrong, &unknown] {
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/login?error=invalid_credentials"));
    }

    let page = client.get("/login?error=invalid_credentials").await;
    assert_eq!(page.body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let response = client.login("ALICE", "password123").await;
    assert_eq!(response.location(), Some("/login?error=invalid_credentials"));
}

#[tokio::test]
async fn test_login_without_csrf_token_is_rejected() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let response = client
        .post_form("/loginProc", &[("username", "alice"), ("password", "password123")])
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("CSRF_REJECTED"));
}

#[tokio::test]
async fn test_csrf_token_is_accepted_from_header() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let token = client.fetch_csrf_token().await;
    client.csrf_token = None;

    let body = serde_urlencoded::to_string([("username", "alice"), ("password", "password123")])
        .expect("encode");
    let response = client
        .send(
            "POST",
            "/loginProc",
            &[
                (
                    http::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                ),
                (
                    http::header::HeaderName::from_static("x-csrf-token"),
                    token.as_str(),
                ),
            ],
            Some(body),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
}

#[tokio::test]
async fn test_login_returns_to_saved_request() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let challenge = client.get("/my/orders?page=2").await;
    assert_eq!(challenge.status, StatusCode::FOUND);
    assert_eq!(challenge.location(), Some("/login"));

    let response = client.login("alice", "password123").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/my/orders?page=2"));

    let page = client.get("/my/orders").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["path"], "/my/orders");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    client.login_ok("alice", "password123").await;
    let old_session = client.session.clone();

    let response = client.get("/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));
    assert!(client.session.is_none(), "logout clears the cookie");

    let mut replay = app.client().with_session(old_session);
    let response = replay.get("/my").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login"));

    assert_eq!(app.state.sessions.active_sessions("alice").await, 0);
}

#[tokio::test]
async fn test_logout_without_session_redirects_to_login() {
    let app = helpers::TestApp::new().await;

    let mut client = app.client();
    let response = client.get("/logout").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_after_challenged_logout_goes_home() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let challenge = client.get("/logout").await;
    assert_eq!(challenge.location(), Some("/login"));

    let response = client.login("alice", "password123").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/"));

    assert_eq!(client.get("/my").await.status, StatusCode::OK);
    assert_eq!(app.state.sessions.active_sessions("alice").await, 1);
}

#[tokio::test]
async fn test_failure_url_without_query_gets_reason_parameter() {
    let mut config = formgate_core::config::AppConfig::default();
    config.security.form_login.failure_url = "/login".to_string();
    let app = helpers::TestApp::with_config(config).await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut client = app.client();
    let response = client.login("alice", "wrongpassword").await;
    assert_eq!(response.location(), Some("/login?error=invalid_credentials"));
}

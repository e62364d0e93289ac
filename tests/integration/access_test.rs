//! Integration tests for path authorization.

mod helpers;

use http::StatusCode;

use formgate_core::config::{AppConfig, AuthorizationConfig};

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body["page"], "home");
    assert!(home.body.get("user").is_none());

    let join = client.get("/join").await;
    assert_eq!(join.status, StatusCode::OK);
    assert_eq!(join.body["form"]["action"], "/joinProc");
}

#[tokio::test]
async fn test_anonymous_browser_is_sent_to_login() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_anonymous_api_client_gets_401() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let response = client.get_json("/my").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("INVALID_SESSION"));
}

#[tokio::test]
async fn test_admin_page_requires_admin_role() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;
    app.create_test_user("root", "password123", "ROLE_ADMIN").await;

    let mut user = app.client();
    user.login_ok("alice", "password123").await;
    let denied = user.get("/admin").await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.error_code(), Some("AUTHORIZATION_DENIED"));

    let mut admin = app.client();
    admin.login_ok("root", "password123").await;
    let allowed = admin.get("/admin").await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["page"], "admin");
    assert_eq!(allowed.body["user"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_my_pages_allow_user_and_admin() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;
    app.create_test_user("root", "password123", "ADMIN").await;
    app.create_test_user("guest", "password123", "GUEST").await;

    for username in ["alice", "root"] {
        let mut client = app.client();
        client.login_ok(username, "password123").await;
        let page = client.get("/my/settings/profile").await;
        assert_eq!(page.status, StatusCode::OK, "{username}");
        assert_eq!(page.body["path"], "/my/settings/profile");
    }

    let mut guest = app.client();
    guest.login_ok("guest", "password123").await;
    assert_eq!(guest.get("/my/settings").await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unrouted_paths_are_still_gated() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", "USER").await;

    let mut anonymous = app.client();
    let response = anonymous.get("/reports/2024").await;
    assert_eq!(response.status, StatusCode::FOUND);

    let mut client = app.client();
    client.login_ok("alice", "password123").await;
    let response = client.get("/reports/2024").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_non_canonical_paths_are_rejected() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    for path in ["/my/../admin", "/login/%2e%2e/admin", "//admin"] {
        let response = client.get(path).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn test_hierarchical_roles_inherit_access() {
    let config = AppConfig {
        authorization: AuthorizationConfig::hierarchical(),
        ..AppConfig::default()
    };
    let app = helpers::TestApp::with_config(config).await;
    app.create_test_user("carol", "password123", "C").await;
    app.create_test_user("bert", "password123", "B").await;
    app.create_test_user("anna", "password123", "A").await;

    let mut c = app.client();
    c.login_ok("carol", "password123").await;
    for path in ["/", "/manager", "/admin"] {
        assert_eq!(c.get(path).await.status, StatusCode::OK, "C on {path}");
    }

    let mut b = app.client();
    b.login_ok("bert", "password123").await;
    assert_eq!(b.get("/manager").await.status, StatusCode::OK);
    assert_eq!(b.get("/admin").await.status, StatusCode::FORBIDDEN);

    let mut a = app.client();
    a.login_ok("anna", "password123").await;
    assert_eq!(a.get("/").await.status, StatusCode::OK);
    assert_eq!(a.get("/manager").await.status, StatusCode::FORBIDDEN);

    let mut anonymous = app.client();
    let response = anonymous.get("/").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login"));
}

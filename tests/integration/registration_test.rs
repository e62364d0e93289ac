//! Integration tests for account registration.

mod helpers;

use http::StatusCode;

use formgate_database::UserRepository;
use formgate_entity::user::Role;

async fn join(
    client: &mut helpers::TestClient,
    username: &str,
    password: &str,
) -> helpers::TestResponse {
    let page = client.get("/join").await;
    assert_eq!(page.status, StatusCode::OK);
    client.csrf_token = page.body["csrf_token"].as_str().map(str::to_string);

    client
        .post_form("/joinProc", &[("username", username), ("password", password)])
        .await
}

#[tokio::test]
async fn test_join_creates_user_with_default_role() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let response = join(&mut client, "bob", "password123").await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/login"));

    let user = app
        .state
        .users
        .find_by_username("bob")
        .await
        .expect("lookup")
        .expect("user stored");
    assert_eq!(user.role, Role::new("USER").expect("valid role"));
    assert_ne!(user.password_hash, "password123");

    client.login_ok("bob", "password123").await;
    let page = client.get("/my").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["user"]["role"], "USER");
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let first = join(&mut client, "bob", "password123").await;
    assert_eq!(first.status, StatusCode::FOUND);

    let second = join(&mut client, "bob", "other-password").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.error_code(), Some("DUPLICATE_USERNAME"));

    assert_eq!(app.state.users.count().await.expect("count"), 1);
}

#[tokio::test]
async fn test_invalid_username_is_rejected() {
    let app = helpers::TestApp::new().await;
    let mut client = app.client();

    let response = join(&mut client, "bad name", "password123").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION"));

    let response = join(&mut client, "carol", "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

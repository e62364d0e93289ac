//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use formgate_api::{AppState, build_app};
use formgate_core::config::{AppConfig, SeedUserConfig};
use formgate_database::MemoryUserRepository;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct access to the auth components
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with the default configuration
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    /// Create a test application over an in-memory credential store
    pub async fn with_config(config: AppConfig) -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let state = AppState::new(config.clone(), users).expect("Failed to build app state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            config,
        }
    }

    /// Create a user with the given role
    pub async fn create_test_user(&self, username: &str, password: &str, role: &str) {
        let created = self
            .state
            .registration
            .provision(&[SeedUserConfig {
                username: username.to_string(),
                password: password.to_string(),
                role: role.to_string(),
            }])
            .await
            .expect("Failed to create test user");
        assert_eq!(created, 1, "User {username} already exists");
    }

    /// A browser-like client with its own cookie
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie_name: self.config.session.cookie.name.clone(),
            csrf_parameter: self.config.security.csrf.parameter_name.clone(),
            session: None,
            csrf_token: None,
        }
    }
}

/// A client that keeps the session cookie and CSRF token between requests
pub struct TestClient {
    router: Router,
    cookie_name: String,
    csrf_parameter: String,
    /// Current session cookie value
    pub session: Option<String>,
    /// Last CSRF token handed out by a form page
    pub csrf_token: Option<String>,
}

impl TestClient {
    /// Replace the session cookie, e.g. to replay an old one
    pub fn with_session(mut self, session: Option<String>) -> Self {
        self.session = session;
        self
    }

    /// GET a page the way a browser would
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send("GET", path, &[], None).await
    }

    /// GET a page asking for JSON, the way an API client would
    pub async fn get_json(&mut self, path: &str) -> TestResponse {
        self.send("GET", path, &[(header::ACCEPT, "application/json")], None)
            .await
    }

    /// Load the login page and remember its CSRF token
    pub async fn fetch_csrf_token(&mut self) -> String {
        let response = self.get("/login").await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let token = response
            .body
            .get("csrf_token")
            .and_then(|v| v.as_str())
            .expect("No csrf_token on login page")
            .to_string();
        self.csrf_token = Some(token.clone());
        token
    }

    /// POST a urlencoded form, adding the CSRF token if one is known
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let mut pairs: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if let Some(token) = &self.csrf_token {
            pairs.push((self.csrf_parameter.clone(), token.clone()));
        }
        let body = serde_urlencoded::to_string(&pairs).expect("Failed to encode form");

        self.send(
            "POST",
            path,
            &[(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
            Some(body),
        )
        .await
    }

    /// Fetch a CSRF token and submit the login form
    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.fetch_csrf_token().await;
        self.post_form("/loginProc", &[("username", username), ("password", password)])
            .await
    }

    /// Log in and assert it succeeded
    pub async fn login_ok(&mut self, username: &str, password: &str) {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("/"), "Login failed: {response:?}");
    }

    /// Make an HTTP request to the test app
    pub async fn send(
        &mut self,
        method: &str,
        path: &str,
        headers: &[(header::HeaderName, &str)],
        body: Option<String>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        for (name, value) in headers {
            req = req.header(name, *value);
        }
        if let Some(session) = &self.session {
            req = req.header(header::COOKIE, format!("{}={}", self.cookie_name, session));
        }

        let req = req
            .body(Body::from(body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        self.track_cookie(&headers);

        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn track_cookie(&mut self, headers: &HeaderMap) {
        let prefix = format!("{}=", self.cookie_name);
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(rest) = value.strip_prefix(&prefix) else {
                continue;
            };
            let session = rest.split(';').next().unwrap_or_default();
            self.session = (!session.is_empty()).then(|| session.to_string());
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header of a redirect
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The machine-readable error code of an error response
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }
}

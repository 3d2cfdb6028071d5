#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header as http_header, HeaderMap, HeaderValue, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use justwrite::{build_router, models::Settings, state::AppState};

pub const VALID_TOKEN: &str = "valid-token";
pub const OTHER_USER_TOKEN: &str = "other-token";
pub const EXPIRED_TOKEN: &str = "expired-token";
pub const BROKEN_TOKEN: &str = "broken-token";
pub const GARBLED_TOKEN: &str = "garbled-token";
pub const GOOD_REFRESH: &str = "good-refresh";
pub const BAD_REFRESH: &str = "bad-refresh";
pub const FRESH_TOKEN: &str = "fresh-token";
pub const FRESH_REFRESH: &str = "fresh-refresh";
pub const FAIL_MARKER: &str = "FAIL_ANALYSIS";

pub const MODEL_RESPONSE: &str = "**PRODUCTIVITY SCORE:** 82/100\n\n\
KEY ACCOMPLISHMENTS:\n1. Did X\n2. Did Y\n\n\
AREAS FOR IMPROVEMENT:\n1. Sleep earlier\n\n\
ACTIONABLE TIPS:\n1. Plan tomorrow tonight";

fn user(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "created_at": "2024-03-20T08:00:00Z",
        "user_metadata": { "full_name": "Ada Lovelace" },
    })
}

fn grant(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 3600,
        "user": user("user-1", "ada@example.com"),
    })
}

async fn mount_json(server: &MockServer, mock: wiremock::MockBuilder, status: u16, body: Value, priority: u8) {
    mock.respond_with(ResponseTemplate::new(status).set_body_json(body))
        .with_priority(priority)
        .mount(server)
        .await;
}

/// Fake auth backend and chat-completions model on one mock server.
pub async fn mock_backends() -> MockServer {
    let server = MockServer::start().await;

    // Auth: current user
    for (token, id, email) in [
        (VALID_TOKEN, "user-1", "ada@example.com"),
        (FRESH_TOKEN, "user-1", "ada@example.com"),
        (OTHER_USER_TOKEN, "user-2", "grace@example.com"),
    ] {
        let mock = Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", format!("Bearer {}", token).as_str()));
        mount_json(&server, mock, 200, user(id, email), 1).await;
    }
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {}", BROKEN_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {}", GARBLED_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json"))
        .with_priority(1)
        .mount(&server)
        .await;
    let mock = Mock::given(method("GET")).and(path("/auth/v1/user"));
    mount_json(&server, mock, 401, json!({ "msg": "invalid JWT" }), 10).await;

    // Auth: token grants
    let mock = Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_partial_json(json!({ "refresh_token": GOOD_REFRESH })));
    mount_json(&server, mock, 200, grant(FRESH_TOKEN, FRESH_REFRESH), 1).await;
    let mock = Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_partial_json(
            json!({ "email": "ada@example.com", "password": "correct horse" }),
        ));
    mount_json(&server, mock, 200, grant(VALID_TOKEN, GOOD_REFRESH), 1).await;
    let mock = Mock::given(method("POST")).and(path("/auth/v1/token"));
    let rejected = json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" });
    mount_json(&server, mock, 400, rejected, 10).await;

    // Auth: sign up and sign out
    let mock = Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(body_partial_json(json!({ "email": "taken@example.com" })));
    mount_json(&server, mock, 422, json!({ "code": 422, "msg": "User already registered" }), 1).await;
    let mock = Mock::given(method("POST")).and(path("/auth/v1/signup"));
    mount_json(&server, mock, 200, user("user-3", "new@example.com"), 10).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    // Model
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(FAIL_MARKER))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .with_priority(1)
        .mount(&server)
        .await;
    let completion = json!({
        "choices": [{ "message": { "role": "assistant", "content": MODEL_RESPONSE } }]
    });
    let mock = Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"));
    mount_json(&server, mock, 200, completion, 10).await;

    server
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _backend: MockServer,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(http_header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(http_header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let backend = mock_backends().await;
        let url = backend.uri();
        Self::build(&url, backend)
    }

    /// Auth requests go to `auth_url`; the model is still mocked.
    pub async fn with_auth_url(auth_url: &str) -> Self {
        let backend = mock_backends().await;
        Self::build(auth_url, backend)
    }

    fn build(auth_url: &str, backend: MockServer) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.auth.url = auth_url.to_string();
        settings.auth.anon_key = "anon".to_string();
        settings.ai.base_url = format!("{}/v1", backend.uri());
        settings.ai.api_key = "test-key".to_string();
        settings.storage.database_path = dir.path().join("journal.db").to_string_lossy().to_string();

        let state = AppState::new(settings).unwrap();
        Self {
            router: build_router(state.clone()),
            state,
            _backend: backend,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("GET", path, cookie, None)).await
    }

    pub async fn post_json(&self, path: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(request("POST", path, cookie, Some(body))).await
    }
}

pub fn access_cookie(token: &str) -> String {
    format!("sb-auth-access-token={}", token)
}

pub fn session_cookie(access: &str, refresh: &str) -> String {
    format!("sb-auth-access-token={}; sb-auth-refresh-token={}", access, refresh)
}

pub fn request(method: &str, path: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(http_header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    match body {
        Some(body) => builder
            .header(http_header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

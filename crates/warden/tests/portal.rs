//! End-to-end tests of the HTTP surface, driven through the router.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tower::ServiceExt;
use warden::prelude::*;

// =========================================================================
// Mock exchange
// =========================================================================

/// Hands out a fixed session token (or error), optionally after a delay.
#[derive(Clone)]
struct MockExchange {
    result: Result<String, SessionError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl MockExchange {
    fn issuing(token: String) -> Self {
        Self {
            result: Ok(token),
            delay: Duration::ZERO,
            calls: Arc::default(),
            completed: Arc::default(),
        }
    }

    fn failing(error: SessionError) -> Self {
        Self {
            result: Err(error),
            ..Self::issuing(String::new())
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl SessionExchange for MockExchange {
    async fn exchange(&self, id_token: &IdentityToken) -> Result<SessionToken, SessionError> {
        assert_eq!(id_token.as_str(), "abc123");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map(SessionToken::new)
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Unsigned session token for `role`, expiring `ttl` seconds from now.
fn session_token(role: &str, ttl: i64) -> String {
    let payload = json!({
        "sub": "user-1",
        "sui_address": "0xabc",
        "role": role,
        "iat": now_secs() - 60,
        "exp": now_secs() + ttl,
    });
    format!(
        "{}.{}.c2ln",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"ES256"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

fn app(exchange: MockExchange) -> axum::Router {
    warden::router(WardenConfig::default(), exchange)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = cookie {
        builder = builder.header(header::COOKIE, format!("admin_session={value}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Guard
// =========================================================================

#[tokio::test]
async fn test_protected_route_without_cookie_redirects_to_login() {
    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/dashboard/orders", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?redirect=/dashboard/orders");
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_protected_route_with_expired_cookie_clears_it() {
    let expired = session_token("support", -1);

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/dashboard/orders", Some(&expired)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("admin_session=;"), "got {cookies:?}");
}

#[tokio::test]
async fn test_protected_route_with_malformed_cookie_clears_it() {
    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/dashboard", Some("garbage")))
        .await
        .unwrap();

    assert_eq!(location(&response), "/auth/login");
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn test_login_page_with_valid_cookie_redirects_to_landing() {
    let token = session_token("admin", 3600);

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/auth/login", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard/orders");
}

#[tokio::test]
async fn test_login_page_without_cookie_renders() {
    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/auth/login", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "login": true }));
}

// =========================================================================
// Dashboard and session view
// =========================================================================

#[tokio::test]
async fn test_dashboard_support_sees_only_view_actions() {
    let token = session_token("support", 3600);

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/dashboard/orders", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["section"], "orders");
    assert_eq!(body["user"]["role"], "support");
    assert_eq!(body["actions"], json!(["list_orders", "list_users"]));
}

#[tokio::test]
async fn test_dashboard_admin_sees_every_action() {
    let token = session_token("admin", 3600);

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/dashboard", Some(&token)))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["section"], "");
    assert_eq!(body["actions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_session_view_authenticated() {
    let token = session_token("support", 3600);

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/api/session", Some(&token)))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["loading"], false);
    assert_eq!(body["user"]["address"], "0xabc");
    assert_eq!(body["permissions"], json!(["view_orders", "view_users"]));
}

#[tokio::test]
async fn test_session_view_malformed_cookie_is_unauthenticated_and_cleared() {
    let response = app(MockExchange::issuing(String::new()))
        .oneshot(get("/api/session", Some("a.b.c")))
        .await
        .unwrap();

    assert_eq!(set_cookies(&response).len(), 1);
    let body = json_body(response).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["user"], Value::Null);
    assert_eq!(body["permissions"], json!([]));
}

// =========================================================================
// Login callback
// =========================================================================

#[tokio::test]
async fn test_callback_query_success_sets_cookie_and_redirects() {
    let token = session_token("admin", 3600);
    let exchange = MockExchange::issuing(token.clone());

    let response = app(exchange.clone())
        .oneshot(get("/auth/callback?id_token=abc123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/orders");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("admin_session={token}")));
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_callback_query_honors_local_redirect() {
    let response = app(MockExchange::issuing(session_token("admin", 3600)))
        .oneshot(get("/auth/callback?redirect=%2Fdashboard%2Fusers&id_token=abc123", None))
        .await
        .unwrap();

    assert_eq!(location(&response), "/dashboard/users");
}

#[tokio::test]
async fn test_callback_query_control_character_redirect_goes_to_landing() {
    for redirect in ["%2F%09%2Fevil.example", "%2F%0D%0Aevil.example"] {
        let response = app(MockExchange::issuing(session_token("admin", 3600)))
            .oneshot(get(&format!("/auth/callback?redirect={redirect}&id_token=abc123"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "redirect {redirect}");
        assert_eq!(location(&response), "/dashboard/orders");
        assert_eq!(set_cookies(&response).len(), 1);
    }
}

#[tokio::test]
async fn test_callback_unreadable_session_token_is_rejected() {
    let response = app(MockExchange::issuing("garbage".into()))
        .oneshot(get("/auth/callback?id_token=abc123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(
        json_body(response).await,
        json!({ "loading": false, "error": "Invalid session token" })
    );
}

#[tokio::test]
async fn test_callback_query_without_token_goes_to_login() {
    let exchange = MockExchange::issuing(String::new());

    let response = app(exchange.clone())
        .oneshot(get("/auth/callback", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_href_fragment_success_returns_cleaned_address() {
    let response = app(MockExchange::issuing(session_token("support", 3600)))
        .oneshot(post_json(
            "/auth/callback",
            json!({ "href": "https://portal.example/auth/callback#id_token=abc123&token_type=bearer" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 1);
    let body = json_body(response).await;
    assert_eq!(body["redirect"], "/dashboard/orders");
    assert_eq!(body["address"], "https://portal.example/auth/callback");
}

#[tokio::test]
async fn test_callback_href_fragment_without_id_token_is_invalid() {
    let exchange = MockExchange::issuing(String::new());

    let response = app(exchange.clone())
        .oneshot(post_json(
            "/auth/callback",
            json!({ "href": "https://portal.example/auth/callback#state=x&token_type=bearer" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(
        json_body(response).await,
        json!({ "loading": false, "error": "Invalid OAuth callback" })
    );
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_href_without_fragment_is_no_content() {
    let response = app(MockExchange::issuing(String::new()))
        .oneshot(post_json("/auth/callback", json!({ "href": "/auth/callback" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_callback_exchange_failure_shows_message_without_cookie() {
    let exchange = MockExchange::failing(SessionError::ExchangeRejected("account disabled".into()));

    let response = app(exchange)
        .oneshot(get("/auth/callback?id_token=abc123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["error"], "account disabled");
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn test_callback_stall_sends_browser_home_without_cancelling_exchange() {
    let exchange = MockExchange::issuing(session_token("admin", 3600)).slow(Duration::from_millis(300));
    let config = WardenConfig {
        callback_fallback: Duration::from_millis(20),
        ..WardenConfig::default()
    };

    let response = warden::router(config, exchange.clone())
        .oneshot(get("/auth/callback?id_token=abc123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookies(&response).is_empty());

    // The exchange keeps running in the background.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(exchange.completed.load(Ordering::SeqCst), 1);
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn test_logout_removes_cookie_and_redirects_to_login() {
    let token = session_token("admin", 3600);
    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, format!("admin_session={token}"))
        .body(Body::empty())
        .unwrap();

    let response = app(MockExchange::issuing(String::new()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("admin_session=;"));
    assert!(cookies[0].contains("Max-Age=0"));
}

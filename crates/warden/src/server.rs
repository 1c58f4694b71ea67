//! `WardenServer` builder and the HTTP surface.
//!
//! Every request passes through the session guard first; only requests the
//! guard lets through reach a handler. Handlers rebuild the session from
//! the request's `Cookie` header and answer with `Set-Cookie` whenever the
//! session changed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use warden_guard::SessionGuard;
use warden_rbac::{Permission, PermissionSet, gate, permissions_for};
use warden_session::{SessionError, SessionExchange, SessionHook, SessionRecord, SessionStore};

use crate::login::{CallbackLocation, LoginFlow, LoginOutcome, LoginState};
use crate::{WardenConfig, WardenError};

/// Dashboard actions and the permission each one needs.
const DASHBOARD_ACTIONS: [(Permission, &str); 5] = [
    (Permission::ViewOrders, "list_orders"),
    (Permission::UpdateOrders, "refund_order"),
    (Permission::ViewUsers, "list_users"),
    (Permission::UpdateUsers, "edit_user"),
    (Permission::ViewAnalytics, "view_analytics"),
];

/// Shared, read-only state handed to every handler.
pub(crate) struct AppState<E: SessionExchange> {
    exchange: Arc<E>,
    config: WardenConfig,
    guard: SessionGuard,
}

impl<E: SessionExchange> AppState<E> {
    fn new(config: WardenConfig, exchange: E) -> Self {
        Self {
            exchange: Arc::new(exchange),
            guard: SessionGuard::new(config.guard.clone()),
            config,
        }
    }

    /// The session as the browser sent it.
    fn session_store(&self, headers: &HeaderMap) -> SessionStore {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        let cookies = (!cookies.is_empty()).then_some(cookies.as_str());
        SessionStore::from_cookie_header(self.config.cookie.clone(), cookies)
    }

    fn mount_hook(&self, store: &mut SessionStore) -> SessionHook {
        SessionHook::mount(store, self.config.guard.login_path.clone())
    }
}

/// Builds the application router for `exchange`.
///
/// This is what [`WardenServer`] serves; tests drive it directly.
pub fn router<E: SessionExchange>(config: WardenConfig, exchange: E) -> Router {
    build_router(Arc::new(AppState::new(config, exchange)))
}

fn build_router<E: SessionExchange>(state: Arc<AppState<E>>) -> Router {
    Router::new()
        .route(&state.config.guard.login_path, get(login_page))
        .route(
            "/auth/callback",
            get(callback_from_query::<E>).post(callback_from_href::<E>),
        )
        .route("/auth/logout", post(logout::<E>))
        .route("/api/session", get(session_view::<E>))
        .route("/dashboard", get(dashboard::<E>))
        .route("/dashboard/{*section}", get(dashboard::<E>))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            guard_requests::<E>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Guard middleware
// ---------------------------------------------------------------------------

async fn guard_requests<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    request: Request,
    next: Next,
) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), |pq| pq.as_str().to_string());
    let mut store = state.session_store(request.headers());

    let decision = state.guard.check(&target, &mut store);
    match decision.redirect() {
        Some(to) => redirect_with_cookies(StatusCode::TEMPORARY_REDIRECT, to.location(), &store),
        None => next.run(request).await,
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

async fn login_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "login": true }))
}

/// Body of `POST /auth/callback`: the full address the browser landed on,
/// fragment included (browsers never send fragments to the server).
#[derive(Deserialize)]
struct CallbackRequest {
    href: String,
}

#[derive(Serialize)]
struct CallbackReply {
    redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

/// How a callback request ended.
enum CallbackRun {
    Finished(LoginOutcome, SessionStore),
    /// The exchange outlived the fallback window and is still running.
    Stalled,
    Aborted(String),
}

async fn callback_from_query<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let location = CallbackLocation::from_request(uri.path(), uri.query());
    let store = state.session_store(&headers);

    match run_login(&state, location, store).await {
        CallbackRun::Finished(LoginOutcome::SignedIn { destination, .. }, store) => {
            redirect_with_cookies(StatusCode::SEE_OTHER, destination.location(), &store)
        }
        CallbackRun::Finished(LoginOutcome::Failed { message }, _) => login_failed(message),
        CallbackRun::Finished(LoginOutcome::Idle, store) => {
            redirect_with_cookies(StatusCode::SEE_OTHER, &state.config.guard.login_path, &store)
        }
        CallbackRun::Stalled => see_other(&state.config.home_path),
        CallbackRun::Aborted(message) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failed_state(message))).into_response()
        }
    }
}

async fn callback_from_href<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    headers: HeaderMap,
    Json(body): Json<CallbackRequest>,
) -> Response {
    let location = CallbackLocation::parse(&body.href);
    let store = state.session_store(&headers);

    match run_login(&state, location, store).await {
        CallbackRun::Finished(LoginOutcome::SignedIn { destination, address }, store) => {
            let reply = CallbackReply {
                redirect: destination.location().to_string(),
                address: Some(address),
            };
            with_cookies(Json(reply).into_response(), &store)
        }
        CallbackRun::Finished(LoginOutcome::Failed { message }, _) => login_failed(message),
        CallbackRun::Finished(LoginOutcome::Idle, _) => StatusCode::NO_CONTENT.into_response(),
        CallbackRun::Stalled => Json(CallbackReply {
            redirect: state.config.home_path.clone(),
            address: None,
        })
        .into_response(),
        CallbackRun::Aborted(message) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failed_state(message))).into_response()
        }
    }
}

/// Runs the login flow on its own task, waiting at most the configured
/// fallback window for it.
///
/// Giving up on the wait does not cancel the task: dropping a
/// `JoinHandle` detaches it, so the exchange runs to completion.
async fn run_login<E: SessionExchange>(
    state: &AppState<E>,
    location: CallbackLocation,
    mut store: SessionStore,
) -> CallbackRun {
    let mut flow = LoginFlow::new(Arc::clone(&state.exchange), state.config.login_config());
    let task = tokio::spawn(async move {
        let outcome = flow.handle(&location, &mut store).await;
        (outcome, store)
    });

    match tokio::time::timeout(state.config.callback_fallback, task).await {
        Ok(Ok((outcome, store))) => CallbackRun::Finished(outcome, store),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "login task failed");
            CallbackRun::Aborted(SessionError::ExchangeUnavailable(e.to_string()).to_string())
        }
        Err(_) => {
            let waited_ms =
                u64::try_from(state.config.callback_fallback.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                waited_ms,
                "session exchange still pending, sending browser home"
            );
            CallbackRun::Stalled
        }
    }
}

fn failed_state(message: String) -> LoginState {
    LoginState {
        loading: false,
        error: Some(message),
    }
}

fn login_failed(message: String) -> Response {
    (StatusCode::UNAUTHORIZED, Json(failed_state(message))).into_response()
}

async fn logout<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.session_store(&headers);
    let mut hook = state.mount_hook(&mut store);
    let to = hook.logout(&mut store);
    redirect_with_cookies(StatusCode::SEE_OTHER, to.location(), &store)
}

// ---------------------------------------------------------------------------
// Session and dashboard
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SessionView<'a> {
    authenticated: bool,
    loading: bool,
    user: Option<&'a SessionRecord>,
    permissions: PermissionSet,
}

async fn session_view<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    headers: HeaderMap,
) -> Response {
    let mut store = state.session_store(&headers);
    let hook = state.mount_hook(&mut store);

    let view = SessionView {
        authenticated: hook.is_authenticated(),
        loading: hook.is_loading(),
        user: hook.user(),
        permissions: hook.role().map_or(PermissionSet::EMPTY, permissions_for),
    };
    with_cookies(Json(view).into_response(), &store)
}

#[derive(Serialize)]
struct DashboardView<'a> {
    section: &'a str,
    user: &'a SessionRecord,
    actions: Vec<&'static str>,
}

async fn dashboard<E: SessionExchange>(
    State(state): State<Arc<AppState<E>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let mut store = state.session_store(&headers);
    let hook = state.mount_hook(&mut store);

    // The guard already checked the session; this only trips if the token
    // expired between the two reads.
    let Some(user) = hook.user() else {
        return redirect_with_cookies(
            StatusCode::TEMPORARY_REDIRECT,
            &state.config.guard.login_path,
            &store,
        );
    };

    let section = uri
        .path()
        .strip_prefix("/dashboard")
        .unwrap_or_default()
        .trim_matches('/');
    let actions = DASHBOARD_ACTIONS
        .iter()
        .filter_map(|&(permission, action)| gate(Some(user.role), permission, || action))
        .collect();

    Json(DashboardView {
        section,
        user,
        actions,
    })
    .into_response()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn see_other(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

fn redirect_with_cookies(status: StatusCode, location: &str, store: &SessionStore) -> Response {
    let response = (status, [(header::LOCATION, location.to_string())]).into_response();
    with_cookies(response, store)
}

/// Appends one `Set-Cookie` header per pending cookie change.
fn with_cookies(mut response: Response, store: &SessionStore) -> Response {
    for cookie in store.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "dropping unencodable Set-Cookie header"),
        }
    }
    response
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a Warden server.
///
/// # Example
///
/// ```rust,no_run
/// use warden::prelude::*;
///
/// # async fn start() -> Result<(), WardenError> {
/// let server = WardenServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(HttpSessionExchange::new("http://backend/auth/session"))
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WardenServerBuilder {
    config: WardenConfig,
}

impl WardenServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WardenConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and assembles the router around `exchange`.
    pub async fn build<E: SessionExchange>(self, exchange: E) -> Result<WardenServer, WardenError> {
        let listener = TcpListener::bind(self.config.bind_addr.as_str()).await?;
        let router = router(self.config, exchange);
        Ok(WardenServer { listener, router })
    }
}

impl Default for WardenServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Warden server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct WardenServer {
    listener: TcpListener,
    router: Router,
}

impl WardenServer {
    /// Creates a new builder.
    pub fn builder() -> WardenServerBuilder {
        WardenServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), WardenError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "warden server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}

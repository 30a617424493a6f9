//! In-process mock of the ClipURL backend.
//!
//! Serves just enough of the REST surface to exercise the client end to
//! end over real HTTP: cookie-session auth, link CRUD, cleanup sweeps, and
//! a few deliberately misbehaving routes (slow, empty error body).

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use clipurl_client::types::User;
use clipurl_client::Navigator;

const SESSION_COOKIE: &str = "clipurl_session=valid";

pub struct MockBackend {
    pub urls: Mutex<Vec<Value>>,
    pub next_id: AtomicI64,
    pub me_hits: AtomicUsize,
    pub list_hits: AtomicUsize,
    pub detail_hits: AtomicUsize,
    pub cleanup_hits: AtomicUsize,
    pub fail_logout: AtomicBool,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(0),
            me_hits: AtomicUsize::new(0),
            list_hits: AtomicUsize::new(0),
            detail_hits: AtomicUsize::new(0),
            cleanup_hits: AtomicUsize::new(0),
            fail_logout: AtomicBool::new(false),
        }
    }
}

type AppState = Arc<MockBackend>;

/// Start the mock backend on a random port. Returns its base URL and the
/// shared state for assertions.
pub async fn spawn() -> (String, AppState) {
    let state = Arc::new(MockBackend::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });

    (format!("http://{addr}"), state)
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/urls", get(list_urls).post(create_url))
        .route("/urls/stats", get(url_stats))
        .route("/urls/{id}", get(get_url).delete(delete_url))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/cleanup/stats", get(cleanup_stats))
        .route("/admin/cleanup/expired-links", post(cleanup_expired_links))
        .route("/slow", get(slow))
        .route("/teapot", get(teapot))
        .with_state(state)
}

pub fn user_json() -> Value {
    json!({
        "id": "7f8f0f7e-2a64-4bcb-9f3e-0d9a3e1c6a55",
        "name": "Ada",
        "email": "ada@example.com",
        "created_at": "2024-03-01T10:15:00Z",
        "role": "user",
        "is_active": true
    })
}

pub fn sample_user() -> User {
    serde_json::from_value(user_json()).expect("sample user json")
}

fn authed(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookies| cookies.contains(SESSION_COOKIE))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Not authenticated"})),
    )
        .into_response()
}

// ── Auth routes ────────────────────────────────────────────────────

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"].as_str() == Some("letmein") {
        (
            [(
                header::SET_COOKIE,
                format!("{SESSION_COOKIE}; Path=/; HttpOnly"),
            )],
            Json(user_json()),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.me_hits.fetch_add(1, Ordering::SeqCst);
    if authed(&headers) {
        Json(user_json()).into_response()
    } else {
        unauthorized()
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Logout unavailable"})),
        )
            .into_response();
    }
    if !authed(&headers) {
        return unauthorized();
    }
    (
        [(
            header::SET_COOKIE,
            "clipurl_session=; Path=/; Max-Age=0".to_string(),
        )],
        Json(json!({"message": "Logged out"})),
    )
        .into_response()
}

// ── URL routes ─────────────────────────────────────────────────────

async fn list_urls(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    if !authed(&headers) {
        return unauthorized();
    }
    let urls = state.urls.lock().expect("urls lock");
    let total_clicks: u64 = urls
        .iter()
        .filter_map(|u| u["click_count"].as_u64())
        .sum();
    Json(json!({
        "urls": *urls,
        "total": urls.len(),
        "total_clicks": total_clicks,
    }))
    .into_response()
}

async fn create_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authed(&headers) {
        return unauthorized();
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let slug = body["custom_alias"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("r{id}"));
    let record = json!({
        "id": id,
        "slug": slug,
        "original_url": body["original_url"],
        "short_url": format!("https://cl.ip/{slug}"),
        "click_count": 0,
        "created_at": "2024-03-01T10:15:00Z",
        "expires_at": body["expires_at"],
    });
    state.urls.lock().expect("urls lock").push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.detail_hits.fetch_add(1, Ordering::SeqCst);
    if !authed(&headers) {
        return unauthorized();
    }
    let urls = state.urls.lock().expect("urls lock");
    match urls.iter().find(|u| u["id"].as_i64() == Some(id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "URL not found"})),
        )
            .into_response(),
    }
}

async fn delete_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !authed(&headers) {
        return unauthorized();
    }
    let mut urls = state.urls.lock().expect("urls lock");
    let before = urls.len();
    urls.retain(|u| u["id"].as_i64() != Some(id));
    if urls.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "URL not found"})),
        )
            .into_response()
    }
}

async fn url_stats(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authed(&headers) {
        return unauthorized();
    }
    let urls = state.urls.lock().expect("urls lock");
    let total_clicks: u64 = urls
        .iter()
        .filter_map(|u| u["click_count"].as_u64())
        .sum();
    Json(json!({"total_urls": urls.len(), "total_clicks": total_clicks})).into_response()
}

// ── Admin routes ───────────────────────────────────────────────────

async fn admin_stats() -> Response {
    // the mock has no admin accounts; everything admin-stats is forbidden
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "Admin privileges required"})),
    )
        .into_response()
}

async fn cleanup_stats(headers: HeaderMap) -> Response {
    if !authed(&headers) {
        return unauthorized();
    }
    Json(json!({
        "expired_links": 3,
        "unverified_users": 1,
        "inactive_users": 0,
        "zero_click_links": 5,
        "old_analytics": 12,
    }))
    .into_response()
}

async fn cleanup_expired_links(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authed(&headers) {
        return unauthorized();
    }
    state.cleanup_hits.fetch_add(1, Ordering::SeqCst);
    let dry_run = params.get("dry_run").map(String::as_str) != Some("false");
    Json(json!({
        "type": "expired_links",
        "count": 3,
        "deleted": !dry_run,
    }))
    .into_response()
}

// ── Misbehaving routes ─────────────────────────────────────────────

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(10)).await;
    Json(json!({})).into_response()
}

async fn teapot() -> Response {
    StatusCode::IM_A_TEAPOT.into_response()
}

// ── Test navigator ─────────────────────────────────────────────────

/// Records navigations and tracks the current path the way a browser
/// location would.
pub struct RecordingNavigator {
    path: Mutex<String>,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new(start_path: &str) -> Self {
        Self {
            path: Mutex::new(start_path.to_string()),
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().expect("visits lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().expect("path lock").clone()
    }

    fn navigate(&self, path: &str) {
        *self.path.lock().expect("path lock") = path.to_string();
        self.visits
            .lock()
            .expect("visits lock")
            .push(path.to_string());
    }
}

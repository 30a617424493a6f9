//! JSON-over-HTTP client with cookie sessions, per-request timeouts, and
//! uniform error surfacing.
//!
//! Every resource service routes through [`ApiClient::request`]. The client
//! owns the two cross-cutting behaviors the rest of the crate relies on:
//! timeout-based abort (a dedicated [`Error::Timeout`]) and dead-session
//! handling on 401 (cache teardown plus a single guarded login redirect).

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::storage::SessionCache;

/// Endpoints that handle their own 401s (login forms, the identity probe);
/// no session teardown or redirect for these.
const AUTH_WHITELIST: [&str; 3] = ["/auth/login", "/auth/register", "/auth/me"];

const GENERIC_ERROR_DETAIL: &str = "An error occurred";

/// Navigation hook provided by the embedding shell.
///
/// The client calls [`navigate`](Navigator::navigate) when a dead session
/// forces a return to the login screen. [`current_path`](Navigator::current_path)
/// guards the redirect: navigation is skipped when the shell already shows
/// the login screen, so concurrent 401s cannot loop.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// ClipURL HTTP client.
///
/// Cheap to clone; clones share the connection pool and cookie store. All
/// requests send JSON and cookies; there is no bearer-token mode.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    session_cache: SessionCache,
    navigator: Option<Arc<dyn Navigator>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiClient {
    /// Build a client for `config`. The session cache is shared with the
    /// auth layer so a 401 can tear it down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: ApiConfig, session_cache: SessionCache) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(Error::from)?;
        Ok(Self {
            config,
            http,
            session_cache,
            navigator: None,
        })
    }

    /// Attach the shell's navigation hook. Without one, a dead session still
    /// clears the cache but nobody is redirected.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Issue a request and decode the JSON response.
    ///
    /// `endpoint` is an absolute path (`/urls`, `/auth/me`, ...) appended to
    /// the configured base URL. Auth endpoints get the longer auth timeout.
    /// A 204 response decodes as the caller's empty value (use `()`).
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when no response arrives in time,
    /// [`Error::Unauthorized`] on 401 (after dead-session handling),
    /// [`Error::Http`] on any other non-2xx, [`Error::Decode`] when a 2xx
    /// body does not match `T`, [`Error::Transport`] for connection trouble.
    pub async fn request<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let timeout = if endpoint.starts_with("/auth/") {
            self.config.auth_timeout
        } else {
            self.config.default_timeout
        };
        let url = format!("{}{}", self.config.base_url, endpoint);

        let mut builder = self
            .http
            .request(method, &url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let detail = error_detail(response).await;
            self.handle_unauthorized(endpoint);
            return Err(Error::Unauthorized { detail });
        }
        if !status.is_success() {
            let detail = error_detail(response).await;
            return Err(Error::Http {
                status: status.as_u16(),
                detail,
            });
        }
        if status == StatusCode::NO_CONTENT {
            return serde_json::from_value(serde_json::Value::Null)
                .map_err(|e| Error::Decode(e.to_string()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    /// POST without a body (status toggles, cleanup sweeps, key generation).
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::POST, endpoint, None).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request::<T, ()>(Method::DELETE, endpoint, None).await
    }

    /// Dead-session handling: clear the cached identity and send the shell
    /// to the login screen, unless the failing endpoint handles its own 401
    /// or the shell is already there.
    fn handle_unauthorized(&self, endpoint: &str) {
        if AUTH_WHITELIST.iter().any(|path| endpoint.starts_with(path)) {
            return;
        }

        self.session_cache.clear();

        if let Some(navigator) = &self.navigator {
            let here = navigator.current_path();
            if !here.starts_with(&self.config.login_path) {
                tracing::warn!(endpoint, "session rejected, returning to login");
                navigator.navigate(&self.config.login_path);
            }
        }
    }
}

/// Pull the server's `{detail}` message out of an error response, falling
/// back to a generic message when the body is absent or unparseable.
async fn error_detail(response: reqwest::Response) -> String {
    match response.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => GENERIC_ERROR_DETAIL.to_string(),
    }
}

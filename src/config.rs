use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Timeout for most requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for `/auth/*` requests. Registration triggers email dispatch
/// server-side, which can be slow.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// ClipURL API configuration.
///
/// Use [`from_env()`](ApiConfig::from_env) for convention-based setup, or
/// [`new()`](ApiConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub(crate) base_url: String,
    pub(crate) default_timeout: Duration,
    pub(crate) auth_timeout: Duration,
    pub(crate) login_path: String,
}

impl ApiConfig {
    /// Create a configuration for the given API base URL.
    ///
    /// A trailing slash is stripped so endpoint paths concatenate cleanly,
    /// and a path prefix (e.g. a `/api` proxy path) is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not an absolute URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let raw = base_url.into();
        let parsed: Url = raw
            .parse()
            .map_err(|e| Error::Config(format!("base URL: {e}")))?;
        if !parsed.has_host() {
            return Err(Error::Config(format!("base URL has no host: {raw}")));
        }

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            default_timeout: DEFAULT_TIMEOUT,
            auth_timeout: AUTH_TIMEOUT,
            login_path: "/login".into(),
        })
    }

    /// Create a configuration from environment variables.
    ///
    /// # Optional env vars
    /// - `CLIPURL_API_URL`: API base URL (defaults to `http://localhost:8000`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `CLIPURL_API_URL` is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base = std::env::var("CLIPURL_API_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base)
    }

    /// Override the timeout applied to non-auth requests.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Override the timeout applied to `/auth/*` requests.
    #[must_use]
    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// Override the path the shell is sent to when a session dies
    /// (default: `/login`).
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// The normalized API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout for non-auth requests.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Timeout for `/auth/*` requests.
    #[must_use]
    pub fn auth_timeout(&self) -> Duration {
        self.auth_timeout
    }

    /// The login screen path used for dead-session redirects.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

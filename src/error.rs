use thiserror::Error;

/// Errors surfaced by the ClipURL client.
///
/// Nothing here is fatal: every variant resolves to a displayable message,
/// and callers are expected to show it rather than abort.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No response arrived within the configured timeout. The underlying
    /// connection attempt has been aborted.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status. `detail` carries the
    /// server-supplied message when the body had one.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The server answered 401. Session-cache teardown and the login
    /// redirect (where applicable) have already happened by the time the
    /// caller sees this.
    #[error("not authenticated: {detail}")]
    Unauthorized { detail: String },

    /// A client-side pre-check rejected the input before any network call.
    #[error("{0}")]
    Validation(String),

    /// A 2xx response body could not be decoded into the expected type.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request never completed (DNS, connect, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }
}

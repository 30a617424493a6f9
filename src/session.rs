//! Process-wide session identity.
//!
//! The store renders returning users instantly from the 24-hour local cache
//! while re-validating against the backend in the background; first-time
//! visitors wait in `Hydrating` until the identity probe resolves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::services::AuthService;
use crate::storage::SessionCache;
use crate::types::{LoginCredentials, RegisterData, User};

/// Lifecycle of the cached identity.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// `initialize` has not run yet.
    Uninitialized,
    /// No cached identity; the first validation call is in flight.
    Hydrating,
    /// Identity resolved. `None` means "no session", a normal outcome.
    Ready(Option<User>),
}

/// Shared session store. Cloning shares state; create one per process and
/// hand out clones.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    auth: AuthService,
    cache: SessionCache,
    state: RwLock<SessionState>,
    initialized: AtomicBool,
}

impl AuthSession {
    #[must_use]
    pub fn new(auth: AuthService, cache: SessionCache) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                auth,
                cache,
                state: RwLock::new(SessionState::Uninitialized),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Run the startup routine. Runs at most once per store: later calls
    /// return immediately, so shells that mount twice stay safe.
    ///
    /// With a fresh cached identity the store becomes `Ready` before this
    /// returns and validation continues on a background task; without one,
    /// this awaits the identity probe. Must be called inside a Tokio runtime.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        match self.inner.cache.load() {
            Some(user) => {
                tracing::debug!("session restored from cache, validating in background");
                *self.inner.state.write() = SessionState::Ready(Some(user));
                let session = self.clone();
                tokio::spawn(async move {
                    session.refresh_user().await;
                });
            }
            None => {
                *self.inner.state.write() = SessionState::Hydrating;
                self.refresh_user().await;
            }
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// The signed-in account, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        match &*self.inner.state.read() {
            SessionState::Ready(user) => user.clone(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Sign in. The backend sets the session cookie out-of-band; the
    /// returned account becomes the stored identity.
    ///
    /// # Errors
    ///
    /// Propagates the backend error (401 on bad credentials reaches the
    /// caller directly; login handles its own 401).
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        let user = self.inner.auth.login(credentials).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        let user = self.inner.auth.register(data).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Sign out. The backend call may fail; local state is cleared either
    /// way so the shell can never be stuck signed-in.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.auth.logout().await {
            tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.set_user(None);
    }

    /// Re-validate the identity against the backend. Any failure resolves to
    /// `None`: "no session" is a normal outcome here, never an error.
    pub async fn refresh_user(&self) -> Option<User> {
        match self.inner.auth.current_user().await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::debug!(error = %e, "session validation failed, clearing identity");
                self.set_user(None);
                None
            }
        }
    }

    /// Replace the in-memory and persisted identity. Profile updates land
    /// here after `AuthService::update_profile`.
    pub fn set_user(&self, user: Option<User>) {
        match &user {
            Some(user) => self.inner.cache.save(user),
            None => self.inner.cache.clear(),
        }
        *self.inner.state.write() = SessionState::Ready(user);
    }
}

use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::types::{
    ApiKey, LoginCredentials, Message, PasswordChange, ProfileUpdate, RegisterData, User,
};

/// Account and session endpoints.
///
/// Login/register/me handle their own 401s; a bad password surfaces as
/// [`Error::Unauthorized`](crate::Error::Unauthorized) without tearing the
/// session down (see the HTTP client's whitelist).
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordResetBody<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct GoogleCredentialBody<'a> {
    credential: &'a str,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password. The session cookie arrives
    /// out-of-band on the response.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        self.client.post("/auth/login", credentials).await
    }

    /// Create an account. Triggers a verification email server-side, so it
    /// runs under the longer auth timeout.
    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        self.client.post("/auth/register", data).await
    }

    /// The identity probe: who does the session cookie belong to?
    pub async fn current_user(&self) -> Result<User> {
        self.client.get("/auth/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.client.put("/auth/profile", update).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Message> {
        self.client.post("/auth/change-password", change).await
    }

    /// Generate a fresh API key, replacing any existing one.
    pub async fn generate_api_key(&self) -> Result<ApiKey> {
        self.client.post_empty("/auth/api-key").await
    }

    pub async fn revoke_api_key(&self) -> Result<Message> {
        self.client.delete("/auth/api-key").await
    }

    /// Invalidate the session cookie server-side.
    pub async fn logout(&self) -> Result<Message> {
        self.client.post_empty("/auth/logout").await
    }

    /// Redeem an email-verification token.
    pub async fn verify_email(&self, token: &str) -> Result<User> {
        self.client
            .post("/auth/verify-email", &TokenBody { token })
            .await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<Message> {
        self.client
            .post("/auth/resend-verification", &EmailBody { email })
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Message> {
        self.client
            .post("/auth/forgot-password", &EmailBody { email })
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Message> {
        self.client
            .post(
                "/auth/reset-password",
                &PasswordResetBody {
                    token,
                    new_password,
                },
            )
            .await
    }

    /// Sign in with a Google ID credential obtained by the shell.
    pub async fn login_with_google(&self, credential: &str) -> Result<User> {
        self.client
            .post("/auth/google", &GoogleCredentialBody { credential })
            .await
    }
}

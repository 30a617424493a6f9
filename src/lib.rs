#![doc = include_str!("../README.md")]

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod queries;
pub mod services;
pub mod session;
pub mod storage;
pub mod types;
pub mod validation;

// Re-exports for convenient access
pub use cache::{QueryCache, QueryKey, QueryStatus};
pub use config::ApiConfig;
pub use error::{Error, Result};
pub use http::{ApiClient, Navigator};
pub use queries::{
    AdminQueries, FeedbackQueries, RefreshPolicy, RefreshScheduler, UrlQueries,
};
pub use services::{
    AdminService, AuthService, FeedbackListQuery, FeedbackService, UrlService, UserListQuery,
};
pub use session::{AuthSession, SessionState};
pub use storage::{CacheStorage, FileStorage, MemoryStorage, SessionCache};
pub use validation::{
    password_strength, validate_alias, validate_confirm_password, validate_email, validate_name,
    validate_password, PasswordStrength,
};

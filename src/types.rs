use std::collections::HashMap;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account identifier (UUID, allocated by the backend).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

/// Short-link identifier (numeric, allocated by the backend).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UrlId(pub i64);

/// Feedback-item identifier (UUID, allocated by the backend).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct FeedbackId(pub Uuid);

/// Account role. The backend validates role values, so the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

// ── Accounts ───────────────────────────────────────────────────────

/// The authenticated account as the backend reports it.
///
/// Owned by [`AuthSession`](crate::AuthSession) for the process lifetime and
/// mutated only through auth calls. `api_key` is the single secret-adjacent
/// value held client-side; display it masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub oauth_provider: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

// ── Admin projections ──────────────────────────────────────────────

/// Moderation view of an account, including its link count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListItem {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_verified: bool,
    #[serde(default)]
    pub oauth_provider: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub url_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedUsers {
    pub users: Vec<UserListItem>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminUserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_users: u64,
    pub verified_users: u64,
    pub total_urls: u64,
    pub total_clicks: u64,
}

/// Row counts eligible for each retention sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CleanupStats {
    pub expired_links: u64,
    pub unverified_users: u64,
    pub inactive_users: u64,
    pub zero_click_links: u64,
    pub old_analytics: u64,
}

/// Outcome of one retention sweep. `deleted` is false for dry runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub deleted: bool,
    #[serde(default)]
    pub days_old: Option<u32>,
}

// ── Short links ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: UrlId,
    pub slug: String,
    pub original_url: String,
    pub short_url: String,
    pub click_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlCreate {
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UrlUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlList {
    pub urls: Vec<UrlRecord>,
    pub total: u64,
    pub total_clicks: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UrlStats {
    pub total_urls: u64,
    pub total_clicks: u64,
}

// ── Analytics ──────────────────────────────────────────────────────

/// One point on the click time series. `date` is a backend-formatted label,
/// not an instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickPoint {
    pub date: String,
    pub clicks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryShare {
    pub country: String,
    pub clicks: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceShare {
    #[serde(rename = "type")]
    pub kind: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentClick {
    pub time: String,
    pub location: String,
    pub device: String,
}

/// Read-only aggregate computed by the backend; refreshed on a staleness
/// timer, never mutated client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_clicks: u64,
    pub unique_visitors: u64,
    pub avg_daily_clicks: f64,
    pub countries_count: u32,
    pub click_data: Vec<ClickPoint>,
    pub top_countries: Vec<CountryShare>,
    pub devices: Vec<DeviceShare>,
    pub recent_activity: Vec<RecentClick>,
}

// ── Feedback ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Suggestion,
    Complaint,
    Bug,
    Other,
}

impl FeedbackType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Suggestion => "suggestion",
            Self::Complaint => "complaint",
            Self::Bug => "bug",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl FeedbackStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackCreate {
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub status: FeedbackStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Admin-visible superset of [`Feedback`] with triage fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAdmin {
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FeedbackStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total: u64,
    pub pending: u64,
    pub reviewed: u64,
    pub resolved: u64,
    pub dismissed: u64,
    pub by_type: HashMap<FeedbackType, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedFeedback {
    pub items: Vec<FeedbackAdmin>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub pages: u32,
}

// ── Misc responses ─────────────────────────────────────────────────

/// Plain `{message}` acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Freshly generated API key. Shown once, stored masked afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user_json() -> &'static str {
        r#"{
            "id": "7f8f0f7e-2a64-4bcb-9f3e-0d9a3e1c6a55",
            "name": "Ada",
            "email": "ada@example.com",
            "created_at": "2024-03-01T10:15:00Z",
            "role": "admin",
            "is_active": true
        }"#
    }

    #[test]
    fn user_parses_with_missing_optionals() {
        let user: User = serde_json::from_str(sample_user_json()).unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.role, Some(Role::Admin));
        assert!(user.api_key.is_none());
        assert!(user.oauth_provider.is_none());
    }

    #[test]
    fn user_roundtrips_through_json() {
        let user: User = serde_json::from_str(sample_user_json()).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn feedback_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FeedbackType::Suggestion).unwrap(),
            "\"suggestion\""
        );
        assert_eq!(
            serde_json::from_str::<FeedbackStatus>("\"dismissed\"").unwrap(),
            FeedbackStatus::Dismissed
        );
    }

    #[test]
    fn feedback_admin_flattens_base_fields() {
        let json = r#"{
            "id": "0c9a1f34-31c4-4f5e-9a8a-3f1f2a4b5c6d",
            "type": "bug",
            "subject": "Broken link",
            "message": "The short link 404s",
            "email": null,
            "user_id": null,
            "status": "pending",
            "created_at": "2024-05-01T08:00:00Z",
            "admin_notes": "repro confirmed",
            "reviewed_at": "2024-05-02T09:30:00Z",
            "user_name": null,
            "user_email": null
        }"#;
        let item: FeedbackAdmin = serde_json::from_str(json).unwrap();
        assert_eq!(item.feedback.kind, FeedbackType::Bug);
        assert_eq!(item.feedback.status, FeedbackStatus::Pending);
        assert_eq!(item.admin_notes.as_deref(), Some("repro confirmed"));
        assert!(item.reviewed_at.is_some());
    }

    #[test]
    fn feedback_stats_by_type_uses_enum_keys() {
        let json = r#"{
            "total": 3, "pending": 1, "reviewed": 1, "resolved": 1,
            "dismissed": 0, "by_type": {"bug": 2, "suggestion": 1}
        }"#;
        let stats: FeedbackStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.by_type.get(&FeedbackType::Bug), Some(&2));
    }

    #[test]
    fn url_create_omits_absent_fields() {
        let create = UrlCreate {
            original_url: "https://example.com".into(),
            custom_alias: None,
            expires_at: None,
        };
        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["original_url"], "https://example.com");
    }

    #[test]
    fn cleanup_result_maps_type_field() {
        let json = r#"{"type": "expired_links", "count": 4, "deleted": false}"#;
        let result: CleanupResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.kind, "expired_links");
        assert!(!result.deleted);
        assert!(result.days_old.is_none());
    }
}

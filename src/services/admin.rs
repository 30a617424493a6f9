use url::form_urlencoded;

use crate::error::Result;
use crate::http::ApiClient;
use crate::types::{
    AdminStats, AdminUserCreate, AdminUserUpdate, CleanupResult, CleanupStats, Message,
    PaginatedUsers, Role, UserId, UserListItem,
};

/// Default `days_old` for the unverified-accounts sweep.
pub const UNVERIFIED_USERS_DEFAULT_DAYS: u32 = 7;
/// Default `days_old` for the zero-click-links sweep.
pub const ZERO_CLICK_LINKS_DEFAULT_DAYS: u32 = 90;
/// Default `days_old` for the old-analytics sweep.
pub const OLD_ANALYTICS_DEFAULT_DAYS: u32 = 365;
/// Default `days_old` for the inactive-accounts sweep.
pub const INACTIVE_USERS_DEFAULT_DAYS: u32 = 30;

/// Filters for the admin account listing. Absent fields are omitted from
/// the query string entirely, never sent empty.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserListQuery {
    pub(crate) fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = self.per_page {
            query.append_pair("per_page", &per_page.to_string());
        }
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        if let Some(role) = self.role {
            query.append_pair("role", role.as_str());
        }
        if let Some(is_active) = self.is_active {
            query.append_pair("is_active", if is_active { "true" } else { "false" });
        }
        query.finish()
    }
}

/// User-management and data-retention endpoints. All of these are gated by
/// the admin role server-side; a non-admin caller gets a 403.
#[derive(Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_users(&self, query: &UserListQuery) -> Result<PaginatedUsers> {
        let qs = query.to_query_string();
        let endpoint = if qs.is_empty() {
            "/admin/users".to_string()
        } else {
            format!("/admin/users?{qs}")
        };
        self.client.get(&endpoint).await
    }

    pub async fn create_user(&self, data: &AdminUserCreate) -> Result<UserListItem> {
        self.client.post("/admin/users", data).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserListItem> {
        self.client.get(&format!("/admin/users/{id}")).await
    }

    pub async fn update_user(&self, id: UserId, data: &AdminUserUpdate) -> Result<UserListItem> {
        self.client.put(&format!("/admin/users/{id}"), data).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<Message> {
        self.client.delete(&format!("/admin/users/{id}")).await
    }

    /// Flip an account between active and suspended.
    pub async fn toggle_user_status(&self, id: UserId) -> Result<UserListItem> {
        self.client
            .post_empty(&format!("/admin/users/{id}/toggle-status"))
            .await
    }

    pub async fn stats(&self) -> Result<AdminStats> {
        self.client.get("/admin/stats").await
    }

    pub async fn cleanup_stats(&self) -> Result<CleanupStats> {
        self.client.get("/admin/cleanup/stats").await
    }

    /// Sweep links past their expiry. Call with `dry_run = true` first to
    /// preview the affected count before committing.
    pub async fn cleanup_expired_links(&self, dry_run: bool) -> Result<CleanupResult> {
        self.client
            .post_empty(&format!("/admin/cleanup/expired-links?dry_run={dry_run}"))
            .await
    }

    /// Sweep accounts unverified for more than `days_old` days.
    pub async fn cleanup_unverified_users(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        self.client
            .post_empty(&format!(
                "/admin/cleanup/unverified-users?days_old={days_old}&dry_run={dry_run}"
            ))
            .await
    }

    /// Sweep links older than `days_old` days that were never clicked.
    pub async fn cleanup_zero_click_links(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        self.client
            .post_empty(&format!(
                "/admin/cleanup/zero-click-links?days_old={days_old}&dry_run={dry_run}"
            ))
            .await
    }

    /// Sweep analytics rows older than `days_old` days.
    pub async fn cleanup_old_analytics(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        self.client
            .post_empty(&format!(
                "/admin/cleanup/old-analytics?days_old={days_old}&dry_run={dry_run}"
            ))
            .await
    }

    /// Sweep accounts with no links older than `days_old` days.
    pub async fn cleanup_inactive_users(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        self.client
            .post_empty(&format!(
                "/admin/cleanup/inactive-users?days_old={days_old}&dry_run={dry_run}"
            ))
            .await
    }
}

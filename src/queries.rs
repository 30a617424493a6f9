//! Pairs resource calls with cache keys, staleness windows, and the
//! invalidation that follows successful mutations.
//!
//! Reads go through [`QueryCache::query`] under a declared [`RefreshPolicy`];
//! mutations call the service directly and mark dependent scopes stale only
//! after the call succeeds, so a re-render never sees pre-mutation data as
//! fresh. The [`RefreshScheduler`] makes background refetching explicit:
//! every refreshable query declares its triggers instead of scattering
//! timers around the codebase.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::cache::{QueryCache, QueryKey};
use crate::error::Result;
use crate::services::{AdminService, FeedbackService, UrlService};
use crate::services::{FeedbackListQuery, UserListQuery};
use crate::types::{
    AdminStats, AdminUserCreate, AdminUserUpdate, AnalyticsSnapshot, CleanupResult, CleanupStats,
    Feedback, FeedbackAdmin, FeedbackCreate, FeedbackId, FeedbackStats, FeedbackUpdate, Message,
    PaginatedFeedback, PaginatedUsers, UrlCreate, UrlId, UrlList, UrlRecord, UrlStats, UrlUpdate,
    UserId, UserListItem,
};

/// Cache scopes. Invalidation targets a whole scope at once.
pub mod scope {
    pub const URLS: &str = "urls";
    pub const URL: &str = "url";
    pub const URL_STATS: &str = "url-stats";
    pub const URL_ANALYTICS: &str = "url-analytics";
    pub const ACCOUNT_ANALYTICS: &str = "user-analytics";
    pub const ADMIN_USERS: &str = "admin-users";
    pub const ADMIN_STATS: &str = "admin-stats";
    pub const CLEANUP_STATS: &str = "cleanup-stats";
    pub const MY_FEEDBACK: &str = "my-feedback";
    pub const ALL_FEEDBACK: &str = "all-feedback";
    pub const FEEDBACK: &str = "feedback";
    pub const FEEDBACK_STATS: &str = "feedback-stats";
}

/// Declares how a cached query stays fresh: its staleness window plus the
/// triggers that refetch it (interval, focus, or manual only).
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub stale_after: Duration,
    pub refetch_interval: Option<Duration>,
    pub refetch_on_focus: bool,
}

/// Link lists and details.
pub const LINK_DATA: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::from_secs(30),
    refetch_interval: None,
    refetch_on_focus: false,
};

/// Aggregates are expensive to compute and change slowly.
pub const ANALYTICS: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::from_secs(60),
    refetch_interval: None,
    refetch_on_focus: false,
};

/// Admin tables refetch when the operator returns to the window.
pub const ADMIN_TABLE: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::from_secs(30),
    refetch_interval: None,
    refetch_on_focus: true,
};

pub const ADMIN_STATS_POLICY: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::from_secs(60),
    refetch_interval: Some(Duration::from_secs(120)),
    refetch_on_focus: true,
};

pub const CLEANUP_STATS_POLICY: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::from_secs(30),
    refetch_interval: Some(Duration::from_secs(60)),
    refetch_on_focus: true,
};

/// Feedback views are cheap and always refetched.
pub const ALWAYS_STALE: RefreshPolicy = RefreshPolicy {
    stale_after: Duration::ZERO,
    refetch_interval: None,
    refetch_on_focus: false,
};

// ── URL queries ────────────────────────────────────────────────────

/// Cached reads and invalidating mutations for short links.
#[derive(Clone)]
pub struct UrlQueries {
    service: UrlService,
    cache: QueryCache,
}

impl UrlQueries {
    #[must_use]
    pub fn new(service: UrlService, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    /// The caller's links, optionally filtered by a search term.
    ///
    /// # Errors
    ///
    /// Propagates the service error; a stale snapshot survives the failure.
    pub async fn list(&self, search: Option<&str>) -> Result<UrlList> {
        let key = match search {
            Some(term) => QueryKey::with(scope::URLS, term),
            None => QueryKey::of(scope::URLS),
        };
        let service = self.service.clone();
        let search = search.map(str::to_owned);
        self.cache
            .query(key, LINK_DATA.stale_after, move || {
                let service = service.clone();
                let search = search.clone();
                async move { service.list(search.as_deref()).await }
            })
            .await
    }

    /// One link by id. `None` is a deliberate no-op (detail views render
    /// before an id is selected).
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn detail(&self, id: Option<UrlId>) -> Result<Option<UrlRecord>> {
        let Some(id) = id else { return Ok(None) };
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::with(scope::URL, id),
                LINK_DATA.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.get(id).await }
                },
            )
            .await
            .map(Some)
    }

    /// Aggregate link/click totals.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn stats(&self) -> Result<UrlStats> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::URL_STATS),
                LINK_DATA.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.stats().await }
                },
            )
            .await
    }

    /// Analytics for one link. `None` id is a deliberate no-op.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn url_analytics(&self, id: Option<UrlId>) -> Result<Option<AnalyticsSnapshot>> {
        let Some(id) = id else { return Ok(None) };
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::with(scope::URL_ANALYTICS, id),
                ANALYTICS.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.url_analytics(id).await }
                },
            )
            .await
            .map(Some)
    }

    /// Account-wide analytics.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn account_analytics(&self) -> Result<AnalyticsSnapshot> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::ACCOUNT_ANALYTICS),
                ANALYTICS.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.account_analytics().await }
                },
            )
            .await
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn create(&self, data: &UrlCreate) -> Result<UrlRecord> {
        let record = self.service.create(data).await?;
        self.cache.invalidate(scope::URLS);
        self.cache.invalidate(scope::URL_STATS);
        Ok(record)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn update(&self, id: UrlId, data: &UrlUpdate) -> Result<UrlRecord> {
        let record = self.service.update(id, data).await?;
        self.cache.invalidate(scope::URLS);
        self.cache.invalidate(scope::URL_STATS);
        Ok(record)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn delete(&self, id: UrlId) -> Result<()> {
        self.service.delete(id).await?;
        self.cache.invalidate(scope::URLS);
        self.cache.invalidate(scope::URL_STATS);
        Ok(())
    }
}

// ── Feedback queries ───────────────────────────────────────────────

/// Cached reads and invalidating mutations for feedback.
#[derive(Clone)]
pub struct FeedbackQueries {
    service: FeedbackService,
    cache: QueryCache,
}

impl FeedbackQueries {
    #[must_use]
    pub fn new(service: FeedbackService, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    /// Submit feedback. No invalidation: the submitter's own history is
    /// always refetched anyway.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn submit(&self, data: &FeedbackCreate) -> Result<Feedback> {
        self.service.create(data).await
    }

    /// The caller's own submissions.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn mine(&self) -> Result<Vec<Feedback>> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::MY_FEEDBACK),
                ALWAYS_STALE.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.my().await }
                },
            )
            .await
    }

    /// Admin: triage counters.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn admin_stats(&self) -> Result<FeedbackStats> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::FEEDBACK_STATS),
                ALWAYS_STALE.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.admin_stats().await }
                },
            )
            .await
    }

    /// Admin: paginated, filtered listing.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn admin_list(&self, query: &FeedbackListQuery) -> Result<PaginatedFeedback> {
        let key = QueryKey::with(scope::ALL_FEEDBACK, query.to_query_string());
        let service = self.service.clone();
        let query = query.clone();
        self.cache
            .query(key, ALWAYS_STALE.stale_after, move || {
                let service = service.clone();
                let query = query.clone();
                async move { service.admin_list(&query).await }
            })
            .await
    }

    /// Admin: one item by id. `None` is a deliberate no-op.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn admin_detail(&self, id: Option<FeedbackId>) -> Result<Option<FeedbackAdmin>> {
        let Some(id) = id else { return Ok(None) };
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::with(scope::FEEDBACK, id),
                ALWAYS_STALE.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.admin_get(id).await }
                },
            )
            .await
            .map(Some)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn admin_update(
        &self,
        id: FeedbackId,
        data: &FeedbackUpdate,
    ) -> Result<FeedbackAdmin> {
        let item = self.service.admin_update(id, data).await?;
        self.cache.invalidate(scope::ALL_FEEDBACK);
        self.cache.invalidate(scope::FEEDBACK_STATS);
        Ok(item)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn admin_delete(&self, id: FeedbackId) -> Result<Message> {
        let message = self.service.admin_delete(id).await?;
        self.cache.invalidate(scope::ALL_FEEDBACK);
        self.cache.invalidate(scope::FEEDBACK_STATS);
        Ok(message)
    }
}

// ── Admin queries ──────────────────────────────────────────────────

/// Cached reads and invalidating mutations for the admin console.
#[derive(Clone)]
pub struct AdminQueries {
    service: AdminService,
    cache: QueryCache,
}

impl AdminQueries {
    #[must_use]
    pub fn new(service: AdminService, cache: QueryCache) -> Self {
        Self { service, cache }
    }

    /// Paginated, filtered account listing.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn users(&self, query: &UserListQuery) -> Result<PaginatedUsers> {
        let key = QueryKey::with(scope::ADMIN_USERS, query.to_query_string());
        let service = self.service.clone();
        let query = query.clone();
        self.cache
            .query(key, ADMIN_TABLE.stale_after, move || {
                let service = service.clone();
                let query = query.clone();
                async move { service.list_users(&query).await }
            })
            .await
    }

    /// Instance-wide totals.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn stats(&self) -> Result<AdminStats> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::ADMIN_STATS),
                ADMIN_STATS_POLICY.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.stats().await }
                },
            )
            .await
    }

    /// Row counts eligible for each retention sweep.
    ///
    /// # Errors
    ///
    /// Propagates the service error.
    pub async fn cleanup_stats(&self) -> Result<CleanupStats> {
        let service = self.service.clone();
        self.cache
            .query(
                QueryKey::of(scope::CLEANUP_STATS),
                CLEANUP_STATS_POLICY.stale_after,
                move || {
                    let service = service.clone();
                    async move { service.cleanup_stats().await }
                },
            )
            .await
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn create_user(&self, data: &AdminUserCreate) -> Result<UserListItem> {
        let item = self.service.create_user(data).await?;
        self.invalidate_user_views();
        Ok(item)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn update_user(&self, id: UserId, data: &AdminUserUpdate) -> Result<UserListItem> {
        let item = self.service.update_user(id, data).await?;
        self.invalidate_user_views();
        Ok(item)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn delete_user(&self, id: UserId) -> Result<Message> {
        let message = self.service.delete_user(id).await?;
        self.invalidate_user_views();
        Ok(message)
    }

    /// # Errors
    ///
    /// Propagates the service error; nothing is invalidated on failure.
    pub async fn toggle_user_status(&self, id: UserId) -> Result<UserListItem> {
        let item = self.service.toggle_user_status(id).await?;
        self.invalidate_user_views();
        Ok(item)
    }

    /// # Errors
    ///
    /// Propagates the service error. Dry runs never invalidate; only a
    /// committed sweep changes the counts other views show.
    pub async fn cleanup_expired_links(&self, dry_run: bool) -> Result<CleanupResult> {
        let result = self.service.cleanup_expired_links(dry_run).await?;
        self.invalidate_after_sweep(dry_run);
        Ok(result)
    }

    /// # Errors
    ///
    /// Propagates the service error. Dry runs never invalidate.
    pub async fn cleanup_unverified_users(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        let result = self
            .service
            .cleanup_unverified_users(days_old, dry_run)
            .await?;
        self.invalidate_after_sweep(dry_run);
        Ok(result)
    }

    /// # Errors
    ///
    /// Propagates the service error. Dry runs never invalidate.
    pub async fn cleanup_zero_click_links(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        let result = self
            .service
            .cleanup_zero_click_links(days_old, dry_run)
            .await?;
        self.invalidate_after_sweep(dry_run);
        Ok(result)
    }

    /// # Errors
    ///
    /// Propagates the service error. Dry runs never invalidate.
    pub async fn cleanup_old_analytics(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        let result = self.service.cleanup_old_analytics(days_old, dry_run).await?;
        self.invalidate_after_sweep(dry_run);
        Ok(result)
    }

    /// # Errors
    ///
    /// Propagates the service error. Dry runs never invalidate.
    pub async fn cleanup_inactive_users(
        &self,
        days_old: u32,
        dry_run: bool,
    ) -> Result<CleanupResult> {
        let result = self
            .service
            .cleanup_inactive_users(days_old, dry_run)
            .await?;
        self.invalidate_after_sweep(dry_run);
        Ok(result)
    }

    fn invalidate_user_views(&self) {
        self.cache.invalidate(scope::ADMIN_USERS);
        self.cache.invalidate(scope::ADMIN_STATS);
    }

    fn invalidate_after_sweep(&self, dry_run: bool) {
        if dry_run {
            return;
        }
        self.cache.invalidate(scope::CLEANUP_STATS);
        self.cache.invalidate(scope::ADMIN_STATS);
    }
}

// ── Refresh scheduler ──────────────────────────────────────────────

type RefetchFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type RefetchFn = Arc<dyn Fn() -> RefetchFuture + Send + Sync>;

struct Registration {
    policy: RefreshPolicy,
    refetch: RefetchFn,
}

/// Drives background refetching for registered queries.
///
/// Interval triggers run on tokio timers; focus triggers fire when the
/// embedding shell calls [`notify_focus`](RefreshScheduler::notify_focus).
/// Refetches route through the query layer, so a trigger that lands inside
/// a fresh staleness window is a cache hit and costs nothing.
///
/// Dropping the scheduler aborts all timer tasks.
#[derive(Default)]
pub struct RefreshScheduler {
    registrations: Mutex<Vec<Registration>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a query under `policy`. Spawns the interval task right away
    /// when the policy declares one; must be called inside a Tokio runtime
    /// in that case.
    pub fn register<F, Fut>(&self, policy: RefreshPolicy, refetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let refetch: RefetchFn = Arc::new(move || Box::pin(refetch()) as RefetchFuture);

        if let Some(period) = policy.refetch_interval {
            let refetch = Arc::clone(&refetch);
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                // the first tick fires immediately; the initial fetch is the
                // page's own query, not the scheduler's
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    refetch().await;
                }
            });
            self.tasks.lock().push(handle);
        }

        self.registrations.lock().push(Registration { policy, refetch });
    }

    /// The shell regained focus: refetch everything that subscribes to it.
    pub fn notify_focus(&self) {
        let refetches: Vec<RefetchFn> = self
            .registrations
            .lock()
            .iter()
            .filter(|r| r.policy.refetch_on_focus)
            .map(|r| Arc::clone(&r.refetch))
            .collect();
        for refetch in refetches {
            tokio::spawn(refetch());
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

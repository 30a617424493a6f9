use url::form_urlencoded;

use crate::error::Result;
use crate::http::ApiClient;
use crate::types::{
    Feedback, FeedbackAdmin, FeedbackCreate, FeedbackId, FeedbackStats, FeedbackStatus,
    FeedbackType, FeedbackUpdate, Message, PaginatedFeedback,
};

/// Filters for the admin feedback listing. The backend names the filter
/// parameters `status_filter` and `type_filter`.
#[derive(Debug, Clone, Default)]
pub struct FeedbackListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<FeedbackStatus>,
    pub kind: Option<FeedbackType>,
}

impl FeedbackListQuery {
    pub(crate) fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = self.per_page {
            query.append_pair("per_page", &per_page.to_string());
        }
        if let Some(status) = self.status {
            query.append_pair("status_filter", status.as_str());
        }
        if let Some(kind) = self.kind {
            query.append_pair("type_filter", kind.as_str());
        }
        query.finish()
    }
}

/// Feedback submission and admin triage endpoints.
#[derive(Clone)]
pub struct FeedbackService {
    client: ApiClient,
}

impl FeedbackService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Submit feedback. Works signed-in or anonymous (with contact email).
    pub async fn create(&self, data: &FeedbackCreate) -> Result<Feedback> {
        self.client.post("/feedback", data).await
    }

    /// The caller's own submissions.
    pub async fn my(&self) -> Result<Vec<Feedback>> {
        self.client.get("/feedback/my").await
    }

    pub async fn admin_stats(&self) -> Result<FeedbackStats> {
        self.client.get("/feedback/admin/stats").await
    }

    pub async fn admin_list(&self, query: &FeedbackListQuery) -> Result<PaginatedFeedback> {
        let qs = query.to_query_string();
        let endpoint = if qs.is_empty() {
            "/feedback/admin".to_string()
        } else {
            format!("/feedback/admin?{qs}")
        };
        self.client.get(&endpoint).await
    }

    pub async fn admin_get(&self, id: FeedbackId) -> Result<FeedbackAdmin> {
        self.client.get(&format!("/feedback/admin/{id}")).await
    }

    /// Update triage status and/or notes.
    pub async fn admin_update(
        &self,
        id: FeedbackId,
        data: &FeedbackUpdate,
    ) -> Result<FeedbackAdmin> {
        self.client.patch(&format!("/feedback/admin/{id}"), data).await
    }

    pub async fn admin_delete(&self, id: FeedbackId) -> Result<Message> {
        self.client.delete(&format!("/feedback/admin/{id}")).await
    }
}

use url::form_urlencoded;

use crate::error::Result;
use crate::http::ApiClient;
use crate::types::{AnalyticsSnapshot, UrlCreate, UrlId, UrlList, UrlRecord, UrlStats, UrlUpdate};

/// Short-link endpoints.
#[derive(Clone)]
pub struct UrlService {
    client: ApiClient,
}

impl UrlService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Shorten a URL, optionally with a custom alias and expiry.
    pub async fn create(&self, data: &UrlCreate) -> Result<UrlRecord> {
        self.client.post("/urls", data).await
    }

    /// The caller's links. `search` matches against URL and alias and is
    /// omitted from the query string when absent.
    pub async fn list(&self, search: Option<&str>) -> Result<UrlList> {
        let endpoint = match search {
            Some(term) => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair("search", term)
                    .finish();
                format!("/urls?{query}")
            }
            None => "/urls".to_string(),
        };
        self.client.get(&endpoint).await
    }

    pub async fn get(&self, id: UrlId) -> Result<UrlRecord> {
        self.client.get(&format!("/urls/{id}")).await
    }

    /// Change the alias and/or expiry. The destination URL is immutable.
    pub async fn update(&self, id: UrlId, data: &UrlUpdate) -> Result<UrlRecord> {
        self.client.put(&format!("/urls/{id}"), data).await
    }

    /// Delete a link. The backend answers 204.
    pub async fn delete(&self, id: UrlId) -> Result<()> {
        self.client.delete(&format!("/urls/{id}")).await
    }

    pub async fn stats(&self) -> Result<UrlStats> {
        self.client.get("/urls/stats").await
    }

    pub async fn url_analytics(&self, id: UrlId) -> Result<AnalyticsSnapshot> {
        self.client.get(&format!("/urls/{id}/analytics")).await
    }

    pub async fn account_analytics(&self) -> Result<AnalyticsSnapshot> {
        self.client.get("/urls/analytics").await
    }
}

use async_trait::async_trait;
use reqwest::Client;

use crate::config::StoreConfig;
use crate::error::{CatalogIntelligenceError, Result};
use crate::models::ProjectRecord;
use crate::repository_traits::CatalogRepository;

const PROJECTS_PATH: &str = "/rest/v1/projects";

/// Catalog repository over the hosted store's PostgREST API.
pub struct PostgrestCatalogRepository {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestCatalogRepository {
    pub fn new(cfg: &StoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        }
    }

    async fn query(&self, filters: &[(&str, String)]) -> Result<Vec<ProjectRecord>> {
        let url = format!("{}{}", self.base_url, PROJECTS_PATH);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(filters)
            .send()
            .await
            .map_err(|e| CatalogIntelligenceError::Store(format!("store request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogIntelligenceError::Store(format!(
                "store returned HTTP {status}: {body}"
            )));
        }

        response.json().await.map_err(|e| {
            CatalogIntelligenceError::Store(format!("failed to decode store response: {e}"))
        })
    }
}

/// PostgREST `in.(...)` filter value for a set of IDs.
fn in_list(ids: &[String]) -> String {
    format!("in.({})", ids.join(","))
}

#[async_trait]
impl CatalogRepository for PostgrestCatalogRepository {
    async fn fetch_approved_catalog(&self, limit: usize) -> Result<Vec<ProjectRecord>> {
        tracing::debug!(limit, "fetching approved catalog");
        self.query(&[
            ("select", "*".to_string()),
            ("status", "eq.approved".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ])
        .await
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<ProjectRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(count = ids.len(), "fetching records by id");
        self.query(&[("select", "*".to_string()), ("id", in_list(ids))])
            .await
    }

    async fn fetch_recent_excluding(
        &self,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<ProjectRecord>> {
        let mut filters = vec![
            ("select", "*".to_string()),
            ("status", "eq.approved".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        if !exclude.is_empty() {
            filters.push(("id", format!("not.{}", in_list(exclude))));
        }
        tracing::debug!(limit, excluded = exclude.len(), "fetching fallback pool");
        self.query(&filters).await
    }
}

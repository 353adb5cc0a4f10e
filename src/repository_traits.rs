use crate::error::Result;
use crate::models::ProjectRecord;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Read-only query surface over the catalog store. The store owns the data;
/// this crate never writes through it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync + 'static {
    /// Approved projects, most recent first, bounded by `limit`.
    async fn fetch_approved_catalog(&self, limit: usize) -> Result<Vec<ProjectRecord>>;

    /// Exactly the referenced records. IDs with no row are simply absent from
    /// the result; that is not an error.
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<ProjectRecord>>;

    /// Fallback pool for result padding: recent approved projects excluding the
    /// given IDs, most recent first.
    async fn fetch_recent_excluding(
        &self,
        exclude: &[String],
        limit: usize,
    ) -> Result<Vec<ProjectRecord>>;
}

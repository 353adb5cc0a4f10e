use std::collections::HashMap;

use crate::error::Result;
use crate::models::{RankedRef, RecommendedProject};
use crate::repository_traits::CatalogRepository;

/// Re-join model-referenced IDs against the authoritative store.
///
/// Output order is the order of `refs` (the model's relevance ranking), never a
/// property of the records themselves. IDs with no store row are dropped
/// silently. When the model under-delivers, the result is padded from the
/// recent-projects fallback pool up to `required`; padded entries carry no
/// `ai_reason`. Overdelivery is truncated to `required`.
pub async fn join_ranked<R>(
    repo: &R,
    refs: &[RankedRef],
    required: usize,
) -> Result<Vec<RecommendedProject>>
where
    R: CatalogRepository + ?Sized,
{
    let mut ids: Vec<String> = Vec::new();
    for r in refs {
        if !ids.contains(&r.id) {
            ids.push(r.id.clone());
        }
    }

    let records = repo.fetch_by_ids(&ids).await?;
    let mut by_id: HashMap<String, _> = records
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();

    let mut merged: Vec<RecommendedProject> = Vec::new();
    for r in refs {
        // First matching entry wins the reason; later duplicates are ignored.
        if let Some(record) = by_id.remove(&r.id) {
            merged.push(RecommendedProject {
                project: record,
                ai_reason: Some(r.reason.clone()),
            });
        }
    }

    if merged.len() > required {
        tracing::warn!(
            returned = merged.len(),
            required,
            "model overdelivered - truncating"
        );
        merged.truncate(required);
    }

    if merged.len() < required {
        let deficit = required - merged.len();
        let included: Vec<String> = merged.iter().map(|m| m.project.id.clone()).collect();
        tracing::info!(deficit, "padding result from fallback pool");
        let pool = repo.fetch_recent_excluding(&included, deficit).await?;
        for record in pool.into_iter().take(deficit) {
            merged.push(RecommendedProject {
                project: record,
                ai_reason: None,
            });
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogIntelligenceError;
    use crate::models::ProjectRecord;
    use crate::repository_traits::MockCatalogRepository;
    use chrono::Utc;

    fn record(id: &str) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            title: format!("Project {id}"),
            abstract_text: None,
            tech_stack: None,
            authors: None,
            guide_name: None,
            academic_year: None,
            status: "approved".to_string(),
            created_at: Utc::now(),
        }
    }

    fn refs(ids: &[&str]) -> Vec<RankedRef> {
        ids.iter()
            .map(|id| RankedRef {
                id: id.to_string(),
                reason: format!("reason-{id}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn result_follows_model_order_not_store_order() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Ok(vec![record("a"), record("b"), record("c")]));

        let merged = join_ranked(&repo, &refs(&["c", "a", "b"]), 3).await.unwrap();
        let order: Vec<_> = merged.iter().map(|m| m.project.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(merged[0].ai_reason.as_deref(), Some("reason-c"));
    }

    #[tokio::test]
    async fn unknown_ids_are_dropped_silently() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Ok(vec![record("a")]));
        repo.expect_fetch_recent_excluding()
            .returning(|_, _| Ok(vec![]));

        let merged = join_ranked(&repo, &refs(&["ghost", "a"]), 2).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].project.id, "a");
    }

    #[tokio::test]
    async fn underdelivery_pads_to_required_count_without_duplicates() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Ok(vec![record("a"), record("b")]));
        repo.expect_fetch_recent_excluding()
            .withf(|exclude, limit| exclude == ["a", "b"] && *limit == 2)
            .returning(|_, _| Ok(vec![record("p1"), record("p2")]));

        let merged = join_ranked(&repo, &refs(&["a", "b"]), 4).await.unwrap();
        assert_eq!(merged.len(), 4);
        let ids: Vec<_> = merged.iter().map(|m| m.project.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "p1", "p2"]);
        assert!(merged[2].ai_reason.is_none());
        assert!(merged[3].ai_reason.is_none());
    }

    #[tokio::test]
    async fn exhausted_pool_yields_fewer_than_required() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Ok(vec![record("a")]));
        repo.expect_fetch_recent_excluding()
            .returning(|_, _| Ok(vec![record("p1")]));

        let merged = join_ranked(&repo, &refs(&["a"]), 4).await.unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn overdelivery_is_truncated() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Ok(vec![record("a"), record("b"), record("c")]));

        let merged = join_ranked(&repo, &refs(&["a", "b", "c"]), 2).await.unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first_reason_only() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .withf(|ids| ids == ["a"])
            .returning(|_| Ok(vec![record("a")]));
        repo.expect_fetch_recent_excluding()
            .returning(|_, _| Ok(vec![]));

        let duplicated = vec![
            RankedRef {
                id: "a".to_string(),
                reason: "first".to_string(),
            },
            RankedRef {
                id: "a".to_string(),
                reason: "second".to_string(),
            },
        ];
        let merged = join_ranked(&repo, &duplicated, 2).await.unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].ai_reason.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_fetch_by_ids()
            .returning(|_| Err(CatalogIntelligenceError::Store("connection refused".into())));

        let err = join_ranked(&repo, &refs(&["a"]), 4).await.unwrap_err();
        assert!(matches!(err, CatalogIntelligenceError::Store(_)));
    }
}

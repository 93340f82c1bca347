//! Article service
//!
//! Cached reads over the article repository, with writes delegated to the
//! [`ArticleAssembler`]. Deleting an article is a soft delete: the row stays
//! readable by ID with status `deleted`.

use crate::db::repositories::ArticleRepository;
use crate::db::Predicate;
use crate::models::{Article, ArticleDraft, ArticleFilter};
use anyhow::Context;
use std::sync::Arc;

use super::{ArticleAssembler, ReadThroughCache, ServiceError};

const CACHE_PREFIX_LIST: &str = "articles";
const CACHE_PREFIX_ID: &str = "article_id";

/// Article service
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    assembler: ArticleAssembler,
    cache: Arc<ReadThroughCache>,
}

impl ArticleService {
    pub fn new(
        repo: Arc<dyn ArticleRepository>,
        assembler: ArticleAssembler,
        cache: Arc<ReadThroughCache>,
    ) -> Self {
        Self {
            repo,
            assembler,
            cache,
        }
    }

    /// List articles matching the filter, ordered by ID.
    ///
    /// Soft-deleted articles are included unless the filter asks for a
    /// specific status.
    pub async fn list_all(&self, filter: &ArticleFilter) -> Result<Vec<Article>, ServiceError> {
        let predicate = Predicate::from(filter);
        self.cache
            .list(CACHE_PREFIX_LIST, &filter.canonical_query(), || async {
                self.repo
                    .list_all(&predicate)
                    .await
                    .context("Failed to list articles")
                    .map_err(Into::into)
            })
            .await
    }

    /// Get article by ID, soft-deleted ones included
    pub async fn get_by_id(&self, id: i64) -> Result<Article, ServiceError> {
        self.cache
            .entity(CACHE_PREFIX_ID, id, || async {
                self.repo
                    .get_by_id(id)
                    .await
                    .context("Failed to get article by ID")?
                    .ok_or_else(|| ServiceError::not_found("Article", id))
            })
            .await
    }

    /// Create an article, or overwrite the one named by `draft.id`
    pub async fn save(&self, draft: ArticleDraft) -> Result<Article, ServiceError> {
        let saved = self.assembler.save(draft).await?;
        self.cache.invalidate().await;
        tracing::info!(id = saved.id, status = %saved.status, "Article saved");
        Ok(saved)
    }

    /// Overwrite the article with the given ID
    pub async fn update(&self, draft: ArticleDraft, id: i64) -> Result<Article, ServiceError> {
        if id == 0 {
            return Err(ServiceError::validation("Article ID is required"));
        }
        self.save(draft.with_id(id)).await
    }

    /// Soft-delete an article
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.assembler.delete(id).await?;
        self.cache.invalidate().await;
        tracing::info!(id, "Article deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleStatus, TagFilter, TagInput};
    use crate::services::testing::Fixture;
    use crate::services::TagService;

    struct Services {
        fx: Fixture,
        articles: ArticleService,
        tags: TagService,
    }

    async fn setup() -> Services {
        let fx = Fixture::new().await;
        let cache = fx.read_through();
        let assembler = ArticleAssembler::new(
            fx.article_repo.clone(),
            fx.topic_repo.clone(),
            fx.tag_repo.clone(),
        );
        Services {
            articles: ArticleService::new(fx.article_repo.clone(), assembler, cache.clone()),
            tags: TagService::new(fx.tag_repo.clone(), cache),
            fx,
        }
    }

    #[tokio::test]
    async fn test_save_publish_with_missing_tag() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let fund = s.fx.tag("fund").await;

        let saved = s
            .articles
            .save(ArticleDraft::new("Rates", "publish", topic.id).with_tags(vec![fund.id, 999]))
            .await
            .unwrap();

        assert_eq!(saved.tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![fund.id]);
        assert!(saved.published_at.is_some());
        assert_eq!(s.articles.get_by_id(saved.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_invalid_status_writes_nothing_and_keeps_cache() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;

        let result = s
            .articles
            .save(ArticleDraft::new("Rates", "archived", topic.id))
            .await;

        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
        assert_eq!(s.fx.count_rows("articles").await, 0);
        assert_eq!(s.fx.cache.flush_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_get_shows_deleted() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let saved = s
            .articles
            .save(ArticleDraft::new("Rates", "publish", topic.id))
            .await
            .unwrap();
        s.articles.get_by_id(saved.id).await.unwrap();

        s.articles.delete(saved.id).await.unwrap();

        let deleted = s.articles.get_by_id(saved.id).await.unwrap();
        assert_eq!(deleted.status, ArticleStatus::Deleted);
        assert!(deleted.deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_update_requires_existing_article() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let draft = ArticleDraft::new("Rates", "draft", topic.id);

        assert!(matches!(
            s.articles.update(draft.clone(), 0).await,
            Err(ServiceError::ValidationError(_))
        ));
        assert!(matches!(
            s.articles.update(draft, 31).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let sport = s.fx.topic("sport").await;
        let saved = s
            .articles
            .save(ArticleDraft::new("Rates", "draft", topic.id))
            .await
            .unwrap();

        let updated = s
            .articles
            .update(
                ArticleDraft::new("Final score", "publish", sport.id).with_content("3-1"),
                saved.id,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.title, "Final score");
        assert_eq!(updated.content, "3-1");
        assert_eq!(updated.topic_id, sport.id);
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_list_filters_and_caching() {
        let s = setup().await;
        let economy = s.fx.topic("economy").await;
        let sport = s.fx.topic("sport").await;
        for (title, status, topic) in [
            ("a", "draft", economy.id),
            ("b", "publish", economy.id),
            ("c", "publish", sport.id),
        ] {
            s.articles
                .save(ArticleDraft::new(title, status, topic))
                .await
                .unwrap();
        }

        let published = s
            .articles
            .list_all(&ArticleFilter::by_status("publish"))
            .await
            .unwrap();
        assert_eq!(published.len(), 2);

        let economy_only = s
            .articles
            .list_all(&ArticleFilter::by_topic(economy.id))
            .await
            .unwrap();
        assert_eq!(economy_only.len(), 2);

        // Cached until the next write
        s.fx.raw("DELETE FROM articles").await;
        assert_eq!(
            s.articles
                .list_all(&ArticleFilter::by_status("publish"))
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_write_on_one_entity_flushes_all() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let saved = s
            .articles
            .save(ArticleDraft::new("Rates", "draft", topic.id))
            .await
            .unwrap();

        // Warm both caches, then change storage behind their back
        s.articles.get_by_id(saved.id).await.unwrap();
        s.tags.list_all(&TagFilter::default()).await.unwrap();
        s.fx.raw("UPDATE articles SET title = 'changed'").await;

        s.tags.add(TagInput::new("fund")).await.unwrap();

        assert_eq!(s.articles.get_by_id(saved.id).await.unwrap().title, "changed");
    }

    #[tokio::test]
    async fn test_deleting_tag_updates_article_after_flush() {
        let s = setup().await;
        let topic = s.fx.topic("economy").await;
        let tag = s.tags.add(TagInput::new("fund")).await.unwrap();
        let saved = s
            .articles
            .save(ArticleDraft::new("Rates", "draft", topic.id).with_tags(vec![tag.id]))
            .await
            .unwrap();
        assert_eq!(s.articles.get_by_id(saved.id).await.unwrap().tags.len(), 1);

        s.tags.delete(tag.id).await.unwrap();

        assert!(s.articles.get_by_id(saved.id).await.unwrap().tags.is_empty());
    }
}

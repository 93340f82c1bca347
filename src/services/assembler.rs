//! Article assembler
//!
//! Turns an `ArticleDraft` into a persisted `Article`: validates the
//! requested status, resolves the topic and tags, carries over what must
//! survive from the stored row and stamps the lifecycle timestamps.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use futures::future::try_join_all;

use crate::db::repositories::{ArticleRepository, TagRepository, TopicRepository};
use crate::models::{Article, ArticleDraft, ArticleStatus, Tag};

use super::ServiceError;

pub struct ArticleAssembler {
    articles: Arc<dyn ArticleRepository>,
    topics: Arc<dyn TopicRepository>,
    tags: Arc<dyn TagRepository>,
}

impl ArticleAssembler {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        topics: Arc<dyn TopicRepository>,
        tags: Arc<dyn TagRepository>,
    ) -> Self {
        Self {
            articles,
            topics,
            tags,
        }
    }

    /// Validate, resolve and persist a draft.
    ///
    /// A draft without an ID, or with ID 0, is inserted as a new article.
    ///
    /// # Errors
    /// - `ValidationError` if the status is not `draft`/`publish` or the topic ID is 0
    /// - `NotFound` if the topic or the article named by `draft.id` does not exist
    /// - `StorageError` if persistence fails
    pub async fn save(&self, draft: ArticleDraft) -> Result<Article, ServiceError> {
        let status = ArticleStatus::parse(&draft.status)
            .filter(ArticleStatus::is_savable)
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "Invalid article status '{}': expected draft or publish",
                    draft.status
                ))
            })?;

        if draft.topic_id == 0 {
            return Err(ServiceError::validation("Article topic is required"));
        }

        let topic = self
            .topics
            .get_by_id(draft.topic_id)
            .await
            .context("Failed to get topic")?
            .ok_or_else(|| ServiceError::not_found("Topic", draft.topic_id))?;

        let existing = match draft.id.filter(|id| *id != 0) {
            Some(id) => Some(
                self.articles
                    .get_by_id(id)
                    .await
                    .context("Failed to get article")?
                    .ok_or_else(|| ServiceError::not_found("Article", id))?,
            ),
            None => None,
        };

        let tags = self.resolve_tags(&draft.tags).await?;

        let now = Utc::now();
        let published_at = match (status, &existing) {
            (ArticleStatus::Draft, _) => None,
            (ArticleStatus::Publish, Some(prev)) if prev.status == ArticleStatus::Publish => {
                prev.published_at.or(Some(now))
            }
            _ => Some(now),
        };

        let article = Article {
            id: existing.as_ref().map_or(0, |a| a.id),
            title: draft.title,
            writer: draft.writer,
            content: draft.content,
            status,
            tags,
            topic_id: topic.id,
            topic: Some(topic),
            published_at,
            created_at: existing.as_ref().map_or(now, |a| a.created_at),
            updated_at: now,
            deleted_at: None,
        };

        let saved = self
            .articles
            .upsert(&article)
            .await
            .context("Failed to save article")?;

        tracing::debug!(id = saved.id, status = %saved.status, "Article saved");
        Ok(saved)
    }

    /// Soft-delete an article: status `deleted` plus a deletion timestamp.
    pub async fn delete(&self, id: i64) -> Result<Article, ServiceError> {
        let mut article = self
            .articles
            .get_by_id(id)
            .await
            .context("Failed to get article")?
            .ok_or_else(|| ServiceError::not_found("Article", id))?;

        article.status = ArticleStatus::Deleted;
        article.deleted_at = Some(Utc::now());

        let deleted = self
            .articles
            .upsert(&article)
            .await
            .context("Failed to delete article")?;

        tracing::debug!(id, "Article soft-deleted");
        Ok(deleted)
    }

    /// Resolve each distinct ID on its own; unknown IDs are dropped.
    async fn resolve_tags(&self, ids: &[i64]) -> Result<Vec<Tag>, ServiceError> {
        let ids: BTreeSet<i64> = ids.iter().copied().collect();

        let lookups = ids.into_iter().map(|id| async move {
            let tag = self.tags.get_by_id(id).await.context("Failed to get tag")?;
            if tag.is_none() {
                tracing::debug!(tag_id = id, "Dropping unknown tag");
            }
            Ok::<_, anyhow::Error>(tag)
        });

        let resolved = try_join_all(lookups).await?;
        Ok(resolved.into_iter().flatten().collect())
    }
}

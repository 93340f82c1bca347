//! Topic service
//!
//! Topics mirror tags, except that a topic still referenced by an article
//! cannot be deleted.

use crate::db::repositories::TopicRepository;
use crate::db::Predicate;
use crate::models::{Topic, TopicFilter, TopicInput};
use anyhow::Context;
use std::sync::Arc;

use super::{require, validate_label, ReadThroughCache, ServiceError};

const CACHE_PREFIX_LIST: &str = "topics";
const CACHE_PREFIX_ID: &str = "topic_id";

/// Topic service
pub struct TopicService {
    repo: Arc<dyn TopicRepository>,
    cache: Arc<ReadThroughCache>,
}

impl TopicService {
    /// Create a new topic service
    ///
    /// # Arguments
    /// * `repo` - Topic repository for database operations
    /// * `cache` - Read-through cache shared by all services
    pub fn new(repo: Arc<dyn TopicRepository>, cache: Arc<ReadThroughCache>) -> Self {
        Self { repo, cache }
    }

    /// List topics matching the filter, ordered by ID
    pub async fn list_all(&self, filter: &TopicFilter) -> Result<Vec<Topic>, ServiceError> {
        let predicate = Predicate::from(filter);
        self.cache
            .list(CACHE_PREFIX_LIST, &filter.canonical_query(), || async {
                self.repo
                    .list_all(&predicate)
                    .await
                    .context("Failed to list topics")
                    .map_err(Into::into)
            })
            .await
    }

    /// Get topic by ID
    ///
    /// # Errors
    /// - `NotFound` if the topic doesn't exist
    pub async fn get_by_id(&self, id: i64) -> Result<Topic, ServiceError> {
        self.cache
            .entity(CACHE_PREFIX_ID, id, || async {
                require(self.repo.get_by_id(id).await, "Topic", id)
            })
            .await
    }

    /// Add a new topic
    ///
    /// # Errors
    /// - `ValidationError` if the label is empty
    pub async fn add(&self, input: TopicInput) -> Result<Topic, ServiceError> {
        let label = validate_label("Topic", &input.label)?;

        let created = self
            .repo
            .upsert(&Topic::new(label))
            .await
            .context("Failed to create topic")?;

        self.cache.invalidate().await;
        tracing::info!(id = created.id, label = %created.label, "Topic created");
        Ok(created)
    }

    /// Rename an existing topic
    ///
    /// # Errors
    /// - `ValidationError` if the label is empty or the ID is 0
    /// - `NotFound` if the topic doesn't exist
    pub async fn update(&self, input: TopicInput, id: i64) -> Result<Topic, ServiceError> {
        let label = validate_label("Topic", &input.label)?;
        if id == 0 {
            return Err(ServiceError::validation("Topic ID is required"));
        }

        let mut topic = require(self.repo.get_by_id(id).await, "Topic", id)?;
        topic.label = label;

        let updated = self
            .repo
            .upsert(&topic)
            .await
            .context("Failed to update topic")?;

        self.cache.invalidate().await;
        Ok(updated)
    }

    /// Delete a topic
    ///
    /// # Errors
    /// - `NotFound` if the topic doesn't exist
    /// - `StorageError` if an article still references the topic
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        require(self.repo.get_by_id(id).await, "Topic", id)?;

        self.repo
            .delete_by_id(id)
            .await
            .context("Failed to delete topic")?;

        self.cache.invalidate().await;
        tracing::info!(id, "Topic deleted");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Fixture;

    async fn setup() -> (Fixture, TopicService) {
        let fx = Fixture::new().await;
        let service = TopicService::new(fx.topic_repo.clone(), fx.read_through());
        (fx, service)
    }

    #[tokio::test]
    async fn test_add_then_list_by_label() {
        let (_fx, service) = setup().await;

        service.add(TopicInput::new("economy")).await.unwrap();
        service.add(TopicInput::new("sport")).await.unwrap();

        let topics = service.list_all(&TopicFilter::by_label("economy")).await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].label, "economy");
    }

    #[tokio::test]
    async fn test_add_trims_and_rejects_empty_label() {
        let (fx, service) = setup().await;

        let topic = service.add(TopicInput::new("  economy ")).await.unwrap();
        assert_eq!(topic.label, "economy");

        let result = service.add(TopicInput::new("   ")).await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
        assert_eq!(fx.count_rows("topics").await, 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_fx, service) = setup().await;

        assert!(matches!(service.get_by_id(42).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reads_are_served_from_cache() {
        let (fx, service) = setup().await;
        let topic = service.add(TopicInput::new("economy")).await.unwrap();

        assert_eq!(service.get_by_id(topic.id).await.unwrap().label, "economy");
        assert_eq!(service.list_all(&TopicFilter::default()).await.unwrap().len(), 1);

        fx.raw("UPDATE topics SET label = 'changed'").await;
        fx.raw("INSERT INTO topics (label, created_at, updated_at) VALUES ('x', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')").await;

        assert_eq!(service.get_by_id(topic.id).await.unwrap().label, "economy");
        assert_eq!(service.list_all(&TopicFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_write_invalidates_cache() {
        let (_fx, service) = setup().await;
        let topic = service.add(TopicInput::new("economy")).await.unwrap();
        service.get_by_id(topic.id).await.unwrap();

        service.update(TopicInput::new("economics"), topic.id).await.unwrap();

        assert_eq!(service.get_by_id(topic.id).await.unwrap().label, "economics");
    }

    #[tokio::test]
    async fn test_update_validation() {
        let (fx, service) = setup().await;

        let empty = service.update(TopicInput::new(""), 1).await;
        assert!(matches!(empty, Err(ServiceError::ValidationError(_))));

        let zero = service.update(TopicInput::new("economy"), 0).await;
        assert!(matches!(zero, Err(ServiceError::ValidationError(_))));

        let missing = service.update(TopicInput::new("economy"), 9).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        assert_eq!(fx.cache.flush_count(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (fx, service) = setup().await;
        let topic = service.add(TopicInput::new("economy")).await.unwrap();

        service.delete(topic.id).await.unwrap();

        assert!(matches!(service.get_by_id(topic.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(topic.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(fx.count_rows("topics").await, 0);
    }

    #[tokio::test]
    async fn test_delete_referenced_topic_fails() {
        let (fx, service) = setup().await;
        let topic = service.add(TopicInput::new("economy")).await.unwrap();
        fx.raw(&format!(
            "INSERT INTO articles (title, writer, content, status, topic_id, created_at, updated_at) \
             VALUES ('t', 'w', 'c', 'draft', {}, '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
            topic.id
        ))
        .await;
        let flushes = fx.cache.flush_count();

        let result = service.delete(topic.id).await;

        assert!(matches!(result, Err(ServiceError::StorageError(_))));
        assert_eq!(fx.count_rows("topics").await, 1);
        assert_eq!(fx.cache.flush_count(), flushes);
    }
}

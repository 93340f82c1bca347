//! Tag service
//!
//! Implements business logic for tag management:
//! - Filtered, cached listing and lookup
//! - Add / rename with label validation
//! - Hard delete (article associations go with it)

use crate::db::repositories::TagRepository;
use crate::db::Predicate;
use crate::models::{Tag, TagFilter, TagInput};
use anyhow::Context;
use std::sync::Arc;

use super::{require, validate_label, ReadThroughCache, ServiceError};

const CACHE_PREFIX_LIST: &str = "tags";
const CACHE_PREFIX_ID: &str = "tag_id";

/// Tag service for managing article tags
pub struct TagService {
    repo: Arc<dyn TagRepository>,
    cache: Arc<ReadThroughCache>,
}

impl TagService {
    /// Create a new tag service
    ///
    /// # Arguments
    /// * `repo` - Tag repository for database operations
    /// * `cache` - Read-through cache shared by all services
    pub fn new(repo: Arc<dyn TagRepository>, cache: Arc<ReadThroughCache>) -> Self {
        Self { repo, cache }
    }

    /// List tags matching the filter, ordered by ID
    pub async fn list_all(&self, filter: &TagFilter) -> Result<Vec<Tag>, ServiceError> {
        let predicate = Predicate::from(filter);
        self.cache
            .list(CACHE_PREFIX_LIST, &filter.canonical_query(), || async {
                self.repo
                    .list_all(&predicate)
                    .await
                    .context("Failed to list tags")
                    .map_err(Into::into)
            })
            .await
    }

    /// Get tag by ID
    ///
    /// # Errors
    /// - `NotFound` if the tag doesn't exist
    pub async fn get_by_id(&self, id: i64) -> Result<Tag, ServiceError> {
        self.cache
            .entity(CACHE_PREFIX_ID, id, || async {
                require(self.repo.get_by_id(id).await, "Tag", id)
            })
            .await
    }

    /// Add a new tag
    ///
    /// # Errors
    /// - `ValidationError` if the label is empty
    pub async fn add(&self, input: TagInput) -> Result<Tag, ServiceError> {
        let label = validate_label("Tag", &input.label)?;

        let created = self
            .repo
            .upsert(&Tag::new(label))
            .await
            .context("Failed to create tag")?;

        self.cache.invalidate().await;
        tracing::info!(id = created.id, label = %created.label, "Tag created");
        Ok(created)
    }

    /// Rename an existing tag
    ///
    /// # Errors
    /// - `ValidationError` if the label is empty or the ID is 0
    /// - `NotFound` if the tag doesn't exist
    pub async fn update(&self, input: TagInput, id: i64) -> Result<Tag, ServiceError> {
        let label = validate_label("Tag", &input.label)?;
        if id == 0 {
            return Err(ServiceError::validation("Tag ID is required"));
        }

        let mut tag = require(self.repo.get_by_id(id).await, "Tag", id)?;
        tag.label = label;

        let updated = self
            .repo
            .upsert(&tag)
            .await
            .context("Failed to update tag")?;

        self.cache.invalidate().await;
        Ok(updated)
    }

    /// Delete a tag
    ///
    /// Article associations are removed by the storage cascade.
    ///
    /// # Errors
    /// - `NotFound` if the tag doesn't exist
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        require(self.repo.get_by_id(id).await, "Tag", id)?;

        self.repo
            .delete_by_id(id)
            .await
            .context("Failed to delete tag")?;

        self.cache.invalidate().await;
        tracing::info!(id, "Tag deleted");
        Ok(())
    }
}

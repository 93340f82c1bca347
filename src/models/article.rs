//! Article model
//!
//! This module provides:
//! - `Article` entity with its resolved topic and tags
//! - `ArticleStatus` lifecycle states (draft, publish, deleted)
//! - `ArticleDraft`, the unvalidated input of the save workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Tag, Topic};

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    pub title: String,
    pub writer: String,
    /// Article body
    pub content: String,
    pub status: ArticleStatus,
    /// Resolved tags, ordered by tag ID
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub topic_id: i64,
    /// Resolved topic, populated on every read
    #[serde(default)]
    pub topic: Option<Topic>,
    /// Set when the article enters the publish state
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set by the soft delete
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Article lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    /// Work in progress
    #[default]
    Draft,
    /// Visible to readers
    Publish,
    /// Soft-deleted; the row stays queryable by ID
    Deleted,
}

impl ArticleStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Publish => "publish",
            ArticleStatus::Deleted => "deleted",
        }
    }

    /// Parse status from its database string representation.
    ///
    /// Matching is exact: `"Publish"` is not a valid status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ArticleStatus::Draft),
            "publish" => Some(ArticleStatus::Publish),
            "deleted" => Some(ArticleStatus::Deleted),
            _ => None,
        }
    }

    /// Whether a save request may put an article into this state
    pub fn is_savable(&self) -> bool {
        matches!(self, ArticleStatus::Draft | ArticleStatus::Publish)
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input of the article save workflow.
///
/// `status` is kept as free text so that unknown values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleDraft {
    /// Existing article to overwrite; `None` creates a new one
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub writer: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: String,
    /// Requested tag IDs; unknown IDs are dropped during save
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub topic_id: i64,
}

impl ArticleDraft {
    pub fn new(title: impl Into<String>, status: impl Into<String>, topic_id: i64) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            topic_id,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_writer(mut self, writer: impl Into<String>) -> Self {
        self.writer = writer.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<i64>) -> Self {
        self.tags = tags;
        self
    }
}

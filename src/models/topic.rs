//! Topic model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic entity.
///
/// Every article belongs to exactly one topic. A topic cannot be deleted
/// while an article still references it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: i64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    /// Create an unsaved topic with ID 0
    pub fn new(label: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            label,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for adding or renaming a topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicInput {
    #[serde(default)]
    pub label: String,
}

impl TopicInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

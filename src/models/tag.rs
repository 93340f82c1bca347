//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity.
///
/// Tags are attached to articles many-to-many and are physically removed on
/// delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier (0 until persisted)
    pub id: i64,
    /// Display label
    pub label: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Create an unsaved tag.
    ///
    /// The ID will be set to 0 and is assigned by the database.
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

/// Request body for adding or renaming a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInput {
    #[serde(default)]
    pub label: String,
}

impl TagInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

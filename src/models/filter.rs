//! List filters
//!
//! Filters are read from the query string of list requests and passed
//! explicitly to the services. Each filter also knows its canonical query
//! string, which the read-through cache hashes into a key.

use serde::{Deserialize, Serialize};

/// Filter for listing tags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TagFilter {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_start: Option<String>,
    #[serde(default)]
    pub created_end: Option<String>,
}

/// Filter for listing topics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TopicFilter {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_start: Option<String>,
    #[serde(default)]
    pub created_end: Option<String>,
}

/// Filter for listing articles
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArticleFilter {
    #[serde(default)]
    pub status: Option<String>,
    /// Topic ID; 0 means no constraint
    #[serde(default)]
    pub topic: Option<i64>,
    #[serde(default)]
    pub created_start: Option<String>,
    #[serde(default)]
    pub created_end: Option<String>,
}

impl TagFilter {
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn created_between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.created_start = Some(start.into());
        self.created_end = Some(end.into());
        self
    }

    pub fn canonical_query(&self) -> String {
        encode_pairs(vec![
            ("created_end", non_empty(&self.created_end)),
            ("created_start", non_empty(&self.created_start)),
            ("label", non_empty(&self.label)),
        ])
    }
}

impl TopicFilter {
    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn created_between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.created_start = Some(start.into());
        self.created_end = Some(end.into());
        self
    }

    pub fn canonical_query(&self) -> String {
        encode_pairs(vec![
            ("created_end", non_empty(&self.created_end)),
            ("created_start", non_empty(&self.created_start)),
            ("label", non_empty(&self.label)),
        ])
    }
}

impl ArticleFilter {
    pub fn by_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn by_topic(topic: i64) -> Self {
        Self {
            topic: Some(topic),
            ..Default::default()
        }
    }

    pub fn created_between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.created_start = Some(start.into());
        self.created_end = Some(end.into());
        self
    }

    pub fn canonical_query(&self) -> String {
        let topic = self.topic.filter(|id| *id != 0).map(|id| id.to_string());
        encode_pairs(vec![
            ("created_end", non_empty(&self.created_end)),
            ("created_start", non_empty(&self.created_start)),
            ("status", non_empty(&self.status)),
            ("topic", topic),
        ])
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Join set pairs as `key=value&...`; callers pass keys in sorted order.
fn encode_pairs(pairs: Vec<(&str, Option<String>)>) -> String {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, urlencoding::encode(&v))))
        .collect::<Vec<_>>()
        .join("&")
}

//! Data models
//!
//! This module contains the data structures shared by the storage, service
//! and HTTP layers:
//! - Entities (Article, Tag, Topic)
//! - Write inputs (ArticleDraft, TagInput, TopicInput)
//! - List filters

mod article;
mod filter;
mod tag;
mod topic;

pub use article::{Article, ArticleDraft, ArticleStatus};
pub use filter::{ArticleFilter, TagFilter, TopicFilter};
pub use tag::{Tag, TagInput};
pub use topic::{Topic, TopicInput};

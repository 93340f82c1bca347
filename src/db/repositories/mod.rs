//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository owns the queries for one entity.

pub mod article;
pub mod tag;
pub mod topic;

/// An update addressed a row that does not exist (or vanished meanwhile)
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} does not exist")]
pub struct MissingRow {
    pub entity: &'static str,
    pub id: i64,
}

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use topic::{SqlxTopicRepository, TopicRepository};

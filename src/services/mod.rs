//! Services layer - Business logic
//!
//! One service per entity type. Each service validates its input, talks to
//! its repository through the read-through cache and flushes the cache after
//! every successful write.

pub mod article;
pub mod assembler;
pub mod error;
pub mod read_through;
pub mod tag;
pub mod topic;

pub use article::ArticleService;
pub use assembler::ArticleAssembler;
pub use error::ServiceError;
pub use read_through::ReadThroughCache;
pub use tag::TagService;
pub use topic::TopicService;

use anyhow::Context;

/// Trim a tag or topic label, rejecting blank ones
pub(crate) fn validate_label(entity: &str, label: &str) -> Result<String, ServiceError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{} label cannot be empty", entity)));
    }
    Ok(trimmed.to_string())
}

/// Unwrap a repository lookup, turning an absent row into `NotFound`
pub(crate) fn require<T>(
    lookup: anyhow::Result<Option<T>>,
    entity: &'static str,
    id: i64,
) -> Result<T, ServiceError> {
    lookup
        .with_context(|| format!("Failed to get {} {}", entity, id))?
        .ok_or_else(|| ServiceError::not_found(entity, id))
}

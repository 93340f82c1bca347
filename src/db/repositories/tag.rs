//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::{Backend, DynDatabasePool, Predicate};
use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::MissingRow;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List tags matching the predicate, ordered by ID
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Tag>>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Insert the tag when its ID is 0, otherwise update the row with that ID
    async fn upsert(&self, tag: &Tag) -> Result<Tag>;

    /// Delete a tag and its article associations
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

/// SQLx-based tag repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Tag>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_tags_sqlite(pool, predicate).await,
            Backend::Mysql(pool) => list_tags_mysql(pool, predicate).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_tag_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_tag_by_id_mysql(pool, id).await,
        }
    }

    async fn upsert(&self, tag: &Tag) -> Result<Tag> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => upsert_tag_sqlite(pool, tag).await,
            Backend::Mysql(pool) => upsert_tag_mysql(pool, tag).await,
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_tag_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_tag_mysql(pool, id).await,
        }
    }
}

const SELECT_TAGS: &str = "SELECT id, label, created_at, updated_at FROM tags";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_tags_sqlite(pool: &SqlitePool, predicate: &Predicate) -> Result<Vec<Tag>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TAGS);
    predicate.push_where(&mut qb, DatabaseDriver::Sqlite, None);
    qb.push(" ORDER BY id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    rows.iter().map(row_to_tag_sqlite).collect()
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_TAGS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    row.as_ref().map(row_to_tag_sqlite).transpose()
}

async fn upsert_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<Tag> {
    let now = Utc::now();

    if tag.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO tags (label, created_at, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&tag.label)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

        return Ok(Tag {
            id: result.last_insert_rowid(),
            label: tag.label.clone(),
            created_at: now,
            updated_at: now,
        });
    }

    let result = sqlx::query("UPDATE tags SET label = ?, updated_at = ? WHERE id = ?")
        .bind(&tag.label)
        .bind(now)
        .bind(tag.id)
        .execute(pool)
        .await
        .context("Failed to update tag")?;

    if result.rows_affected() == 0 {
        return Err(MissingRow {
            entity: "Tag",
            id: tag.id,
        }
        .into());
    }

    Ok(Tag {
        updated_at: now,
        ..tag.clone()
    })
}

async fn delete_tag_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete tag")?;

    Ok(())
}

pub(crate) fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_tags_mysql(pool: &MySqlPool, predicate: &Predicate) -> Result<Vec<Tag>> {
    let mut qb = QueryBuilder::<MySql>::new(SELECT_TAGS);
    predicate.push_where(&mut qb, DatabaseDriver::Mysql, None);
    qb.push(" ORDER BY id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list tags")?;

    rows.iter().map(row_to_tag_mysql).collect()
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Tag>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_TAGS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by ID")?;

    row.as_ref().map(row_to_tag_mysql).transpose()
}

async fn upsert_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<Tag> {
    let now = Utc::now();

    if tag.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO tags (label, created_at, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&tag.label)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create tag")?;

        return Ok(Tag {
            id: result.last_insert_id() as i64,
            label: tag.label.clone(),
            created_at: now,
            updated_at: now,
        });
    }

    // MySQL reports matched-but-unchanged rows as 0 affected, so check existence
    if get_tag_by_id_mysql(pool, tag.id).await?.is_none() {
        return Err(MissingRow {
            entity: "Tag",
            id: tag.id,
        }
        .into());
    }

    sqlx::query("UPDATE tags SET label = ?, updated_at = ? WHERE id = ?")
        .bind(&tag.label)
        .bind(now)
        .bind(tag.id)
        .execute(pool)
        .await
        .context("Failed to update tag")?;

    Ok(Tag {
        updated_at: now,
        ..tag.clone()
    })
}

async fn delete_tag_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete tag")?;

    Ok(())
}

pub(crate) fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

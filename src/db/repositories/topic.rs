//! Topic repository
//!
//! Database operations for topics.
//!
//! This module provides:
//! - `TopicRepository` trait defining the interface for topic data access
//! - `SqlxTopicRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::{Backend, DynDatabasePool, Predicate};
use crate::models::Topic;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::MissingRow;

/// Topic repository trait
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// List topics matching the predicate, ordered by ID
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Topic>>;

    /// Get topic by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Topic>>;

    /// Insert the topic when its ID is 0, otherwise update the row with that ID
    async fn upsert(&self, topic: &Topic) -> Result<Topic>;

    /// Delete a topic.
    ///
    /// Fails while any article still references the topic.
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

/// SQLx-based topic repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTopicRepository {
    pool: DynDatabasePool,
}

impl SqlxTopicRepository {
    /// Create a new SQLx topic repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TopicRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TopicRepository for SqlxTopicRepository {
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Topic>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_topics_sqlite(pool, predicate).await,
            Backend::Mysql(pool) => list_topics_mysql(pool, predicate).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Topic>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_topic_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_topic_by_id_mysql(pool, id).await,
        }
    }

    async fn upsert(&self, topic: &Topic) -> Result<Topic> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => upsert_topic_sqlite(pool, topic).await,
            Backend::Mysql(pool) => upsert_topic_mysql(pool, topic).await,
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => delete_topic_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_topic_mysql(pool, id).await,
        }
    }
}

const SELECT_TOPICS: &str = "SELECT id, label, created_at, updated_at FROM topics";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_topics_sqlite(pool: &SqlitePool, predicate: &Predicate) -> Result<Vec<Topic>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TOPICS);
    predicate.push_where(&mut qb, DatabaseDriver::Sqlite, None);
    qb.push(" ORDER BY id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list topics")?;

    rows.iter().map(row_to_topic_sqlite).collect()
}

async fn get_topic_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Topic>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_TOPICS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get topic by ID")?;

    row.as_ref().map(row_to_topic_sqlite).transpose()
}

async fn upsert_topic_sqlite(pool: &SqlitePool, topic: &Topic) -> Result<Topic> {
    let now = Utc::now();

    if topic.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO topics (label, created_at, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&topic.label)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create topic")?;

        return Ok(Topic {
            id: result.last_insert_rowid(),
            label: topic.label.clone(),
            created_at: now,
            updated_at: now,
        });
    }

    let result = sqlx::query("UPDATE topics SET label = ?, updated_at = ? WHERE id = ?")
        .bind(&topic.label)
        .bind(now)
        .bind(topic.id)
        .execute(pool)
        .await
        .context("Failed to update topic")?;

    if result.rows_affected() == 0 {
        return Err(MissingRow {
            entity: "Topic",
            id: topic.id,
        }
        .into());
    }

    Ok(Topic {
        updated_at: now,
        ..topic.clone()
    })
}

async fn delete_topic_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete topic")?;

    Ok(())
}

pub(crate) fn row_to_topic_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_topics_mysql(pool: &MySqlPool, predicate: &Predicate) -> Result<Vec<Topic>> {
    let mut qb = QueryBuilder::<MySql>::new(SELECT_TOPICS);
    predicate.push_where(&mut qb, DatabaseDriver::Mysql, None);
    qb.push(" ORDER BY id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list topics")?;

    rows.iter().map(row_to_topic_mysql).collect()
}

async fn get_topic_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Topic>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_TOPICS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get topic by ID")?;

    row.as_ref().map(row_to_topic_mysql).transpose()
}

async fn upsert_topic_mysql(pool: &MySqlPool, topic: &Topic) -> Result<Topic> {
    let now = Utc::now();

    if topic.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO topics (label, created_at, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&topic.label)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create topic")?;

        return Ok(Topic {
            id: result.last_insert_id() as i64,
            label: topic.label.clone(),
            created_at: now,
            updated_at: now,
        });
    }

    // MySQL reports matched-but-unchanged rows as 0 affected, so check existence
    if get_topic_by_id_mysql(pool, topic.id).await?.is_none() {
        return Err(MissingRow {
            entity: "Topic",
            id: topic.id,
        }
        .into());
    }

    sqlx::query("UPDATE topics SET label = ?, updated_at = ? WHERE id = ?")
        .bind(&topic.label)
        .bind(now)
        .bind(topic.id)
        .execute(pool)
        .await
        .context("Failed to update topic")?;

    Ok(Topic {
        updated_at: now,
        ..topic.clone()
    })
}

async fn delete_topic_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete topic")?;

    Ok(())
}

pub(crate) fn row_to_topic_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Topic> {
    Ok(Topic {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

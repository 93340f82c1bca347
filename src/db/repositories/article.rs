//! Article repository
//!
//! Database operations for articles.
//!
//! Every read returns articles with their topic and tags resolved. Every
//! upsert rewrites the article row and its tag associations in a single
//! transaction.

use crate::config::DatabaseDriver;
use crate::db::{Backend, DynDatabasePool, Predicate};
use crate::models::{Article, ArticleStatus, Tag, Topic};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::tag::{row_to_tag_mysql, row_to_tag_sqlite};
use super::MissingRow;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// List articles matching the predicate, ordered by ID
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Article>>;

    /// Get article by ID, including soft-deleted ones
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Insert the article when its ID is 0, otherwise overwrite the row with
    /// that ID. The stored tag set is replaced by `article.tags`.
    async fn upsert(&self, article: &Article) -> Result<Article>;
}

/// SQLx-based article repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn list_all(&self, predicate: &Predicate) -> Result<Vec<Article>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => list_articles_sqlite(pool, predicate).await,
            Backend::Mysql(pool) => list_articles_mysql(pool, predicate).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => get_article_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_article_by_id_mysql(pool, id).await,
        }
    }

    async fn upsert(&self, article: &Article) -> Result<Article> {
        match self.pool.backend() {
            Backend::Sqlite(pool) => upsert_article_sqlite(pool, article).await,
            Backend::Mysql(pool) => upsert_article_mysql(pool, article).await,
        }
    }
}

const SELECT_ARTICLES: &str = r#"
    SELECT a.id, a.title, a.writer, a.content, a.status, a.topic_id,
           a.published_at, a.created_at, a.updated_at, a.deleted_at,
           t.label AS topic_label, t.created_at AS topic_created_at,
           t.updated_at AS topic_updated_at
    FROM articles a
    LEFT JOIN topics t ON t.id = a.topic_id
"#;

const SELECT_ARTICLE_TAGS: &str = r#"
    SELECT j.article_id, g.id, g.label, g.created_at, g.updated_at
    FROM article_tags j
    JOIN tags g ON g.id = j.tag_id
    WHERE j.article_id IN (
"#;

/// Article IDs bound per tag-loading query; stays well under the bind
/// parameter limits of both SQLite (32766) and MySQL (65535)
const TAG_LOAD_CHUNK_SIZE: usize = 1000;

/// Distinct tag IDs in ascending order
fn tag_ids(article: &Article) -> BTreeSet<i64> {
    article.tags.iter().map(|t| t.id).collect()
}

fn parse_status(status: &str) -> Result<ArticleStatus> {
    ArticleStatus::parse(status).ok_or_else(|| anyhow!("Unknown article status in storage: {}", status))
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_articles_sqlite(pool: &SqlitePool, predicate: &Predicate) -> Result<Vec<Article>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_ARTICLES);
    predicate.push_where(&mut qb, DatabaseDriver::Sqlite, Some("a"));
    qb.push(" ORDER BY a.id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    let mut articles = rows
        .iter()
        .map(row_to_article_sqlite)
        .collect::<Result<Vec<_>>>()?;
    attach_tags_sqlite(pool, &mut articles).await?;
    Ok(articles)
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(&format!("{} WHERE a.id = ?", SELECT_ARTICLES))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut articles = vec![row_to_article_sqlite(&row)?];
    attach_tags_sqlite(pool, &mut articles).await?;
    Ok(articles.pop())
}

async fn attach_tags_sqlite(pool: &SqlitePool, articles: &mut [Article]) -> Result<()> {
    if articles.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let mut by_article: HashMap<i64, Vec<Tag>> = HashMap::new();

    for chunk in ids.chunks(TAG_LOAD_CHUNK_SIZE) {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_ARTICLE_TAGS);
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY g.id");

        let rows = qb
            .build()
            .fetch_all(pool)
            .await
            .context("Failed to load article tags")?;

        for row in &rows {
            let article_id: i64 = row.try_get("article_id")?;
            by_article
                .entry(article_id)
                .or_default()
                .push(row_to_tag_sqlite(row)?);
        }
    }

    for article in articles.iter_mut() {
        article.tags = by_article.remove(&article.id).unwrap_or_default();
    }
    Ok(())
}

async fn upsert_article_sqlite(pool: &SqlitePool, article: &Article) -> Result<Article> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let id = if article.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, writer, content, status, topic_id,
                                  published_at, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.writer)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.topic_id)
        .bind(article.published_at)
        .bind(now)
        .bind(now)
        .bind(article.deleted_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create article")?;
        result.last_insert_rowid()
    } else {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, writer = ?, content = ?, status = ?, topic_id = ?,
                published_at = ?, updated_at = ?, deleted_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.writer)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.topic_id)
        .bind(article.published_at)
        .bind(now)
        .bind(article.deleted_at)
        .bind(article.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update article")?;

        if result.rows_affected() == 0 {
            return Err(MissingRow {
                entity: "Article",
                id: article.id,
            }
            .into());
        }
        article.id
    };

    sqlx::query("DELETE FROM article_tags WHERE article_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear article tags")?;

    let tag_ids = tag_ids(article);
    if !tag_ids.is_empty() {
        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO article_tags (article_id, tag_id) ");
        qb.push_values(tag_ids, |mut b, tag_id| {
            b.push_bind(id).push_bind(tag_id);
        });
        qb.build()
            .execute(&mut *tx)
            .await
            .context("Failed to associate article tags")?;
    }

    tx.commit().await.context("Failed to commit article")?;

    get_article_by_id_sqlite(pool, id)
        .await?
        .with_context(|| format!("Article {} missing after save", id))
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    let status: String = row.try_get("status")?;
    let topic_id: i64 = row.try_get("topic_id")?;
    let topic_label: Option<String> = row.try_get("topic_label")?;
    let topic = match topic_label {
        Some(label) => Some(Topic {
            id: topic_id,
            label,
            created_at: row.try_get::<DateTime<Utc>, _>("topic_created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("topic_updated_at")?,
        }),
        None => None,
    };

    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        writer: row.try_get("writer")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        tags: Vec::new(),
        topic_id,
        topic,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_articles_mysql(pool: &MySqlPool, predicate: &Predicate) -> Result<Vec<Article>> {
    let mut qb = QueryBuilder::<MySql>::new(SELECT_ARTICLES);
    predicate.push_where(&mut qb, DatabaseDriver::Mysql, Some("a"));
    qb.push(" ORDER BY a.id");

    let rows = qb
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    let mut articles = rows
        .iter()
        .map(row_to_article_mysql)
        .collect::<Result<Vec<_>>>()?;
    attach_tags_mysql(pool, &mut articles).await?;
    Ok(articles)
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(&format!("{} WHERE a.id = ?", SELECT_ARTICLES))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut articles = vec![row_to_article_mysql(&row)?];
    attach_tags_mysql(pool, &mut articles).await?;
    Ok(articles.pop())
}

async fn attach_tags_mysql(pool: &MySqlPool, articles: &mut [Article]) -> Result<()> {
    if articles.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
    let mut by_article: HashMap<i64, Vec<Tag>> = HashMap::new();

    for chunk in ids.chunks(TAG_LOAD_CHUNK_SIZE) {
        let mut qb = QueryBuilder::<MySql>::new(SELECT_ARTICLE_TAGS);
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY g.id");

        let rows = qb
            .build()
            .fetch_all(pool)
            .await
            .context("Failed to load article tags")?;

        for row in &rows {
            let article_id: i64 = row.try_get("article_id")?;
            by_article
                .entry(article_id)
                .or_default()
                .push(row_to_tag_mysql(row)?);
        }
    }

    for article in articles.iter_mut() {
        article.tags = by_article.remove(&article.id).unwrap_or_default();
    }
    Ok(())
}

async fn upsert_article_mysql(pool: &MySqlPool, article: &Article) -> Result<Article> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let id = if article.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, writer, content, status, topic_id,
                                  published_at, created_at, updated_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.writer)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.topic_id)
        .bind(article.published_at)
        .bind(now)
        .bind(now)
        .bind(article.deleted_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create article")?;
        result.last_insert_id() as i64
    } else {
        // MySQL reports matched-but-unchanged rows as 0 affected, so check existence
        let exists = sqlx::query("SELECT id FROM articles WHERE id = ? FOR UPDATE")
            .bind(article.id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to lock article")?;
        if exists.is_none() {
            return Err(MissingRow {
                entity: "Article",
                id: article.id,
            }
            .into());
        }

        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, writer = ?, content = ?, status = ?, topic_id = ?,
                published_at = ?, updated_at = ?, deleted_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.writer)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.topic_id)
        .bind(article.published_at)
        .bind(now)
        .bind(article.deleted_at)
        .bind(article.id)
        .execute(&mut *tx)
        .await
        .context("Failed to update article")?;
        article.id
    };

    sqlx::query("DELETE FROM article_tags WHERE article_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to clear article tags")?;

    let tag_ids = tag_ids(article);
    if !tag_ids.is_empty() {
        let mut qb = QueryBuilder::<MySql>::new("INSERT INTO article_tags (article_id, tag_id) ");
        qb.push_values(tag_ids, |mut b, tag_id| {
            b.push_bind(id).push_bind(tag_id);
        });
        qb.build()
            .execute(&mut *tx)
            .await
            .context("Failed to associate article tags")?;
    }

    tx.commit().await.context("Failed to commit article")?;

    get_article_by_id_mysql(pool, id)
        .await?
        .with_context(|| format!("Article {} missing after save", id))
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    let status: String = row.try_get("status")?;
    let topic_id: i64 = row.try_get("topic_id")?;
    let topic_label: Option<String> = row.try_get("topic_label")?;
    let topic = match topic_label {
        Some(label) => Some(Topic {
            id: topic_id,
            label,
            created_at: row.try_get::<DateTime<Utc>, _>("topic_created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("topic_updated_at")?,
        }),
        None => None,
    };

    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        writer: row.try_get("writer")?,
        content: row.try_get("content")?,
        status: parse_status(&status)?,
        tags: Vec::new(),
        topic_id,
        topic,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

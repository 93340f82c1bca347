//! Database layer
//!
//! Storage for tags, topics and articles. Two backends are supported:
//! - SQLite (default, single file or in-memory)
//! - MySQL
//!
//! The backend is selected by `database.driver` in the configuration.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk::config::DatabaseConfig;
//! use newsdesk::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod predicate;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, Backend, DatabasePool, DynDatabasePool, MysqlDatabase,
    SqliteDatabase,
};
pub use predicate::Predicate;

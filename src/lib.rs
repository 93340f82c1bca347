//! newsdesk - tag, topic and article content service
//!
//! Tags, topics and articles stored in SQLite or MySQL, read through a
//! TTL cache that is flushed on every write, and served over a JSON HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

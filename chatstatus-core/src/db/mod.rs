//! Database layer for chatstatus
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for users, preferences and custom emojis

pub mod repo;
pub mod schema;

pub use repo::Database;

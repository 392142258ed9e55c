//! # chatstatus-core
//!
//! Core library for chatstatus - custom statuses for team chat.
//!
//! This library provides:
//! - The custom status record and its wire format
//! - A bounded, deduplicated recent-status list
//! - Expiry evaluation and "Until Today at 5:30 PM" labels
//! - An emoji catalog used to canonicalize emoji aliases
//! - SQLite storage for users, preferences and custom emojis
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! The pure helpers ([`recent`], [`expiry`], [`suggestions`], [`tutorial`])
//! never read a clock or touch storage; [`status::StatusService`] threads the
//! store, catalog and settings through them explicitly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatstatus_core::{Config, Database, EmojiCatalog, StatusDraft, StatusService};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let catalog = EmojiCatalog::with_system_emojis();
//! let service = StatusService::new(&db, &catalog, &config.status).expect("bad settings");
//! let status = service
//!     .set_custom_status("me", StatusDraft::new("calendar", "In a meeting"), &chrono::Utc::now())
//!     .expect("failed to set status");
//! println!("{}", status.text);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use emoji::EmojiCatalog;
pub use error::{Error, Result};
pub use recent::{add_recent_status, remove_recent_status, RecentEmojis, RecentStatuses};
pub use status::StatusService;
pub use suggestions::StatusDraft;
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod emoji;
pub mod error;
pub mod expiry;
pub mod format;
pub mod logging;
pub mod recent;
pub mod status;
pub mod suggestions;
pub mod tutorial;
pub mod types;

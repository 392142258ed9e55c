//! Database repository layer
//!
//! Stands in for the chat backend: users with their props, per-user
//! preferences keyed by (category, name), and the server's custom emojis.

use crate::emoji::CustomEmoji;
use crate::error::{Error, Result};
use crate::types::*;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Database handle with connection pooling (single connection for now)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    ///
    /// A panic while holding the lock leaves SQLite itself consistent, so a
    /// poisoned mutex is recovered rather than propagated.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ============================================
    // User operations
    // ============================================

    /// Insert or update a user
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let conn = self.connection();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO users (id, username, timezone, props, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                timezone = excluded.timezone,
                props = excluded.props,
                updated_at = excluded.updated_at
            "#,
            params![
                user.id,
                user.username,
                user.timezone,
                serde_json::to_string(&user.props)?,
                now,
            ],
        )?;
        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.connection();
        conn.query_row("SELECT * FROM users WHERE id = ?", [id], Self::row_to_user)
            .optional()
            .map_err(Error::from)
    }

    /// Get a user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.connection();
        conn.query_row(
            "SELECT * FROM users WHERE username = ?",
            [username],
            Self::row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    /// List all users ordered by username
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY username")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let props_str: String = row.get("props")?;
        let props: HashMap<String, String> = serde_json::from_str(&props_str).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring malformed user props");
            HashMap::new()
        });

        Ok(User {
            id: row.get("id")?,
            username: row.get("username")?,
            timezone: row.get("timezone")?,
            props,
        })
    }

    /// Store a status on the user's props, replacing any previous one
    pub fn set_user_custom_status(&self, user_id: &str, status: &CustomStatus) -> Result<()> {
        let mut user = self
            .get_user(user_id)?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        user.props.insert(
            USER_PROP_CUSTOM_STATUS.to_string(),
            serde_json::to_string(status)?,
        );
        self.upsert_user(&user)
    }

    /// Remove the status from the user's props. Returns true if one was set.
    pub fn clear_user_custom_status(&self, user_id: &str) -> Result<bool> {
        let mut user = self
            .get_user(user_id)?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        let removed = user.props.remove(USER_PROP_CUSTOM_STATUS).is_some();
        if removed {
            self.upsert_user(&user)?;
        }
        Ok(removed)
    }

    // ============================================
    // Preference operations
    // ============================================

    /// Get a preference value
    pub fn get_preference(&self, user_id: &str, category: &str, name: &str) -> Result<Option<String>> {
        let conn = self.connection();
        conn.query_row(
            "SELECT value FROM preferences WHERE user_id = ?1 AND category = ?2 AND name = ?3",
            params![user_id, category, name],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    /// Get all preferences in a category for a user
    pub fn get_preferences_by_category(&self, user_id: &str, category: &str) -> Result<Vec<Preference>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(
            "SELECT user_id, category, name, value FROM preferences
             WHERE user_id = ?1 AND category = ?2 ORDER BY name",
        )?;
        let prefs = stmt
            .query_map(params![user_id, category], |row| {
                Ok(Preference {
                    user_id: row.get(0)?,
                    category: row.get(1)?,
                    name: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(prefs)
    }

    /// Save a batch of preferences atomically (last write wins)
    pub fn save_preferences(&self, preferences: &[Preference]) -> Result<()> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO preferences (user_id, category, name, value, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id, category, name) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )?;
            for pref in preferences {
                stmt.execute(params![pref.user_id, pref.category, pref.name, pref.value, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!(count = preferences.len(), "Saved preferences");
        Ok(())
    }

    /// Save one preference value
    pub fn save_preference(&self, user_id: &str, category: &str, name: &str, value: &str) -> Result<()> {
        self.save_preferences(&[Preference {
            user_id: user_id.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }])
    }

    /// Delete a preference. Returns true if a row was removed.
    pub fn delete_preference(&self, user_id: &str, category: &str, name: &str) -> Result<bool> {
        let conn = self.connection();
        let rows = conn.execute(
            "DELETE FROM preferences WHERE user_id = ?1 AND category = ?2 AND name = ?3",
            params![user_id, category, name],
        )?;
        Ok(rows > 0)
    }

    // ============================================
    // Custom emoji operations
    // ============================================

    /// Insert or update a custom emoji
    pub fn upsert_custom_emoji(&self, emoji: &CustomEmoji) -> Result<()> {
        let conn = self.connection();
        conn.execute(
            r#"
            INSERT INTO custom_emojis (id, name, creator_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                creator_id = excluded.creator_id
            "#,
            params![emoji.id, emoji.name, emoji.creator_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// List custom emojis ordered by name
    pub fn list_custom_emojis(&self) -> Result<Vec<CustomEmoji>> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT id, name, creator_id FROM custom_emojis ORDER BY name")?;
        let emojis = stmt
            .query_map([], |row| {
                Ok(CustomEmoji {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    creator_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(emojis)
    }
}

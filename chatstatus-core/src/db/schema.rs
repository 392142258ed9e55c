//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: users and preferences
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id               TEXT PRIMARY KEY,
        username         TEXT NOT NULL UNIQUE,
        timezone         TEXT,
        props            JSON NOT NULL DEFAULT '{}',
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    -- Opaque (category, name) -> value store, one row per user and key
    CREATE TABLE IF NOT EXISTS preferences (
        user_id          TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        category         TEXT NOT NULL,
        name             TEXT NOT NULL,
        value            TEXT NOT NULL,
        updated_at       DATETIME NOT NULL,
        PRIMARY KEY (user_id, category, name)
    );

    CREATE INDEX IF NOT EXISTS idx_preferences_category ON preferences(user_id, category);
    "#,
    // Version 2: server-side custom emojis
    r#"
    CREATE TABLE IF NOT EXISTS custom_emojis (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL UNIQUE,
        creator_id       TEXT NOT NULL,
        created_at       DATETIME NOT NULL
    );
    "#,
];

/// Apply every migration newer than the database's `user_version`.
///
/// Each step runs in its own transaction together with the version bump, so
/// a failed step leaves the database at the previous version.
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let from = get_schema_version(conn).unwrap_or(0);
    if from >= SCHEMA_VERSION {
        tracing::debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for (version, sql) in (1..).zip(MIGRATIONS.iter()).skip(from.max(0) as usize) {
        tracing::info!(version, "Applying schema migration");
        conn.execute_batch(&format!(
            "BEGIN;\n{}\nPRAGMA user_version = {};\nCOMMIT;",
            sql, version
        ))?;
    }

    tracing::info!(from, to = SCHEMA_VERSION, "Schema migrated");
    Ok(())
}

/// `PRAGMA user_version` of the open database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // Running again is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrade_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();

        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for table in ["users", "preferences", "custom_emojis"] {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_preferences_reference_users() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let fk_tables: Vec<String> = conn
            .prepare("PRAGMA foreign_key_list(preferences)")
            .unwrap()
            .query_map([], |row| row.get::<_, String>(2))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(fk_tables, vec!["users".to_string()]);
    }
}

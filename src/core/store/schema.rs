//! Registry database schema

use rusqlite::Connection;

use crate::core::error::Result;

/// Bump when the table layout changes. The registry is the system of record,
/// so a version mismatch refuses to open rather than migrating in place.
pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables and indexes if they do not exist
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            reference TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            process TEXT,
            tags TEXT NOT NULL DEFAULT '',
            owner TEXT NOT NULL,
            author TEXT,
            review_frequency_months INTEGER NOT NULL,
            next_review TEXT,
            status TEXT NOT NULL,
            current_version_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            archived INTEGER NOT NULL DEFAULT 0,
            archived_at TEXT,
            archived_by TEXT
        );

        CREATE TABLE IF NOT EXISTS versions (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL REFERENCES documents(id),
            number INTEGER NOT NULL,
            status TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            media_type TEXT NOT NULL,
            file_url TEXT NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            approved_by TEXT,
            approved_at TEXT,
            change_description TEXT NOT NULL DEFAULT '',
            UNIQUE (document_id, number)
        );

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            document_id TEXT NOT NULL,
            version_id TEXT NOT NULL,
            event TEXT NOT NULL,
            actor TEXT NOT NULL,
            at TEXT NOT NULL,
            note TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
        CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(category);
        CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner);
        CREATE INDEX IF NOT EXISTS idx_documents_updated ON documents(updated_at);
        CREATE INDEX IF NOT EXISTS idx_versions_document ON versions(document_id);
        CREATE INDEX IF NOT EXISTS idx_versions_status ON versions(status);
        CREATE INDEX IF NOT EXISTS idx_events_document ON events(document_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Read the stored schema version, if the registry has one
pub fn stored_version(conn: &Connection) -> Result<Option<i64>> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(None);
    }

    use rusqlite::OptionalExtension;
    let version = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}

//! Ledger schema definitions
//!
//! The ledger is append-only: rows are inserted once per username and never
//! updated. Column order mirrors the record layout readers rely on.

/// SQL schema for the ledger database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_name TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    profile_url TEXT NOT NULL,
    full_name TEXT NOT NULL DEFAULT '',
    biography TEXT NOT NULL DEFAULT '',
    email_from_field TEXT NOT NULL DEFAULT '',
    email_from_bio TEXT NOT NULL DEFAULT '',
    follower_count INTEGER NOT NULL DEFAULT 0,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_seed ON entries(seed_name);
"#;

/// Initializes the ledger schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

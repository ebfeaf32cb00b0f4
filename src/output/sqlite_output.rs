//! SQLite workbook sink
//!
//! Stores one logical sheet per seed in a SQLite file. Each sheet is written
//! in a single transaction, so a crash mid-write leaves no partial sheet and
//! the seed is simply crawled again on the next run.

use crate::crawler::TargetEntry;
use crate::output::traits::{OutputError, OutputResult, OutputSink, SheetSummary};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;

const WORKBOOK_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sheets (
    name TEXT PRIMARY KEY,
    seed_name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sheet_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sheet TEXT NOT NULL REFERENCES sheets(name),
    position INTEGER NOT NULL,
    username TEXT NOT NULL,
    profile_url TEXT NOT NULL,
    full_name TEXT NOT NULL,
    biography TEXT NOT NULL,
    email_from_field TEXT NOT NULL,
    email_from_bio TEXT NOT NULL,
    follower_count INTEGER NOT NULL,
    UNIQUE(sheet, position)
);

CREATE INDEX IF NOT EXISTS idx_sheet_rows_sheet ON sheet_rows(sheet);
"#;

/// Workbook backed by a SQLite file
pub struct SqliteWorkbook {
    conn: Connection,
}

impl SqliteWorkbook {
    /// Opens or creates the workbook at `path`
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        conn.execute_batch(WORKBOOK_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory workbook (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(WORKBOOK_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Reads back the rows of one sheet in order
    pub fn read_sheet(&self, sheet: &str) -> OutputResult<Vec<TargetEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, profile_url, full_name, biography, email_from_field,
             email_from_bio, follower_count
             FROM sheet_rows WHERE sheet = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![sheet], |row| {
                Ok(TargetEntry {
                    username: row.get(0)?,
                    profile_url: row.get(1)?,
                    full_name: row.get(2)?,
                    biography: row.get(3)?,
                    email_from_field: row.get(4)?,
                    email_from_bio: row.get(5)?,
                    follower_count: row.get::<_, i64>(6)?.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl OutputSink for SqliteWorkbook {
    fn existing_sheets(&self) -> OutputResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM sheets")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    fn write_sheet(
        &mut self,
        sheet: &str,
        seed_name: &str,
        entries: &[TargetEntry],
    ) -> OutputResult<()> {
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO sheets (name, seed_name, created_at) VALUES (?1, ?2, ?3)",
            params![sheet, seed_name, Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 {
            return Err(OutputError::Write(format!(
                "sheet '{}' already exists",
                sheet
            )));
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sheet_rows (sheet, position, username, profile_url, full_name,
                 biography, email_from_field, email_from_bio, follower_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, entry) in entries.iter().enumerate() {
                stmt.execute(params![
                    sheet,
                    position as i64,
                    entry.username,
                    entry.profile_url,
                    entry.full_name,
                    entry.biography,
                    entry.email_from_field,
                    entry.email_from_bio,
                    i64::try_from(entry.follower_count).unwrap_or(i64::MAX),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn sheet_summaries(&self) -> OutputResult<Vec<SheetSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name, s.seed_name, s.created_at,
                COUNT(r.id),
                COALESCE(SUM(r.email_from_field != ''), 0),
                COALESCE(SUM(r.email_from_bio != ''), 0),
                COALESCE(SUM(r.email_from_field != '' OR r.email_from_bio != ''), 0)
             FROM sheets s LEFT JOIN sheet_rows r ON r.sheet = s.name
             GROUP BY s.name ORDER BY s.name",
        )?;
        let summaries = stmt
            .query_map([], |row| {
                Ok(SheetSummary {
                    name: row.get(0)?,
                    seed_name: row.get(1)?,
                    created_at: row.get(2)?,
                    rows: row.get::<_, i64>(3)? as u64,
                    with_field_email: row.get::<_, i64>(4)? as u64,
                    with_bio_email: row.get::<_, i64>(5)? as u64,
                    with_any_email: row.get::<_, i64>(6)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }
}

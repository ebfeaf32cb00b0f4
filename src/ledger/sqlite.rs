//! SQLite ledger implementation

use crate::crawler::TargetEntry;
use crate::ledger::schema::initialize_schema;
use crate::ledger::traits::{Ledger, LedgerError, LedgerResult};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// SQLite-backed progress ledger
///
/// The connection runs in exclusive locking mode, so the lock taken at open
/// is held until the ledger is dropped and a second crawler pointed at the
/// same file fails fast instead of interleaving writes.
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Opens or creates the ledger at `path`
    ///
    /// A missing or zero-length file is an empty ledger. A file held by
    /// another process yields [`LedgerError::Locked`].
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path).map_err(|e| classify(path, e))?;

        // Fail immediately rather than wait on a lock another crawler will never release.
        conn.busy_timeout(Duration::ZERO)
            .map_err(|e| classify(path, e))?;

        conn.execute_batch(
            "
            PRAGMA locking_mode = EXCLUSIVE;
            PRAGMA synchronous = FULL;
        ",
        )
        .map_err(|e| classify(path, e))?;

        // The first write transaction acquires the exclusive lock and keeps it.
        conn.execute_batch("BEGIN EXCLUSIVE;")
            .map_err(|e| classify(path, e))?;
        if let Err(e) = initialize_schema(&conn) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(classify(path, e));
        }
        conn.execute_batch("COMMIT;").map_err(|e| classify(path, e))?;

        Ok(Self { conn })
    }

    /// Creates an in-memory ledger (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps open-time SQLite failures onto actionable ledger errors
fn classify(path: &Path, error: rusqlite::Error) -> LedgerError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => LedgerError::Locked {
                path: path.to_path_buf(),
            },
            ErrorCode::CannotOpen | ErrorCode::PermissionDenied | ErrorCode::ReadOnly => {
                LedgerError::Unavailable {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                }
            }
            _ => LedgerError::Sqlite(error),
        },
        _ => LedgerError::Sqlite(error),
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<TargetEntry> {
    Ok(TargetEntry {
        username: row.get(0)?,
        profile_url: row.get(1)?,
        full_name: row.get(2)?,
        biography: row.get(3)?,
        email_from_field: row.get(4)?,
        email_from_bio: row.get(5)?,
        follower_count: row.get::<_, i64>(6)?.max(0) as u64,
    })
}

impl Ledger for SqliteLedger {
    fn load_existing(&self) -> LedgerResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT username FROM entries")?;
        let usernames = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(usernames)
    }

    fn append(&mut self, seed_name: &str, entry: &TargetEntry) -> LedgerResult<bool> {
        let now = Utc::now().to_rfc3339();
        let follower_count = i64::try_from(entry.follower_count).unwrap_or(i64::MAX);

        // Autocommit: the row is on disk (synchronous = FULL) when execute returns.
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO entries (seed_name, username, profile_url, full_name, biography,
             email_from_field, email_from_bio, follower_count, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                seed_name,
                entry.username,
                entry.profile_url,
                entry.full_name,
                entry.biography,
                entry.email_from_field,
                entry.email_from_bio,
                follower_count,
                now
            ],
        )?;

        Ok(inserted == 1)
    }

    fn entries_for_seed(&self, seed_name: &str) -> LedgerResult<Vec<TargetEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT username, profile_url, full_name, biography, email_from_field,
             email_from_bio, follower_count
             FROM entries WHERE seed_name = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![seed_name], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn count_entries(&self) -> LedgerResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_seed(&self) -> LedgerResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT seed_name, COUNT(*) FROM entries GROUP BY seed_name ORDER BY seed_name",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn count_with_field_email(&self) -> LedgerResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE email_from_field != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_with_bio_email(&self) -> LedgerResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE email_from_bio != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

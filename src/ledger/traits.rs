//! Ledger trait and error types

use crate::crawler::TargetEntry;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening or writing the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(
        "Ledger {path} is locked by another process; close the other crawler or any program \
         holding the file open, then retry"
    )]
    Locked { path: PathBuf },

    #[error("Ledger {path} cannot be opened: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Durable append-only record of collected entries
///
/// Every successful `append` must be recoverable after a crash before the call
/// returns; the crawler relies on that ordering for resumability.
pub trait Ledger {
    /// Replays the ledger and returns every recorded username
    fn load_existing(&self) -> LedgerResult<HashSet<String>>;

    /// Records an entry for a seed
    ///
    /// Returns `false` when the username was already recorded; the existing
    /// row is left untouched.
    fn append(&mut self, seed_name: &str, entry: &TargetEntry) -> LedgerResult<bool>;

    /// Returns the entries recorded for one seed, in append order
    fn entries_for_seed(&self, seed_name: &str) -> LedgerResult<Vec<TargetEntry>>;

    // ===== Statistics =====

    /// Counts all recorded entries
    fn count_entries(&self) -> LedgerResult<u64>;

    /// Counts entries per seed, ordered by seed name
    fn count_by_seed(&self) -> LedgerResult<Vec<(String, u64)>>;

    /// Counts entries with a non-empty profile email field
    fn count_with_field_email(&self) -> LedgerResult<u64>;

    /// Counts entries with an email found in the biography
    fn count_with_bio_email(&self) -> LedgerResult<u64>;
}

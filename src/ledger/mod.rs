//! Progress ledger
//!
//! This module persists every collected entry as soon as it is known, which
//! gives the crawler two guarantees:
//! - Crash safety: an entry acknowledged by `append` survives a restart
//! - Deduplication: the set of recorded usernames is rebuilt at startup so no
//!   profile is fetched twice across runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteLedger;
pub use traits::{Ledger, LedgerError, LedgerResult};

use std::path::Path;

/// Opens (or creates) the ledger at `path`, taking an exclusive lock
pub fn open_ledger(path: &Path) -> LedgerResult<SqliteLedger> {
    SqliteLedger::open(path)
}

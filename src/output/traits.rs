//! Output sink trait and types
//!
//! The output sink receives each finished seed's entries as one sheet. The
//! coordinator also asks it which sheets exist, which is how whole seeds are
//! skipped on a resumed run.

use crate::crawler::TargetEntry;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Per-sheet figures for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub name: String,
    pub seed_name: String,
    pub rows: u64,
    pub with_field_email: u64,
    pub with_bio_email: u64,
    /// Rows carrying at least one email from either source
    pub with_any_email: u64,
    pub created_at: String,
}

/// Destination for finished per-seed result sets
pub trait OutputSink {
    /// Names of the sheets already written
    fn existing_sheets(&self) -> OutputResult<HashSet<String>>;

    /// Writes one seed's entries as a sheet
    ///
    /// The sheet appears in `existing_sheets` only once it is fully written.
    fn write_sheet(
        &mut self,
        sheet: &str,
        seed_name: &str,
        entries: &[TargetEntry],
    ) -> OutputResult<()>;

    /// Reporting figures for every sheet, ordered by name
    fn sheet_summaries(&self) -> OutputResult<Vec<SheetSummary>>;
}

//! Output module for finished result sets and reports
//!
//! This module handles:
//! - Writing each seed's entries to the workbook as one sheet
//! - Generating markdown summaries of the workbook
//! - Reporting ledger statistics

mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use sqlite_output::SqliteWorkbook;
pub use stats::{load_statistics, print_statistics, LedgerStatistics};
pub use traits::{OutputError, OutputResult, OutputSink, SheetSummary};

use std::path::Path;

/// Opens (or creates) the workbook at `path`
pub fn open_workbook(path: &Path) -> OutputResult<SqliteWorkbook> {
    SqliteWorkbook::open(path)
}

//! Statistics from the progress ledger

use crate::ledger::{Ledger, LedgerResult};

/// Ledger statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStatistics {
    /// Total entries recorded
    pub total_entries: u64,

    /// Entry count per seed, ordered by seed name
    pub entries_by_seed: Vec<(String, u64)>,

    /// Entries whose profile carried a public email
    pub with_field_email: u64,

    /// Entries with an email found in the biography
    pub with_bio_email: u64,
}

/// Loads statistics from the ledger
pub fn load_statistics(ledger: &dyn Ledger) -> LedgerResult<LedgerStatistics> {
    Ok(LedgerStatistics {
        total_entries: ledger.count_entries()?,
        entries_by_seed: ledger.count_by_seed()?,
        with_field_email: ledger.count_with_field_email()?,
        with_bio_email: ledger.count_with_bio_email()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &LedgerStatistics) {
    println!("=== Ledger Statistics ===\n");

    println!("Overview:");
    println!("  Total entries: {}", stats.total_entries);
    println!(
        "  With profile email: {} ({:.1}%)",
        stats.with_field_email,
        share(stats.with_field_email, stats.total_entries)
    );
    println!(
        "  With bio email: {} ({:.1}%)",
        stats.with_bio_email,
        share(stats.with_bio_email, stats.total_entries)
    );
    println!();

    if !stats.entries_by_seed.is_empty() {
        println!("Entries by Seed:");
        let mut by_count: Vec<_> = stats.entries_by_seed.iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));

        for (seed, count) in by_count {
            println!("  {}: {}", seed, count);
        }
        println!();
    }
}

fn share(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

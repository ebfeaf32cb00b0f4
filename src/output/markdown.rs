//! Markdown summary generation
//!
//! Renders the workbook's sheets as a human-readable report: one table row
//! per sheet with its profile count and how many emails were found.

use crate::output::traits::{OutputResult, SheetSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `summaries` to `output_path`
///
/// # Arguments
///
/// * `summaries` - Per-sheet figures from the output sink
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summaries: &[SheetSummary], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summaries);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats per-sheet figures as markdown
pub fn format_markdown_summary(summaries: &[SheetSummary]) -> String {
    let mut md = String::new();

    md.push_str("# Graph Trawl Summary\n\n");

    let total_rows: u64 = summaries.iter().map(|s| s.rows).sum();
    let total_emails: u64 = summaries.iter().map(|s| s.with_any_email).sum();

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Sheets**: {}\n", summaries.len()));
    md.push_str(&format!("- **Profiles**: {}\n", total_rows));
    md.push_str(&format!("- **Profiles with email**: {}\n", total_emails));
    md.push_str(&format!(
        "- **Email rate**: {:.2}%\n\n",
        percentage(total_emails, total_rows)
    ));

    if summaries.is_empty() {
        md.push_str("No sheets have been written yet.\n");
        return md;
    }

    md.push_str("## Sheets\n\n");
    md.push_str("| Sheet | Seed | Profiles | Profile email | Bio email | Emails found | Written |\n");
    md.push_str("|-------|------|----------|---------------|-----------|--------------|---------|\n");

    for sheet in summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&sheet.name),
            escape_cell(&sheet.seed_name),
            sheet.rows,
            sheet.with_field_email,
            sheet.with_bio_email,
            sheet.with_any_email,
            sheet.created_at
        ));
    }
    md.push('\n');

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Generated by graph-trawl v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    md
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

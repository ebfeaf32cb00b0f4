use sha2::{Digest, Sha256};

/// Longest sheet name the workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 30;

const HASH_SUFFIX_LEN: usize = 6;

/// Derives the output sheet name for a seed
///
/// Characters that spreadsheets reject (`[]:*?/\`) become `_`. Names that fit
/// in [`MAX_SHEET_NAME_LEN`] characters and need no replacement are kept as
/// is. Any other name is cut and suffixed with `~` and a short hash of the
/// full name, so seeds sharing a long prefix or differing only in rejected
/// characters still get separate sheets.
pub fn sheet_name(seed_name: &str) -> String {
    let trimmed = seed_name.trim();
    let cleaned: String = trimmed
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();

    if cleaned == trimmed && cleaned.chars().count() <= MAX_SHEET_NAME_LEN {
        return cleaned;
    }

    let digest = hex::encode(Sha256::digest(trimmed.as_bytes()));
    let prefix: String = cleaned
        .chars()
        .take(MAX_SHEET_NAME_LEN - HASH_SUFFIX_LEN - 1)
        .collect();

    format!("{}~{}", prefix, &digest[..HASH_SUFFIX_LEN])
}

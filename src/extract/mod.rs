//! Field extraction helpers
//!
//! This module turns raw upstream data and operator input into the values the
//! crawler stores: contact emails found in biography text, account handles
//! taken from seed references, profile URLs, and output sheet names.

mod email;
mod handle;
mod sheet;

pub use email::extract_email_from_bio;
pub use handle::extract_handle;
pub use sheet::{sheet_name, MAX_SHEET_NAME_LEN};

/// Builds the public profile URL for a username
///
/// # Examples
///
/// ```
/// use graph_trawl::extract::profile_url;
///
/// assert_eq!(profile_url("https://example.com/", "alice"), "https://example.com/alice");
/// assert_eq!(profile_url("https://example.com", "alice"), "https://example.com/alice");
/// ```
pub fn profile_url(base: &str, username: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), username)
}

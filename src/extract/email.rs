use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("email pattern is valid"));

/// Extracts the first email-looking token from biography text
///
/// Returns an empty string when nothing matches, so the value can be stored
/// directly in a ledger column.
///
/// # Examples
///
/// ```
/// use graph_trawl::extract_email_from_bio;
///
/// assert_eq!(
///     extract_email_from_bio("contact: jane.doe@example.com for info"),
///     "jane.doe@example.com"
/// );
/// assert_eq!(extract_email_from_bio("no contact here"), "");
/// ```
pub fn extract_email_from_bio(bio: &str) -> String {
    EMAIL_RE
        .find(bio)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

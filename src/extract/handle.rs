use url::Url;

/// Extracts an account handle from a seed reference
///
/// Accepts a bare handle (`acmecorp`, `@acmecorp`) or a profile link with or
/// without a scheme (`https://example.com/acmecorp/`, `example.com/acmecorp`).
/// For links the handle is the first path segment. Returns `None` when no
/// handle can be found.
pub fn extract_handle(target: &str) -> Option<String> {
    let target = target.trim();

    if !target.contains('/') {
        let handle = target.trim_start_matches('@');
        return (!handle.is_empty()).then(|| handle.to_string());
    }

    let parsed = if target.contains("://") {
        Url::parse(target).ok()?
    } else {
        Url::parse(&format!("https://{}", target)).ok()?
    };

    parsed
        .path_segments()?
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.trim_start_matches('@').to_string())
        .filter(|handle| !handle.is_empty())
}

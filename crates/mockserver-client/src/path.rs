//! Path and collection helpers used when building MockServer URLs.

/// Prefix `path` with a single `/` unless it already has one.
pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Remove every trailing `/` from `path`.
pub fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Normalize a user supplied context path.
///
/// The result is either empty or starts with exactly one `/` and has no
/// trailing slash, so it can be placed directly between the authority and the
/// `/mockserver` base segment.
///
/// ```
/// use mockserver_client::path::normalize_context_path;
///
/// assert_eq!(normalize_context_path(""), "");
/// assert_eq!(normalize_context_path("/"), "");
/// assert_eq!(normalize_context_path("api"), "/api");
/// assert_eq!(normalize_context_path("//api/v1/"), "/api/v1");
/// ```
pub fn normalize_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Join two path fragments with exactly one `/` between them.
pub fn join_paths(base: &str, suffix: &str) -> String {
    let base = trim_trailing_slashes(base);
    let suffix = suffix.trim_start_matches('/');
    if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{suffix}")
    }
}

/// True for an empty or whitespace-only string.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True for an empty slice.
pub fn is_empty_slice<T>(items: &[T]) -> bool {
    items.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_leading_slash() {
        assert_eq!(ensure_leading_slash("expectation"), "/expectation");
        assert_eq!(ensure_leading_slash("/expectation"), "/expectation");
        assert_eq!(ensure_leading_slash(""), "/");
    }

    #[test]
    fn test_trim_trailing_slashes() {
        assert_eq!(trim_trailing_slashes("/ctx///"), "/ctx");
        assert_eq!(trim_trailing_slashes("/ctx"), "/ctx");
        assert_eq!(trim_trailing_slashes("/"), "");
    }

    #[test]
    fn test_normalize_context_path() {
        assert_eq!(normalize_context_path(""), "");
        assert_eq!(normalize_context_path("   "), "");
        assert_eq!(normalize_context_path("/"), "");
        assert_eq!(normalize_context_path("ctx"), "/ctx");
        assert_eq!(normalize_context_path("/ctx"), "/ctx");
        assert_eq!(normalize_context_path("ctx/"), "/ctx");
        assert_eq!(normalize_context_path("/ctx/"), "/ctx");
        assert_eq!(normalize_context_path("/a/b/"), "/a/b");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(
            join_paths("/ctx/mockserver", "/expectation"),
            "/ctx/mockserver/expectation"
        );
        assert_eq!(
            join_paths("/mockserver/", "expectation"),
            "/mockserver/expectation"
        );
        assert_eq!(join_paths("", "/status"), "/status");
        assert_eq!(join_paths("/mockserver", ""), "/mockserver");
    }

    #[test]
    fn test_blank_and_empty() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" x "));
        assert!(is_empty_slice::<u8>(&[]));
        assert!(!is_empty_slice(&[1]));
    }
}

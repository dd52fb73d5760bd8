//! Request path normalization.
//!
//! The policy compares string prefixes, so it must see the path the
//! upstream will resolve. `/api/../dashboard` has to be judged as
//! `/dashboard`, not as something under `/api`.
//!
//! # Rules
//! - `.` segments are dropped, `..` removes the previous segment
//! - `..` never climbs above the root
//! - Percent-encoded dots (`%2e`, any case) count as dots
//! - Empty segments from repeated slashes are dropped
//! - A trailing slash is kept

use std::borrow::Cow;

/// Resolve dot segments in an absolute request path.
///
/// Returns the input unchanged (borrowed) when there is nothing to resolve,
/// including non-absolute targets such as `*`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if !needs_normalization(path) {
        return Cow::Borrowed(path);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match dot_kind(segment) {
            Some(Dots::One) => {}
            Some(Dots::Two) => {
                segments.pop();
            }
            None if segment.is_empty() => {}
            None => segments.push(segment),
        }
    }

    let mut normalized = String::with_capacity(path.len());
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    if normalized.is_empty() || path.ends_with('/') || dot_kind(last).is_some() {
        normalized.push('/');
    }
    Cow::Owned(normalized)
}

fn needs_normalization(path: &str) -> bool {
    path.starts_with('/')
        && (path.contains("//") || path.split('/').any(|segment| dot_kind(segment).is_some()))
}

enum Dots {
    One,
    Two,
}

fn dot_kind(segment: &str) -> Option<Dots> {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    match decoded.as_str() {
        "." => Some(Dots::One),
        ".." => Some(Dots::Two),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_paths_are_borrowed() {
        for path in ["/", "/dashboard", "/api/v1/users", "/login/", "/a.b/c..d", "*"] {
            assert!(matches!(normalize_path(path), Cow::Borrowed(p) if p == path));
        }
    }

    #[test]
    fn test_parent_segments_are_resolved() {
        assert_eq!(normalize_path("/api/../dashboard"), "/dashboard");
        assert_eq!(normalize_path("/login/../catalogs"), "/catalogs");
        assert_eq!(normalize_path("/api/v1/../../team-members"), "/team-members");
        assert_eq!(normalize_path("/a/./b/./c"), "/a/b/c");
    }

    #[test]
    fn test_parent_segments_stop_at_root() {
        assert_eq!(normalize_path("/../../dashboard"), "/dashboard");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("/api/.."), "/");
    }

    #[test]
    fn test_encoded_dots_are_resolved() {
        assert_eq!(normalize_path("/api/%2e%2e/dashboard"), "/dashboard");
        assert_eq!(normalize_path("/api/%2E./dashboard"), "/dashboard");
        assert_eq!(normalize_path("/api/.%2e/dashboard"), "/dashboard");
        assert_eq!(normalize_path("/api/%2e/users"), "/api/users");
    }

    #[test]
    fn test_repeated_slashes_collapse() {
        assert_eq!(normalize_path("//dashboard"), "/dashboard");
        assert_eq!(normalize_path("/api//../dashboard"), "/dashboard");
    }

    #[test]
    fn test_trailing_slash_is_kept() {
        assert_eq!(normalize_path("/api/../catalogs/"), "/catalogs/");
        assert_eq!(normalize_path("/catalogs/items/.."), "/catalogs/");
    }
}

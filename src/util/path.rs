//! Slash-separated path helpers shared by the database and storage emulators.

/// Splits a path into its non-empty segments; leading, trailing and doubled
/// slashes are ignored.
pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn canonical_path(path: &str) -> String {
    segments(path).join("/")
}

pub fn last_component(path: &str) -> Option<String> {
    segments(path).pop()
}

//! Target resolution for multi-bucket scans.

/// Dashboard title for an explicit bucket list.
pub const TARGETED_SCAN_TITLE: &str = "Targeted Compliance Scan";

/// Dashboard title for an unfiltered account scan.
pub const FULL_ACCOUNT_SCAN_TITLE: &str = "Full Account Scan";

/// Placeholder message for a bucket that is missing or off-limits.
pub const INACCESSIBLE_BUCKET_MESSAGE: &str = "Access Denied or Not Found";

/// Dashboard title for an account scan.
#[must_use]
pub fn account_scan_title(filter: Option<&str>) -> String {
    match filter {
        Some(filter) => format!("Account Scan ({filter})"),
        None => FULL_ACCOUNT_SCAN_TITLE.to_owned(),
    }
}

/// Whether a bucket name looks like infrastructure (state stores, log sinks).
#[must_use]
pub fn is_excluded(name: &str, patterns: &[String]) -> bool {
    let name = name.to_ascii_lowercase();
    patterns
        .iter()
        .any(|pattern| name.contains(&pattern.to_ascii_lowercase()))
}

/// Keep the listed buckets that contain `filter` and match no exclusion
/// pattern, preserving listing order.
#[must_use]
pub fn select_account_buckets(
    names: Vec<String>,
    filter: Option<&str>,
    excluded: &[String],
) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| filter.is_none_or(|f| name.contains(f)))
        .filter(|name| !is_excluded(name, excluded))
        .collect()
}

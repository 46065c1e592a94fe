//! Extraction of backport targets from pull request labels.
//!
//! A label requests a backport when it starts with the configured prefix and
//! carries a target after the first `:`, e.g. `cherry-pick:release-1.0`.

/// Extract target branch names from `labels`, preserving their order.
///
/// Labels without a `:` or with nothing after it are ignored. Duplicates are
/// kept; re-processing a target is a no-op thanks to the idempotent branch and
/// pull request steps.
pub fn extract_targets<S: AsRef<str>>(prefix: &str, labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .filter_map(|label| target_of(prefix, label.as_ref()))
        .collect()
}

/// Target named by a single label, if it is a backport label.
pub fn target_of(prefix: &str, label: &str) -> Option<String> {
    if !label.starts_with(prefix) {
        return None;
    }
    let (_, target) = label.split_once(':')?;
    let target = target.trim();
    (!target.is_empty()).then(|| target.to_string())
}

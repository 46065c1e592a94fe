//! Deterministic working branch naming.

/// Name of the working branch for backporting PR `number` (opened from
/// `head_ref`) onto `target`.
///
/// Pure function of its inputs: re-running a backport resolves to the same
/// branch, and distinct targets never share a branch.
pub fn working_branch_name(prefix: &str, number: u64, head_ref: &str, target: &str) -> String {
    format!("{}/{}/{}-{}", prefix, number, head_ref, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_stable_across_calls() {
        let a = working_branch_name("cherry-pick", 42, "feature-x", "release-1.0");
        let b = working_branch_name("cherry-pick", 42, "feature-x", "release-1.0");
        assert_eq!(a, b);
        assert_eq!(a, "cherry-pick/42/feature-x-release-1.0");
    }

    #[test]
    fn test_distinct_targets_get_distinct_names() {
        let a = working_branch_name("cherry-pick", 42, "feature-x", "release-1.0");
        let b = working_branch_name("cherry-pick", 42, "feature-x", "release-2.0");
        assert_ne!(a, b);
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(
            working_branch_name("backport", 7, "fix/typo", "main"),
            "backport/7/fix/typo-main"
        );
    }
}

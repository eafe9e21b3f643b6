// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Group Name Matching
//!
//! Functional group names are case-insensitive identifiers. Every comparison of
//! group names in this crate goes through the helpers below; raw `==` is never
//! used on a group name.

use std::cmp::Ordering;

/// ASCII case-insensitive equality.
pub fn equals_ci(first: &str, second: &str) -> bool {
    first.eq_ignore_ascii_case(second)
}

/// ASCII case-insensitive lexicographic ordering.
pub fn cmp_ci(first: &str, second: &str) -> Ordering {
    first
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(second.bytes().map(|b| b.to_ascii_lowercase()))
}

/// `true` if `first` sorts strictly before `second`, ignoring ASCII case.
pub fn less_ci(first: &str, second: &str) -> bool {
    cmp_ci(first, second) == Ordering::Less
}

/// Predicate bound to a single group name.
///
/// Used with iterator adaptors (`any`, `position`) to look a group up in a list.
#[derive(Debug, Clone, Copy)]
pub struct GroupNameMatcher<'a> {
    group_name: &'a str,
}

impl<'a> GroupNameMatcher<'a> {
    pub fn new(group_name: &'a str) -> Self {
        Self { group_name }
    }

    pub fn matches(&self, other: &str) -> bool {
        equals_ci(self.group_name, other)
    }

    /// `true` if any name in `names` matches.
    pub fn is_in<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.matches(name.as_ref()))
    }
}

/// Returns a copy of `names` sorted with [`cmp_ci`].
pub fn sorted_ci<S: AsRef<str> + Clone>(names: &[S]) -> Vec<S> {
    let mut sorted = names.to_vec();
    sorted.sort_by(|a, b| cmp_ci(a.as_ref(), b.as_ref()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_ci_ignores_ascii_case() {
        for name in ["Base-4", "Location-1", "Notifications", "DrivingCharacteristics-3"] {
            assert!(equals_ci(name, &name.to_uppercase()));
            assert!(equals_ci(&name.to_lowercase(), name));
        }
        assert!(!equals_ci("Base-4", "Base-6"));
    }

    #[test]
    fn test_less_ci_orders_without_case() {
        assert!(less_ci("alpha", "Beta"));
        assert!(less_ci("ALPHA", "beta"));
        assert!(!less_ci("beta", "ALPHA"));
        // Equal names are never less than each other
        assert!(!less_ci("Base-4", "base-4"));
        assert!(!less_ci("base-4", "Base-4"));
        // Prefix sorts first
        assert!(less_ci("Base", "base-4"));
    }

    #[test]
    fn test_matcher_finds_name_in_list() {
        let groups = vec!["Base-4".to_string(), "Location-1".to_string()];
        assert!(GroupNameMatcher::new("LOCATION-1").is_in(&groups));
        assert!(!GroupNameMatcher::new("Location-2").is_in(&groups));
    }

    #[test]
    fn test_sorted_ci() {
        let sorted = sorted_ci(&["c", "B", "a"]);
        assert_eq!(sorted, vec!["a", "B", "c"]);
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Functional Group Id Set Algebra
//!
//! Pure value-to-value set operations over group id collections. Inputs are
//! left untouched; outputs are sorted and deduplicated, but callers must treat
//! them as sets.

use std::cmp::Ordering;

fn sorted_dedup<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.sort();
    copy.dedup();
    copy
}

/// Union of `first` and `second`.
pub fn merge<T: Ord + Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let first = sorted_dedup(first);
    let second = sorted_dedup(second);

    let mut merged = Vec::with_capacity(first.len() + second.len());
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        match first[i].cmp(&second[j]) {
            Ordering::Less => {
                merged.push(first[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                merged.push(second[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                merged.push(first[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    merged.extend_from_slice(&first[i..]);
    merged.extend_from_slice(&second[j..]);
    merged
}

/// Intersection of `first` and `second`.
pub fn find_same<T: Ord + Clone>(first: &[T], second: &[T]) -> Vec<T> {
    let first = sorted_dedup(first);
    let second = sorted_dedup(second);

    let mut same = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        match first[i].cmp(&second[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                same.push(first[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    same
}

/// Items of `from` that are not in `what`.
pub fn exclude_same<T: Ord + Clone>(from: &[T], what: &[T]) -> Vec<T> {
    let from = sorted_dedup(from);
    let what = sorted_dedup(what);

    let mut no_same = Vec::new();
    let mut j = 0;
    for item in from {
        while j < what.len() && what[j] < item {
            j += 1;
        }
        if j < what.len() && what[j] == item {
            continue;
        }
        no_same.push(item);
    }
    no_same
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_commutative_and_deduplicated() {
        let a = vec![5, 1, 3, 3];
        let b = vec![4, 3, 2, 2];
        assert_eq!(merge(&a, &b), vec![1, 2, 3, 4, 5]);
        assert_eq!(merge(&a, &b), merge(&b, &a));
    }

    #[test]
    fn test_find_same_of_self_is_dedup() {
        let a = vec![7, 2, 7, 9, 2];
        assert_eq!(find_same(&a, &a), vec![2, 7, 9]);
        assert_eq!(find_same(&a, &[9, 10]), vec![9]);
        assert!(find_same(&a, &[]).is_empty());
    }

    #[test]
    fn test_exclude_same() {
        let a = vec![1, 2, 3, 4, 4];
        assert!(exclude_same(&a, &a).is_empty());
        assert_eq!(exclude_same(&a, &[2, 4, 8]), vec![1, 3]);
        assert_eq!(exclude_same(&a, &[]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_exclude_merge_is_subset_of_second() {
        let a = vec![10, 20, 30];
        let b = vec![30, 40, 40, 50];
        let rest = exclude_same(&merge(&a, &b), &a);
        assert_eq!(rest, vec![40, 50]);
        assert!(rest.iter().all(|id| b.contains(id)));
    }

    #[test]
    fn test_string_group_ids() {
        let current: Vec<String> = ["Location-1", "Base-4", "Base-4"].iter().map(|g| g.to_string()).collect();
        let update: Vec<String> = ["Notifications", "Base-4"].iter().map(|g| g.to_string()).collect();

        assert_eq!(merge(&current, &update), vec!["Base-4", "Location-1", "Notifications"]);
        assert_eq!(find_same(&current, &update), vec!["Base-4".to_string()]);
        assert_eq!(exclude_same(&current, &update), vec!["Location-1".to_string()]);
        // Exact comparison; case folding is the caller's concern
        assert_eq!(exclude_same(&current, &["base-4".to_string()]).len(), 2);
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let a = vec![3, 1, 2];
        let b = vec![2];
        let _ = exclude_same(&a, &b);
        assert_eq!(a, vec![3, 1, 2]);
    }
}

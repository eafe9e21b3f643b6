// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Group Set Diff
//!
//! Compares the group list currently enforced for an application with the list
//! carried by an update. Both lists are sorted case-insensitively and walked with
//! two cursors:
//!
//! 1. The overlapping window (length = shorter remaining list) is compared
//!    element-wise. A full match ends the walk.
//! 2. On the first mismatch the smaller of the two diverging names is missing
//!    from the other side. A current-side name is **revoked**; a new-side name
//!    needs **consent**. Only the cursor of the smaller name advances.
//! 3. Whatever remains on the current side is revoked; anything remaining on
//!    the new side needs consent.
//!
//! This is a positional merge, not a symmetric difference. Consent prompts on
//! the HMI depend on exactly this behaviour, so it is kept as is.

use super::group_name::{equals_ci, less_ci, sorted_ci};

/// Result of comparing two group lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSetDiff {
    /// Current groups missing from the update, in sorted order.
    pub revoked: Vec<String>,
    /// Set when the update carries at least one group not currently enforced.
    pub consent_needed: bool,
}

impl GroupSetDiff {
    pub fn is_unchanged(&self) -> bool {
        self.revoked.is_empty() && !self.consent_needed
    }
}

/// Diffs `current` against `new`. Input order does not matter.
pub fn diff_groups(current: &[String], new: &[String]) -> GroupSetDiff {
    let current = sorted_ci(current);
    let new = sorted_ci(new);

    let mut diff = GroupSetDiff::default();
    let mut old_pos = 0;
    let mut new_pos = 0;

    while old_pos < current.len() && new_pos < new.len() {
        let window = (current.len() - old_pos).min(new.len() - new_pos);
        let mismatch = (0..window)
            .find(|&offset| !equals_ci(&current[old_pos + offset], &new[new_pos + offset]));

        let Some(offset) = mismatch else {
            old_pos += window;
            new_pos += window;
            break;
        };

        let old_name = &current[old_pos + offset];
        let new_name = &new[new_pos + offset];
        if less_ci(old_name, new_name) {
            diff.revoked.push(old_name.clone());
            old_pos += offset + 1;
            new_pos += offset;
        } else {
            diff.consent_needed = true;
            old_pos += offset;
            new_pos += offset + 1;
        }
    }

    diff.revoked.extend(current[old_pos..].iter().cloned());
    if new_pos < new.len() {
        diff.consent_needed = true;
    }
    diff
}

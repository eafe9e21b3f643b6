// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Collaborator Interfaces
//!
//! Contracts the policy engine consumes. They are declared in the domain layer
//! and implemented in `crate::infrastructure` (or by the embedding platform).
//!
//! | Trait | Role | Implementations |
//! |-------|------|----------------|
//! | [`SnapshotStore`] | currently enforced policy table | [`PolicyTableSnapshot`] |
//! | [`ConsentStore`] | recorded user consent | `InMemoryConsentStore` |
//! | [`IdentityResolver`] | app → device id / display name | `StaticIdentityResolver` |
//! | [`NotificationSink`] | HMI notifications | `EventBusNotificationSink` |
//!
//! Every call is synchronous and runs on the evaluating thread. Notification
//! sinks must not touch the snapshot being updated.

use super::app_policy::{ApplicationPolicyEntry, PolicyTableSnapshot};
use super::functional_group::FunctionalGroupPermission;
use super::permissions::Permissions;

/// Read/write access to the enforced policy table.
pub trait SnapshotStore {
    fn entry(&self, app_id: &str) -> Option<&ApplicationPolicyEntry>;

    fn set_entry(&mut self, app_id: &str, entry: ApplicationPolicyEntry);

    fn contains(&self, app_id: &str) -> bool {
        self.entry(app_id).is_some()
    }

    /// Groups an entry stands for. Aliases are followed one level into this
    /// table; a dangling alias stands for no groups.
    fn effective_groups<'a>(&'a self, entry: &'a ApplicationPolicyEntry) -> &'a [String] {
        match entry {
            ApplicationPolicyEntry::Alias(target) => self
                .entry(target)
                .map(|aliased| aliased.groups())
                .unwrap_or_default(),
            other => other.groups(),
        }
    }
}

impl SnapshotStore for PolicyTableSnapshot {
    fn entry(&self, app_id: &str) -> Option<&ApplicationPolicyEntry> {
        self.app_policies.get(app_id)
    }

    fn set_entry(&mut self, app_id: &str, entry: ApplicationPolicyEntry) {
        self.app_policies.insert(app_id.to_string(), entry);
    }
}

/// Locally recorded consent decisions.
pub trait ConsentStore: Send + Sync {
    /// Consent records of `app_id` on `device_id`; empty if none were recorded.
    fn permissions_for_app(&self, device_id: &str, app_id: &str) -> Vec<FunctionalGroupPermission>;

    /// Drops all device-level consent. Returns `false` on failure.
    fn reset_device_consents(&self) -> bool;
}

/// Maps applications to the device they run on and their display name.
pub trait IdentityResolver: Send + Sync {
    /// Device id of the application, or an empty string if unknown.
    fn current_device_id(&self, app_id: &str) -> String;

    /// Display name the application registered with, or an empty string.
    fn app_name(&self, app_id: &str) -> String;
}

/// Receives the notifications produced while an update is applied.
pub trait NotificationSink: Send + Sync {
    /// `default_hmi` is empty under the basic policy profile.
    fn on_permissions_updated(&self, app_id: &str, permissions: &Permissions, default_hmi: &str);

    fn on_app_revoked(&self, app_id: &str);

    fn on_pending_permission_change(&self, app_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::app_policy::{ApplicationParams, DEFAULT_ID};

    #[test]
    fn test_effective_groups_follow_alias() {
        let mut snapshot = PolicyTableSnapshot::default();
        snapshot.set_entry(
            DEFAULT_ID,
            ApplicationPolicyEntry::Params(ApplicationParams::new(vec!["Base-4".to_string()])),
        );

        let alias = ApplicationPolicyEntry::Alias(DEFAULT_ID.to_string());
        assert_eq!(snapshot.effective_groups(&alias), &["Base-4".to_string()][..]);

        let dangling = ApplicationPolicyEntry::Alias("missing".to_string());
        assert!(snapshot.effective_groups(&dangling).is_empty());
        assert!(snapshot.effective_groups(&ApplicationPolicyEntry::Revoked).is_empty());
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::app_policy::Priority;
use super::group_diff::GroupSetDiff;

/// Per-application outcome of a policy update that the HMI needs to act on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermissionsDelta {
    pub app_id: String,
    /// Application entry became `null`.
    pub app_revoked: bool,
    /// Display name is not among the allowed nicknames.
    pub app_unauthorized: bool,
    pub is_app_permissions_revoked: bool,
    pub app_revoked_permissions: Vec<String>,
    pub app_permissions_consent_needed: bool,
    /// Only populated under the extended policy profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl AppPermissionsDelta {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    /// Records the revoked groups and consent flag of a group diff.
    pub fn apply_group_diff(&mut self, diff: GroupSetDiff) {
        if !diff.revoked.is_empty() {
            self.is_app_permissions_revoked = true;
            self.app_revoked_permissions.extend(diff.revoked);
        }
        if diff.consent_needed {
            self.app_permissions_consent_needed = true;
        }
    }
}

/// Application id → delta, as accumulated over one update.
pub type PermissionsDeltaMap = BTreeMap<String, AppPermissionsDelta>;

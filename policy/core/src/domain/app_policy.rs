// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Application Policies & Policy Table
//!
//! Each application listed in the policy table carries an
//! [`ApplicationPolicyEntry`]:
//!
//! | Document form | Variant | Meaning |
//! |---------------|---------|---------|
//! | `"123": "default"` | [`ApplicationPolicyEntry::Alias`] | use the policies of another entry |
//! | `"123": { "groups": [...] }` | [`ApplicationPolicyEntry::Params`] | explicit policies |
//! | `"123": null` | [`ApplicationPolicyEntry::Revoked`] | application revoked |
//!
//! The entries `default`, `pre_DataConsent` and `device` are **predefined
//! identities**. They describe policy templates rather than real applications and
//! are exempt from revocation and nickname checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::functional_group::{FunctionalGroupings, HmiLevel};
use super::group_name::{equals_ci, GroupNameMatcher};

pub const DEFAULT_ID: &str = "default";
pub const PRE_DATA_CONSENT_ID: &str = "pre_DataConsent";
pub const DEVICE_ID: &str = "device";

/// `true` for the `default`, `pre_DataConsent` and `device` entries.
pub fn is_predefined_app(app_id: &str) -> bool {
    app_id == DEFAULT_ID || app_id == PRE_DATA_CONSENT_ID || app_id == DEVICE_ID
}

/// Application priority as assigned by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Emergency,
    Navigation,
    VoiceCommunication,
    Communication,
    Normal,
    #[default]
    None,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Emergency => "EMERGENCY",
            Priority::Navigation => "NAVIGATION",
            Priority::VoiceCommunication => "VOICECOMMUNICATION",
            Priority::Communication => "COMMUNICATION",
            Priority::Normal => "NORMAL",
            Priority::None => "NONE",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_hmi() -> HmiLevel {
    HmiLevel::None
}

/// Explicit policies of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationParams {
    /// Functional group names (case-insensitive).
    #[serde(default)]
    pub groups: Vec<String>,

    /// Display names the application may register with. Empty or absent means
    /// any name is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nicknames: Option<Vec<String>>,

    /// Groups the user does not need to consent to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconsented_groups: Option<Vec<String>>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default = "default_hmi")]
    pub default_hmi: HmiLevel,
}

impl ApplicationParams {
    pub fn new(groups: Vec<String>) -> Self {
        Self {
            groups,
            nicknames: None,
            preconsented_groups: None,
            priority: Priority::default(),
            default_hmi: default_hmi(),
        }
    }

    /// Order-insensitive, case-insensitive comparison of the group lists.
    pub fn differs_from(&self, other: &ApplicationParams) -> bool {
        if self.groups.len() != other.groups.len() {
            return true;
        }
        self.groups
            .iter()
            .any(|group| !GroupNameMatcher::new(group).is_in(&other.groups))
    }

    /// `true` unless a non-empty nickname list exists and none of its entries is
    /// exactly `app_name`. Comparison is case-sensitive.
    pub fn nickname_matches(&self, app_name: &str) -> bool {
        match &self.nicknames {
            Some(nicknames) if !app_name.is_empty() && !nicknames.is_empty() => {
                nicknames.iter().any(|nickname| nickname == app_name)
            }
            _ => true,
        }
    }

    /// Groups of this application that are not preconsented.
    pub fn groups_requiring_consent(&self) -> Vec<String> {
        let preconsented = self.preconsented_groups.as_deref().unwrap_or_default();
        groups_requiring_consent(&self.groups, preconsented)
    }
}

/// Returns the groups of `groups` missing from `preconsented` (case-insensitive).
pub fn groups_requiring_consent(groups: &[String], preconsented: &[String]) -> Vec<String> {
    groups
        .iter()
        .filter(|group| !preconsented.iter().any(|p| equals_ci(p, group)))
        .cloned()
        .collect()
}

/// Policy entry of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationPolicyEntry {
    /// Reference to another entry, e.g. `"default"`.
    Alias(String),
    Params(ApplicationParams),
    /// `null` in the document.
    Revoked,
}

impl ApplicationPolicyEntry {
    pub fn is_revoked(&self) -> bool {
        matches!(self, ApplicationPolicyEntry::Revoked)
    }

    pub fn params(&self) -> Option<&ApplicationParams> {
        match self {
            ApplicationPolicyEntry::Params(params) => Some(params),
            _ => None,
        }
    }

    /// Groups declared directly by this entry; empty for aliases and revoked apps.
    pub fn groups(&self) -> &[String] {
        match self {
            ApplicationPolicyEntry::Params(params) => &params.groups,
            ApplicationPolicyEntry::Alias(_) | ApplicationPolicyEntry::Revoked => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApplicationPolicyEntry::Alias(_) => "alias",
            ApplicationPolicyEntry::Params(_) => "params",
            ApplicationPolicyEntry::Revoked => "revoked",
        }
    }
}

/// Application id → policy entry.
pub type ApplicationPolicies = BTreeMap<String, ApplicationPolicyEntry>;

/// The application-policy part of a policy table together with its functional
/// groups.
///
/// Used both for the currently enforced snapshot and for incoming updates.
/// The snapshot is owned by the caller and mutated one application at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTableSnapshot {
    #[serde(default)]
    pub app_policies: ApplicationPolicies,
    #[serde(default)]
    pub functional_groupings: FunctionalGroupings,
}

/// An incoming update has the same shape as the snapshot.
pub type PolicyTableUpdate = PolicyTableSnapshot;

impl PolicyTableSnapshot {
    pub fn new(app_policies: ApplicationPolicies, functional_groupings: FunctionalGroupings) -> Self {
        Self {
            app_policies,
            functional_groupings,
        }
    }
}

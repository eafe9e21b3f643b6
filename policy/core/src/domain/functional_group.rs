// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Functional Groups & Consent Records
//!
//! A **functional group** is a named bundle of RPC permission templates: for each
//! RPC, the HMI levels it may be invoked from and the vehicle parameters it may
//! touch. Groups are distributed with the policy table and are immutable once
//! loaded.
//!
//! The user's decision about a group is a [`FunctionalGroupPermission`], carrying
//! one of the three [`ConsentTier`]s.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`FunctionalGroupings`] | group name → [`FunctionalGroup`] |
//! | [`RpcParameters`] | allowed HMI levels and parameters of one RPC |
//! | [`FunctionalGroupPermission`] | consent state of one group for one app |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Numeric functional group identifier as stored by the consent store.
pub type FunctionalGroupId = i32;

/// Vehicle data parameter name (e.g. `gps`, `speed`).
pub type Parameter = String;

/// HMI level an application may be in when invoking an RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HmiLevel {
    Background,
    Full,
    Limited,
    None,
}

impl HmiLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HmiLevel::Background => "BACKGROUND",
            HmiLevel::Full => "FULL",
            HmiLevel::Limited => "LIMITED",
            HmiLevel::None => "NONE",
        }
    }
}

impl fmt::Display for HmiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission template for one RPC inside a functional group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcParameters {
    #[serde(default)]
    pub hmi_levels: BTreeSet<HmiLevel>,
    /// Absent for RPCs that carry no vehicle data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeSet<Parameter>>,
}

/// A named bundle of RPC permission templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalGroup {
    /// Prompt shown to the user when consent is required, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_consent_prompt: Option<String>,
    #[serde(default)]
    pub rpcs: BTreeMap<String, RpcParameters>,
}

/// All functional groups of a policy table, keyed by group name.
pub type FunctionalGroupings = BTreeMap<String, FunctionalGroup>;

/// The user's consent decision for a group.
///
/// The variants are mutually exclusive. Precedence when the same RPC permission
/// is granted under several tiers is `UserDisallowed > Undefined > Allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentTier {
    Allowed,
    Undefined,
    UserDisallowed,
}

impl ConsentTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentTier::Allowed => "allowed",
            ConsentTier::Undefined => "undefined",
            ConsentTier::UserDisallowed => "user_disallowed",
        }
    }
}

impl fmt::Display for ConsentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsentTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allowed" => Ok(ConsentTier::Allowed),
            "undefined" => Ok(ConsentTier::Undefined),
            "user_disallowed" | "disallowed" => Ok(ConsentTier::UserDisallowed),
            other => Err(format!("unknown consent tier '{}'", other)),
        }
    }
}

/// Current user decision for one functional group of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalGroupPermission {
    pub group_id: FunctionalGroupId,
    pub group_alias: String,
    pub group_name: String,
    pub state: ConsentTier,
}

/// Group id → (user-facing alias, group name).
pub type FunctionalGroupNames = BTreeMap<FunctionalGroupId, (String, String)>;

/// Builds one [`FunctionalGroupPermission`] per id, all in the same `state`.
///
/// Used to present groups that share a consent decision, e.g. the default groups
/// which are always allowed. Ids without a known name get empty alias and name.
pub fn fill_functional_group_permissions(
    ids: &[FunctionalGroupId],
    names: &FunctionalGroupNames,
    state: ConsentTier,
) -> Vec<FunctionalGroupPermission> {
    ids.iter()
        .map(|id| {
            let (group_alias, group_name) = names.get(id).cloned().unwrap_or_default();
            FunctionalGroupPermission {
                group_id: *id,
                group_alias,
                group_name,
                state,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_functional_group_permissions_uses_uniform_state() {
        let mut names = FunctionalGroupNames::new();
        names.insert(1, ("Base".to_string(), "Base-4".to_string()));
        names.insert(2, ("Location".to_string(), "Location-1".to_string()));

        let permissions = fill_functional_group_permissions(&[2, 1], &names, ConsentTier::Allowed);

        assert_eq!(permissions.len(), 2);
        assert_eq!(permissions[0].group_id, 2);
        assert_eq!(permissions[0].group_alias, "Location");
        assert_eq!(permissions[0].group_name, "Location-1");
        assert_eq!(permissions[1].group_name, "Base-4");
        assert!(permissions.iter().all(|p| p.state == ConsentTier::Allowed));
    }

    #[test]
    fn test_fill_functional_group_permissions_unknown_id() {
        let permissions = fill_functional_group_permissions(
            &[42],
            &FunctionalGroupNames::new(),
            ConsentTier::UserDisallowed,
        );
        assert_eq!(permissions[0].group_id, 42);
        assert!(permissions[0].group_name.is_empty());
        assert!(permissions[0].group_alias.is_empty());
    }

    #[test]
    fn test_functional_grouping_deserialization() {
        let json = r#"{
            "Location-1": {
                "user_consent_prompt": "Location",
                "rpcs": {
                    "GetVehicleData": {
                        "hmi_levels": ["FULL", "LIMITED"],
                        "parameters": ["gps"]
                    },
                    "Show": { "hmi_levels": ["BACKGROUND"] }
                }
            }
        }"#;
        let groupings: FunctionalGroupings = serde_json::from_str(json).unwrap();
        let group = &groupings["Location-1"];
        let rpc = &group.rpcs["GetVehicleData"];
        assert!(rpc.hmi_levels.contains(&HmiLevel::Full));
        assert!(rpc.parameters.as_ref().unwrap().contains("gps"));
        assert!(group.rpcs["Show"].parameters.is_none());
    }

    #[test]
    fn test_consent_tier_from_str() {
        assert_eq!("Allowed".parse::<ConsentTier>().unwrap(), ConsentTier::Allowed);
        assert_eq!("user_disallowed".parse::<ConsentTier>().unwrap(), ConsentTier::UserDisallowed);
        assert!("maybe".parse::<ConsentTier>().is_err());
    }
}

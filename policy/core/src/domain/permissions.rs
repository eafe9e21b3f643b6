// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Permission Resolution
//!
//! Expands an application's functional groups into the per-RPC permission
//! payload that drives consent prompts. Each group contributes its RPC templates
//! under the consent tier the user assigned to that group; afterwards a
//! precedence pass guarantees every `(rpc, level)` and `(rpc, parameter)` pair
//! sits in exactly one tier:
//!
//! ```text
//! UserDisallowed  >  Undefined  >  Allowed
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::functional_group::{
    ConsentTier, FunctionalGroupPermission, FunctionalGroupings, HmiLevel, Parameter, RpcParameters,
};
use super::group_name::equals_ci;

/// Permissions of one RPC bucketed by consent tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcPermissions {
    pub hmi_permissions: BTreeMap<ConsentTier, BTreeSet<HmiLevel>>,
    pub parameter_permissions: BTreeMap<ConsentTier, BTreeSet<Parameter>>,
}

impl RpcPermissions {
    pub fn hmi_levels(&self, tier: ConsentTier) -> Option<&BTreeSet<HmiLevel>> {
        self.hmi_permissions.get(&tier)
    }

    pub fn parameters(&self, tier: ConsentTier) -> Option<&BTreeSet<Parameter>> {
        self.parameter_permissions.get(&tier)
    }

    fn insert(&mut self, tier: ConsentTier, template: &RpcParameters) {
        self.hmi_permissions
            .entry(tier)
            .or_default()
            .extend(template.hmi_levels.iter().copied());
        let parameters = self.parameter_permissions.entry(tier).or_default();
        if let Some(template_parameters) = &template.parameters {
            parameters.extend(template_parameters.iter().cloned());
        }
    }

    fn exclude_by_precedence(&mut self) {
        exclude_tier(&mut self.hmi_permissions, ConsentTier::UserDisallowed, ConsentTier::Allowed);
        exclude_tier(&mut self.hmi_permissions, ConsentTier::UserDisallowed, ConsentTier::Undefined);
        exclude_tier(&mut self.hmi_permissions, ConsentTier::Undefined, ConsentTier::Allowed);

        exclude_tier(&mut self.parameter_permissions, ConsentTier::UserDisallowed, ConsentTier::Allowed);
        exclude_tier(&mut self.parameter_permissions, ConsentTier::UserDisallowed, ConsentTier::Undefined);
        exclude_tier(&mut self.parameter_permissions, ConsentTier::Undefined, ConsentTier::Allowed);
    }
}

/// Removes from `target` every item present in `dominant`.
fn exclude_tier<T: Ord>(
    buckets: &mut BTreeMap<ConsentTier, BTreeSet<T>>,
    dominant: ConsentTier,
    target: ConsentTier,
) {
    let Some(dominant_items) = buckets.remove(&dominant) else {
        return;
    };
    if let Some(target_items) = buckets.get_mut(&target) {
        target_items.retain(|item| !dominant_items.contains(item));
    }
    buckets.insert(dominant, dominant_items);
}

/// Permissions payload: rpc name → tiered permissions.
pub type Permissions = BTreeMap<String, RpcPermissions>;

/// Resolves an application's groups into a [`Permissions`] payload.
pub struct ConsentResolver<'a> {
    groupings: &'a FunctionalGroupings,
    group_permissions: &'a [FunctionalGroupPermission],
    undefined_group_consent: ConsentTier,
}

impl<'a> ConsentResolver<'a> {
    pub fn new(
        groupings: &'a FunctionalGroupings,
        group_permissions: &'a [FunctionalGroupPermission],
        undefined_group_consent: ConsentTier,
    ) -> Self {
        Self {
            groupings,
            group_permissions,
            undefined_group_consent,
        }
    }

    /// Recorded consent of `group_name`, or `Undefined` if the user never decided.
    pub fn tier_of(&self, group_name: &str) -> ConsentTier {
        self.group_permissions
            .iter()
            .find(|permission| equals_ci(&permission.group_name, group_name))
            .map(|permission| permission.state)
            .unwrap_or(ConsentTier::Undefined)
    }

    /// Tier under which the group's RPCs are reported.
    pub fn effective_tier(&self, group_name: &str) -> ConsentTier {
        match self.tier_of(group_name) {
            ConsentTier::Undefined => self.undefined_group_consent,
            decided => decided,
        }
    }

    /// Builds the payload for `group_names`. Names missing from the groupings are
    /// skipped.
    pub fn resolve<S: AsRef<str>>(&self, group_names: &[S]) -> Permissions {
        let mut permissions = Permissions::new();
        for group_name in group_names {
            let group_name = group_name.as_ref();
            let Some(group) = self.groupings.get(group_name) else {
                continue;
            };
            let tier = self.effective_tier(group_name);
            for (rpc_name, template) in &group.rpcs {
                permissions
                    .entry(rpc_name.clone())
                    .or_default()
                    .insert(tier, template);
            }
        }
        for rpc in permissions.values_mut() {
            rpc.exclude_by_precedence();
        }
        permissions
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Application Policy Differ
//!
//! Evaluates one `(app_id, entry)` pair of an incoming update against the
//! enforced snapshot. The first matching rule decides the outcome:
//!
//! 1. **Revoked**: the entry is `null` and the app is not predefined.
//! 2. **New application**: the app is missing from the snapshot.
//! 3. **Unauthorized**: the entry lists nicknames and the app's display name is
//!    not among them.
//! 4. **Unchanged / Changed**: decided by [`diff_groups`].
//!
//! Every branch writes the snapshot entry before returning, "unchanged"
//! included, so priority, nicknames and default HMI always follow the update.
//! Deltas are accumulated into the caller's [`PermissionsDeltaMap`]; the first
//! delta recorded for an app wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::app_policy::{is_predefined_app, ApplicationPolicyEntry, PolicyTableUpdate, DEVICE_ID};
use crate::domain::delta::{AppPermissionsDelta, PermissionsDeltaMap};
use crate::domain::engine_config::PolicyProfile;
use crate::domain::functional_group::ConsentTier;
use crate::domain::group_diff::{diff_groups, GroupSetDiff};
use crate::domain::permissions::ConsentResolver;
use crate::domain::policy::PolicyUpdateError;
use crate::domain::repository::{ConsentStore, IdentityResolver, NotificationSink, SnapshotStore};

/// How one application was classified by the differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppPolicyOutcome {
    Revoked,
    NewApplication,
    Unauthorized,
    Unchanged,
    Changed,
}

impl AppPolicyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppPolicyOutcome::Revoked => "revoked",
            AppPolicyOutcome::NewApplication => "new_application",
            AppPolicyOutcome::Unauthorized => "unauthorized",
            AppPolicyOutcome::Unchanged => "unchanged",
            AppPolicyOutcome::Changed => "changed",
        }
    }
}

/// Per-application comparison of a policy update against the snapshot.
///
/// Holds the collaborators and the settings resolved at construction; the
/// snapshot and delta map are passed to [`ApplicationPolicyDiffer::check`] so
/// the caller keeps exclusive ownership of both.
pub struct ApplicationPolicyDiffer<'a> {
    update: &'a PolicyTableUpdate,
    consent_store: &'a dyn ConsentStore,
    identity: &'a dyn IdentityResolver,
    listener: &'a dyn NotificationSink,
    profile: PolicyProfile,
    undefined_group_consent: ConsentTier,
}

impl<'a> ApplicationPolicyDiffer<'a> {
    pub fn new(
        update: &'a PolicyTableUpdate,
        consent_store: &'a dyn ConsentStore,
        identity: &'a dyn IdentityResolver,
        listener: &'a dyn NotificationSink,
        profile: PolicyProfile,
        undefined_group_consent: ConsentTier,
    ) -> Self {
        Self {
            update,
            consent_store,
            identity,
            listener,
            profile,
            undefined_group_consent,
        }
    }

    pub fn check<S: SnapshotStore>(
        &self,
        snapshot: &mut S,
        deltas: &mut PermissionsDeltaMap,
        app_id: &str,
        entry: &ApplicationPolicyEntry,
    ) -> Result<AppPolicyOutcome, PolicyUpdateError> {
        let mut delta = AppPermissionsDelta::new(app_id);
        if self.profile.reports_priority() {
            delta.priority = entry.params().map(|params| params.priority);
        }

        if !is_predefined_app(app_id) && entry.is_revoked() {
            delta.app_revoked = true;
            register_delta(deltas, delta);
            self.listener.on_app_revoked(app_id);
            snapshot.set_entry(app_id, ApplicationPolicyEntry::Revoked);
            info!("Application '{}' has been revoked", app_id);
            return Ok(AppPolicyOutcome::Revoked);
        }

        if !snapshot.contains(app_id) {
            snapshot.set_entry(app_id, entry.clone());
            self.send_notification(&*snapshot, app_id, entry);
            self.send_on_pending_permissions(deltas, entry, delta);
            info!("Added policies for new application '{}'", app_id);
            return Ok(AppPolicyOutcome::NewApplication);
        }

        if let Some(params) = entry.params() {
            let app_name = self.identity.app_name(app_id);
            if !params.nickname_matches(&app_name) {
                delta.app_unauthorized = true;
                register_delta(deltas, delta);
                self.listener.on_pending_permission_change(app_id);
                snapshot.set_entry(app_id, ApplicationPolicyEntry::Revoked);
                warn!(
                    "Application '{}' registered as '{}' which is not an allowed nickname",
                    app_id, app_name
                );
                return Ok(AppPolicyOutcome::Unauthorized);
            }
        }

        if self.has_same_groups(&*snapshot, app_id, entry, &mut delta) {
            snapshot.set_entry(app_id, entry.clone());
            info!("Permissions for application '{}' weren't changed", app_id);
            return Ok(AppPolicyOutcome::Unchanged);
        }

        info!("Permissions for application '{}' have been changed", app_id);
        snapshot.set_entry(app_id, entry.clone());

        if !is_predefined_app(app_id) {
            self.send_notification(&*snapshot, app_id, entry);
            self.send_on_pending_permissions(deltas, entry, delta);
        }

        // New or different device groups invalidate consent given for the old ones
        if app_id == DEVICE_ID && self.profile.resets_device_consent() {
            if !self.consent_store.reset_device_consents() {
                warn!("Failed to reset device consents");
                return Err(PolicyUpdateError::DeviceConsentResetFailed {
                    app_id: app_id.to_string(),
                });
            }
            debug!("Device consents reset");
        }

        Ok(AppPolicyOutcome::Changed)
    }

    /// Compares the snapshot entry with `entry`, recording revoked groups and
    /// the consent flag into `delta`.
    fn has_same_groups<S: SnapshotStore>(
        &self,
        snapshot: &S,
        app_id: &str,
        entry: &ApplicationPolicyEntry,
        delta: &mut AppPermissionsDelta,
    ) -> bool {
        let current = snapshot.entry(app_id);

        if let ApplicationPolicyEntry::Alias(alias) = entry {
            return matches!(current, Some(ApplicationPolicyEntry::Alias(current_alias)) if current_alias == alias);
        }

        let current_groups = current.map(|c| c.groups()).unwrap_or_default();
        let diff: GroupSetDiff = diff_groups(current_groups, entry.groups());
        let unchanged = diff.is_unchanged();
        delta.apply_group_diff(diff);
        unchanged
    }

    /// Sends the resolved permissions of the app's groups to the listener.
    ///
    /// Skipped when the device of the app is unknown.
    fn send_notification<S: SnapshotStore>(&self, snapshot: &S, app_id: &str, entry: &ApplicationPolicyEntry) {
        let device_id = self.identity.current_device_id(app_id);
        if device_id.is_empty() {
            warn!("Couldn't find device info for application id '{}'", app_id);
            return;
        }
        let group_permissions = self.consent_store.permissions_for_app(&device_id, app_id);

        // An alias target carried by the same update wins over the enforced one
        let groups = match entry {
            ApplicationPolicyEntry::Alias(target) if self.update.contains(target) => {
                self.update.effective_groups(entry)
            }
            _ => snapshot.effective_groups(entry),
        };
        let permissions = ConsentResolver::new(
            &self.update.functional_groupings,
            &group_permissions,
            self.undefined_group_consent,
        )
        .resolve(groups);

        let default_hmi = match entry.params() {
            Some(params) if self.profile.reports_default_hmi() => params.default_hmi.as_str(),
            _ => "",
        };

        info!("Send notification for application_id: {}", app_id);
        self.listener.on_permissions_updated(app_id, &permissions, default_hmi);
    }

    fn send_on_pending_permissions(
        &self,
        deltas: &mut PermissionsDeltaMap,
        entry: &ApplicationPolicyEntry,
        delta: AppPermissionsDelta,
    ) {
        if delta.app_permissions_consent_needed && self.profile.honors_preconsented_groups() {
            let needs_prompt = entry
                .params()
                .map(|params| !params.groups_requiring_consent().is_empty())
                .unwrap_or(false);
            if needs_prompt {
                let app_id = delta.app_id.clone();
                register_delta(deltas, delta);
                self.listener.on_pending_permission_change(&app_id);
                return;
            }
        }

        if delta.is_app_permissions_revoked {
            let app_id = delta.app_id.clone();
            register_delta(deltas, delta);
            self.listener.on_pending_permission_change(&app_id);
        }
    }
}

fn register_delta(deltas: &mut PermissionsDeltaMap, delta: AppPermissionsDelta) {
    deltas.entry(delta.app_id.clone()).or_insert(delta);
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Update Service
//!
//! Applies a whole policy update to the enforced snapshot. The snapshot lock is
//! held for the entire batch, so readers never observe a partially applied
//! update. Applications are evaluated one at a time in application-id order.
//!
//! ## Failure handling
//!
//! A failed application (e.g. device consent could not be reset) is recorded in
//! [`UpdateReport::failed_apps`]. With [`FailurePolicy::Abort`] the batch stops at
//! the first failure and [`UpdateReport::aborted_at`] names the failing app.
//! Applications evaluated before it stay applied: their notifications have
//! already been delivered, so the snapshot must keep matching them.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::app_policy_differ::{AppPolicyOutcome, ApplicationPolicyDiffer};
use crate::domain::app_policy::{ApplicationPolicyEntry, PolicyTableSnapshot, PolicyTableUpdate};
use crate::domain::delta::PermissionsDeltaMap;
use crate::domain::engine_config::{EngineConfig, FailurePolicy};
use crate::domain::events::{PolicyUpdateEvent, UpdateId};
use crate::domain::repository::{ConsentStore, IdentityResolver, NotificationSink};
use crate::infrastructure::event_bus::EventBus;

/// Result of applying one update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub update_id: UpdateId,
    pub outcomes: BTreeMap<String, AppPolicyOutcome>,
    pub deltas: PermissionsDeltaMap,
    pub failed_apps: Vec<String>,
    /// Application at which an aborting batch stopped.
    pub aborted_at: Option<String>,
}

impl UpdateReport {
    pub fn count(&self, outcome: AppPolicyOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }
}

pub struct PolicyUpdateService {
    snapshot: Arc<Mutex<PolicyTableSnapshot>>,
    consent_store: Arc<dyn ConsentStore>,
    identity: Arc<dyn IdentityResolver>,
    listener: Arc<dyn NotificationSink>,
    event_bus: Arc<EventBus>,
    config: EngineConfig,
}

impl PolicyUpdateService {
    pub fn new(
        snapshot: Arc<Mutex<PolicyTableSnapshot>>,
        consent_store: Arc<dyn ConsentStore>,
        identity: Arc<dyn IdentityResolver>,
        listener: Arc<dyn NotificationSink>,
        event_bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            snapshot,
            consent_store,
            identity,
            listener,
            event_bus,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Copy of the currently enforced snapshot.
    pub fn snapshot(&self) -> PolicyTableSnapshot {
        self.snapshot.lock().clone()
    }

    pub fn apply_update(&self, update: &PolicyTableUpdate) -> UpdateReport {
        let update_id = UpdateId::new();
        let mut snapshot = self.snapshot.lock();

        info!(
            update_id = %update_id,
            apps = update.app_policies.len(),
            "Applying policy update"
        );
        self.event_bus.publish_update_event(PolicyUpdateEvent::UpdateStarted {
            update_id,
            app_count: update.app_policies.len(),
            started_at: Utc::now(),
        });

        let differ = ApplicationPolicyDiffer::new(
            update,
            self.consent_store.as_ref(),
            self.identity.as_ref(),
            self.listener.as_ref(),
            self.config.profile,
            self.config.undefined_group_consent,
        );

        let mut report = UpdateReport {
            update_id,
            outcomes: BTreeMap::new(),
            deltas: PermissionsDeltaMap::new(),
            failed_apps: Vec::new(),
            aborted_at: None,
        };

        for (app_id, entry) in &update.app_policies {
            log_param_change(&snapshot, app_id, entry);

            match differ.check(&mut *snapshot, &mut report.deltas, app_id, entry) {
                Ok(outcome) => {
                    metrics::counter!("consent_policy_apps_evaluated_total", "outcome" => outcome.as_str())
                        .increment(1);
                    report.outcomes.insert(app_id.clone(), outcome);
                }
                Err(e) => {
                    metrics::counter!("consent_policy_apps_failed_total").increment(1);
                    warn!(update_id = %update_id, app_id = %e.app_id(), "Policy update failed: {}", e);
                    report.failed_apps.push(app_id.clone());

                    if self.config.failure_policy == FailurePolicy::Abort {
                        warn!(
                            update_id = %update_id,
                            remaining = update.app_policies.len() - report.outcomes.len() - 1,
                            "Aborting policy update"
                        );
                        self.event_bus.publish_update_event(PolicyUpdateEvent::UpdateAborted {
                            update_id,
                            app_id: app_id.clone(),
                            reason: e.to_string(),
                            aborted_at: Utc::now(),
                        });
                        report.aborted_at = Some(app_id.clone());
                        return report;
                    }
                }
            }
        }

        info!(
            update_id = %update_id,
            deltas = report.deltas.len(),
            failed = report.failed_apps.len(),
            "Policy update applied"
        );
        self.event_bus.publish_update_event(PolicyUpdateEvent::UpdateCompleted {
            update_id,
            deltas: report.deltas.values().cloned().collect(),
            failed_apps: report.failed_apps.clone(),
            completed_at: Utc::now(),
        });

        report
    }
}

fn log_param_change(snapshot: &PolicyTableSnapshot, app_id: &str, entry: &ApplicationPolicyEntry) {
    let current = snapshot.app_policies.get(app_id).and_then(|c| c.params());
    if let (Some(current), Some(new)) = (current, entry.params()) {
        if current.differs_from(new) {
            debug!(app_id = %app_id, "Group list differs from enforced policy");
        }
    }
}

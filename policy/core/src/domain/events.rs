// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::delta::AppPermissionsDelta;
use crate::domain::permissions::Permissions;

/// Identifies one applied policy update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateId(pub Uuid);

impl UpdateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UpdateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UpdateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notifications emitted towards the HMI while an update is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsentEvent {
    PermissionsUpdated {
        app_id: String,
        permissions: Permissions,
        default_hmi: String,
        emitted_at: DateTime<Utc>,
    },
    AppRevoked {
        app_id: String,
        emitted_at: DateTime<Utc>,
    },
    PendingPermissionChange {
        app_id: String,
        emitted_at: DateTime<Utc>,
    },
}

impl ConsentEvent {
    pub fn app_id(&self) -> &str {
        match self {
            ConsentEvent::PermissionsUpdated { app_id, .. }
            | ConsentEvent::AppRevoked { app_id, .. }
            | ConsentEvent::PendingPermissionChange { app_id, .. } => app_id,
        }
    }
}

/// Lifecycle of a policy update batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolicyUpdateEvent {
    UpdateStarted {
        update_id: UpdateId,
        app_count: usize,
        started_at: DateTime<Utc>,
    },
    UpdateCompleted {
        update_id: UpdateId,
        deltas: Vec<AppPermissionsDelta>,
        failed_apps: Vec<String>,
        completed_at: DateTime<Utc>,
    },
    UpdateAborted {
        update_id: UpdateId,
        app_id: String,
        reason: String,
        aborted_at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consent_event_serialization() {
        let event = ConsentEvent::AppRevoked {
            app_id: "1234".to_string(),
            emitted_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ConsentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.app_id(), "1234");
        assert!(matches!(deserialized, ConsentEvent::AppRevoked { .. }));
    }

    #[test]
    fn test_update_completed_serialization() {
        let update_id = UpdateId::new();
        let event = PolicyUpdateEvent::UpdateCompleted {
            update_id,
            deltas: vec![AppPermissionsDelta::new("1234")],
            failed_apps: vec![],
            completed_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: PolicyUpdateEvent = serde_json::from_str(&json).unwrap();
        if let PolicyUpdateEvent::UpdateCompleted { update_id: id, deltas, .. } = deserialized {
            assert_eq!(id, update_id);
            assert_eq!(deltas[0].app_id, "1234");
        } else {
            panic!("Expected UpdateCompleted");
        }
    }
}

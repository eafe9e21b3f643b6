// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Event Bus Notification Sink
//!
//! Publishes every engine notification as a [`ConsentEvent`] on the
//! [`EventBus`]. Publishing never blocks and never touches the snapshot, so it
//! is safe to call from inside a running update.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::events::ConsentEvent;
use crate::domain::permissions::Permissions;
use crate::domain::repository::NotificationSink;
use crate::infrastructure::event_bus::EventBus;

pub struct EventBusNotificationSink {
    event_bus: Arc<EventBus>,
}

impl EventBusNotificationSink {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self { event_bus }
    }
}

impl NotificationSink for EventBusNotificationSink {
    fn on_permissions_updated(&self, app_id: &str, permissions: &Permissions, default_hmi: &str) {
        info!(app_id = %app_id, rpcs = permissions.len(), "Permissions updated");
        self.event_bus.publish_consent_event(ConsentEvent::PermissionsUpdated {
            app_id: app_id.to_string(),
            permissions: permissions.clone(),
            default_hmi: default_hmi.to_string(),
            emitted_at: Utc::now(),
        });
    }

    fn on_app_revoked(&self, app_id: &str) {
        info!(app_id = %app_id, "Application revoked");
        self.event_bus.publish_consent_event(ConsentEvent::AppRevoked {
            app_id: app_id.to_string(),
            emitted_at: Utc::now(),
        });
    }

    fn on_pending_permission_change(&self, app_id: &str) {
        info!(app_id = %app_id, "Pending permission change");
        self.event_bus.publish_consent_event(ConsentEvent::PendingPermissionChange {
            app_id: app_id.to_string(),
            emitted_at: Utc::now(),
        });
    }
}

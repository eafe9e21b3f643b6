// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Policy Events
//
// In-memory event streaming over tokio broadcast channels. Consent
// notifications and update lifecycle events are fanned out to any number of
// observers (HMI bridge, CLI, audit log). Events are lost if nobody listens.

use crate::domain::events::{ConsentEvent, PolicyUpdateEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Unified event type carried by the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEvent {
    Consent(ConsentEvent),
    PolicyUpdate(PolicyUpdateEvent),
}

/// Event bus for publishing and subscribing to policy events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn publish_consent_event(&self, event: ConsentEvent) {
        self.publish(DomainEvent::Consent(event));
    }

    pub fn publish_update_event(&self, event: PolicyUpdateEvent) {
        self.publish(DomainEvent::PolicyUpdate(event));
    }

    fn publish(&self, event: DomainEvent) {
        debug!("Publishing event: {:?}", event);

        // send() fails only when there are no receivers
        let receiver_count = self.sender.send(event).unwrap_or(0);

        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to consent notifications addressed to one application
    pub fn subscribe_app(&self, app_id: impl Into<String>) -> AppEventReceiver {
        AppEventReceiver {
            receiver: self.sender.subscribe(),
            app_id: app_id.into(),
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiver for all events
pub struct EventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Drains every event currently buffered for this receiver
    pub fn drain(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Ok(event) => events.push(event),
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }
}

/// Receiver for consent events of a single application (filtered)
pub struct AppEventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
    app_id: String,
}

impl AppEventReceiver {
    /// Receive the next consent event for the application
    /// Events for other applications and lifecycle events are skipped
    pub async fn recv(&mut self) -> Result<ConsentEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if let DomainEvent::Consent(consent_event) = event {
                if consent_event.app_id() == self.app_id {
                    return Ok(consent_event);
                }
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.publish_consent_event(ConsentEvent::AppRevoked {
            app_id: "1234".to_string(),
            emitted_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        match received {
            DomainEvent::Consent(ConsentEvent::AppRevoked { app_id, .. }) => {
                assert_eq!(app_id, "1234");
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_app_event_filtering() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe_app("1234");

        // Different application, filtered out
        event_bus.publish_consent_event(ConsentEvent::PendingPermissionChange {
            app_id: "5678".to_string(),
            emitted_at: Utc::now(),
        });
        event_bus.publish_consent_event(ConsentEvent::PendingPermissionChange {
            app_id: "1234".to_string(),
            emitted_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.app_id(), "1234");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish_consent_event(ConsentEvent::AppRevoked {
            app_id: "1234".to_string(),
            emitted_at: Utc::now(),
        });

        let _ = receiver1.recv().await.unwrap();
        let _ = receiver2.recv().await.unwrap();
    }

    #[test]
    fn test_drain_without_events() {
        let event_bus = EventBus::new(4);
        let mut receiver = event_bus.subscribe();
        assert!(receiver.drain().is_empty());
    }
}

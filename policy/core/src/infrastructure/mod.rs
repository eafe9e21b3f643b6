// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod in_memory;
pub mod notification;
pub mod policy_document;

pub use event_bus::{DomainEvent, EventBus, EventBusError};
pub use in_memory::{InMemoryConsentStore, StaticIdentityResolver};
pub use notification::EventBusNotificationSink;
pub use policy_document::{AppConsentRecord, ConsentDocument, PolicyDocument};

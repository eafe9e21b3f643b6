// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # In-Memory Collaborators
//!
//! [`InMemoryConsentStore`] and [`StaticIdentityResolver`] back the engine when
//! no platform store is available: in tests, and in the CLI where consent
//! records come from a file.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::functional_group::{ConsentTier, FunctionalGroupPermission};
use crate::domain::repository::{ConsentStore, IdentityResolver};
use crate::infrastructure::policy_document::ConsentDocument;

/// Consent records keyed by `(device_id, app_id)` plus device-level consent.
pub struct InMemoryConsentStore {
    app_consents: RwLock<HashMap<(String, String), Vec<FunctionalGroupPermission>>>,
    device_consents: RwLock<HashMap<String, ConsentTier>>,
    reset_fails: AtomicBool,
}

impl InMemoryConsentStore {
    pub fn new() -> Self {
        Self {
            app_consents: RwLock::new(HashMap::new()),
            device_consents: RwLock::new(HashMap::new()),
            reset_fails: AtomicBool::new(false),
        }
    }

    pub fn from_document(document: &ConsentDocument) -> Self {
        let store = Self::new();
        for (app_id, record) in &document.apps {
            store.record(&record.device_id, app_id, record.consents.clone());
        }
        for (device_id, tier) in &document.device_consents {
            store.record_device_consent(device_id, *tier);
        }
        store
    }

    pub fn record(&self, device_id: &str, app_id: &str, consents: Vec<FunctionalGroupPermission>) {
        self.app_consents
            .write()
            .insert((device_id.to_string(), app_id.to_string()), consents);
    }

    pub fn record_device_consent(&self, device_id: &str, tier: ConsentTier) {
        self.device_consents.write().insert(device_id.to_string(), tier);
    }

    pub fn device_consent(&self, device_id: &str) -> Option<ConsentTier> {
        self.device_consents.read().get(device_id).copied()
    }

    /// Makes subsequent [`ConsentStore::reset_device_consents`] calls fail.
    pub fn fail_resets(&self, fail: bool) {
        self.reset_fails.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryConsentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentStore for InMemoryConsentStore {
    fn permissions_for_app(&self, device_id: &str, app_id: &str) -> Vec<FunctionalGroupPermission> {
        self.app_consents
            .read()
            .get(&(device_id.to_string(), app_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn reset_device_consents(&self) -> bool {
        if self.reset_fails.load(Ordering::SeqCst) {
            return false;
        }
        self.device_consents.write().clear();
        true
    }
}

/// Fixed app → (device, display name) mapping.
#[derive(Debug, Default)]
pub struct StaticIdentityResolver {
    apps: RwLock<HashMap<String, (String, String)>>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: &ConsentDocument) -> Self {
        let resolver = Self::new();
        for (app_id, record) in &document.apps {
            resolver.register(app_id, &record.device_id, &record.name);
        }
        resolver
    }

    pub fn register(&self, app_id: &str, device_id: &str, app_name: &str) {
        self.apps
            .write()
            .insert(app_id.to_string(), (device_id.to_string(), app_name.to_string()));
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn current_device_id(&self, app_id: &str) -> String {
        self.apps
            .read()
            .get(app_id)
            .map(|(device_id, _)| device_id.clone())
            .unwrap_or_default()
    }

    fn app_name(&self, app_id: &str) -> String {
        self.apps
            .read()
            .get(app_id)
            .map(|(_, name)| name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consent(name: &str, state: ConsentTier) -> FunctionalGroupPermission {
        FunctionalGroupPermission {
            group_id: 1,
            group_alias: name.to_string(),
            group_name: name.to_string(),
            state,
        }
    }

    #[test]
    fn test_consents_are_keyed_by_device_and_app() {
        let store = InMemoryConsentStore::new();
        store.record("dev-1", "1234", vec![consent("Location-1", ConsentTier::Allowed)]);

        assert_eq!(store.permissions_for_app("dev-1", "1234").len(), 1);
        assert!(store.permissions_for_app("dev-2", "1234").is_empty());
        assert!(store.permissions_for_app("dev-1", "5678").is_empty());
    }

    #[test]
    fn test_reset_device_consents() {
        let store = InMemoryConsentStore::new();
        store.record_device_consent("dev-1", ConsentTier::Allowed);

        assert!(store.reset_device_consents());
        assert_eq!(store.device_consent("dev-1"), None);

        store.fail_resets(true);
        assert!(!store.reset_device_consents());
    }

    #[test]
    fn test_identity_resolver_unknown_app() {
        let resolver = StaticIdentityResolver::new();
        resolver.register("1234", "dev-1", "Nav App");

        assert_eq!(resolver.current_device_id("1234"), "dev-1");
        assert_eq!(resolver.app_name("1234"), "Nav App");
        assert!(resolver.current_device_id("9999").is_empty());
        assert!(resolver.app_name("9999").is_empty());
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Document Loading
//!
//! Reads snapshots, updates and consent records from JSON or YAML files. The
//! format is chosen by file extension (`.yaml`/`.yml` → YAML, anything else →
//! JSON). No schema validation happens here beyond what serde enforces.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::app_policy::PolicyTableSnapshot;
use crate::domain::functional_group::{ConsentTier, FunctionalGroupPermission};

/// Top-level policy document: `{ "policy_table": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub policy_table: PolicyTableSnapshot,
}

impl PolicyDocument {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        read_document(path.as_ref())
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        write_document(path.as_ref(), self)
    }
}

/// Consent state of one application as recorded on the head unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConsentRecord {
    pub device_id: String,
    /// Display name the application registered with.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub consents: Vec<FunctionalGroupPermission>,
}

/// Consent records of all known applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsentDocument {
    #[serde(default)]
    pub apps: BTreeMap<String, AppConsentRecord>,
    /// Device id → device-level consent.
    #[serde(default)]
    pub device_consents: BTreeMap<String, ConsentTier>,
}

impl ConsentDocument {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        read_document(path.as_ref())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML document {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON document {}", path.display()))?
    };
    Ok(document)
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(document)?
    } else {
        serde_json::to_string_pretty(document)?
    };
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::app_policy::ApplicationPolicyEntry;

    const SNAPSHOT_JSON: &str = r#"{
        "policy_table": {
            "app_policies": {
                "default": { "groups": ["Base-4"] },
                "1234": "default",
                "5678": null
            },
            "functional_groupings": {
                "Base-4": { "rpcs": { "Show": { "hmi_levels": ["FULL"] } } }
            }
        }
    }"#;

    #[test]
    fn test_load_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT_JSON).unwrap();

        let document = PolicyDocument::from_path(&path).unwrap();
        let table = &document.policy_table;
        assert_eq!(table.app_policies.len(), 3);
        assert_eq!(
            table.app_policies["1234"],
            ApplicationPolicyEntry::Alias("default".to_string())
        );
        assert!(table.app_policies["5678"].is_revoked());
        assert!(table.functional_groupings.contains_key("Base-4"));
    }

    #[test]
    fn test_yaml_document_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("snapshot.json");
        std::fs::write(&json_path, SNAPSHOT_JSON).unwrap();
        let document = PolicyDocument::from_path(&json_path).unwrap();

        let yaml_path = dir.path().join("snapshot.yaml");
        document.to_path(&yaml_path).unwrap();
        assert_eq!(PolicyDocument::from_path(&yaml_path).unwrap(), document);
    }

    #[test]
    fn test_load_consent_document_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consents.yml");
        std::fs::write(
            &path,
            r#"
apps:
  "1234":
    device_id: dev-1
    name: Nav App
    consents:
      - group_id: 7
        group_alias: Location
        group_name: Location-1
        state: user_disallowed
device_consents:
  dev-1: allowed
"#,
        )
        .unwrap();

        let document = ConsentDocument::from_path(&path).unwrap();
        let record = &document.apps["1234"];
        assert_eq!(record.device_id, "dev-1");
        assert_eq!(record.consents[0].state, ConsentTier::UserDisallowed);
        assert_eq!(document.device_consents["dev-1"], ConsentTier::Allowed);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = PolicyDocument::from_path("/nonexistent/policy.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policy.json"));
    }
}

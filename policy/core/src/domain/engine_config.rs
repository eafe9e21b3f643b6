// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Engine Configuration
//
// Settings resolved once when the engine is constructed:
// - Policy profile (basic vs. extended feature set)
// - Consent tier reported for groups the user never decided on
// - What a batch does after an application fails
// - Event bus buffering

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::functional_group::ConsentTier;

pub const CONFIG_PATH_ENV: &str = "CONSENT_POLICY_CONFIG";
pub const PROFILE_ENV: &str = "CONSENT_POLICY_PROFILE";
pub const UNDEFINED_CONSENT_ENV: &str = "CONSENT_POLICY_UNDEFINED_CONSENT";

/// Policy feature set.
///
/// The extended profile adds application priority, default HMI reporting,
/// preconsented groups and device consent reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyProfile {
    #[default]
    Basic,
    Extended,
}

impl PolicyProfile {
    pub fn reports_priority(&self) -> bool {
        matches!(self, PolicyProfile::Extended)
    }

    pub fn reports_default_hmi(&self) -> bool {
        matches!(self, PolicyProfile::Extended)
    }

    /// Whether preconsented groups filter the consent-needed notification.
    pub fn honors_preconsented_groups(&self) -> bool {
        matches!(self, PolicyProfile::Extended)
    }

    pub fn resets_device_consent(&self) -> bool {
        matches!(self, PolicyProfile::Extended)
    }
}

impl std::str::FromStr for PolicyProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(PolicyProfile::Basic),
            "extended" => Ok(PolicyProfile::Extended),
            other => Err(format!("unknown policy profile '{}'", other)),
        }
    }
}

/// What happens to the rest of a batch after an application fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Continue,
    Abort,
}

fn default_undefined_group_consent() -> ConsentTier {
    ConsentTier::Undefined
}

fn default_event_bus_capacity() -> usize {
    1000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub profile: PolicyProfile,

    /// Tier reported for groups without a recorded decision.
    #[serde(default = "default_undefined_group_consent")]
    pub undefined_group_consent: ConsentTier,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: PolicyProfile::default(),
            undefined_group_consent: default_undefined_group_consent(),
            failure_policy: FailurePolicy::default(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. CONSENT_POLICY_CONFIG environment variable
    /// 2. ./consent-policy.yaml (working directory)
    /// 3. ~/.consent-policy/config.yaml (user home)
    /// 4. /etc/consent-policy/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./consent-policy.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".consent-policy").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/consent-policy/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(PROFILE_ENV) {
            match val.parse::<PolicyProfile>() {
                Ok(profile) => {
                    tracing::info!("Environment override: {}={:?}", PROFILE_ENV, profile);
                    self.profile = profile;
                }
                Err(e) => tracing::warn!("Ignoring {}: {}", PROFILE_ENV, e),
            }
        }

        if let Ok(val) = std::env::var(UNDEFINED_CONSENT_ENV) {
            match val.parse::<ConsentTier>() {
                Ok(tier) => {
                    tracing::info!("Environment override: {}={}", UNDEFINED_CONSENT_ENV, tier);
                    self.undefined_group_consent = tier;
                }
                Err(e) => tracing::warn!("Ignoring {}: {}", UNDEFINED_CONSENT_ENV, e),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.event_bus_capacity == 0 {
            anyhow::bail!("event_bus_capacity must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.profile, PolicyProfile::Basic);
        assert_eq!(config.undefined_group_consent, ConsentTier::Undefined);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
profile: extended
undefined_group_consent: user_disallowed
failure_policy: abort
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.profile, PolicyProfile::Extended);
        assert_eq!(config.undefined_group_consent, ConsentTier::UserDisallowed);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.event_bus_capacity, 1000);
    }

    #[test]
    fn test_profile_capabilities() {
        assert!(PolicyProfile::Extended.reports_priority());
        assert!(PolicyProfile::Extended.resets_device_consent());
        assert!(!PolicyProfile::Basic.reports_default_hmi());
        assert!(!PolicyProfile::Basic.honors_preconsented_groups());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile: extended\nevent_bus_capacity: 16").unwrap();

        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.profile, PolicyProfile::Extended);
        assert_eq!(config.event_bus_capacity, 16);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = EngineConfig::load_or_default(Some(PathBuf::from("/nonexistent/consent-policy.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_capacity_is_invalid() {
        let config = EngineConfig {
            event_bus_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = EngineConfig {
            profile: PolicyProfile::Extended,
            ..Default::default()
        };
        config.to_yaml_file(&path).unwrap();
        assert_eq!(EngineConfig::from_yaml_file(&path).unwrap(), config);
    }
}

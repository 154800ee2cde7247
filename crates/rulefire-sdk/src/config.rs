//! Release configuration
//!
//! Identifies which knowledge release the engine builds its container from.
//! Values come from an optional `config/rules.{yaml,toml,json}` file and
//! `RULES_*` environment variables (`RULES_GROUP_ID`, `RULES_ARTIFACT_ID`,
//! `RULES_VERSION`, `RULES_SCAN_INTERVAL_MS`), with `.env` loaded first.

use crate::error::{Result, RulesError};
use rulefire_core::ReleaseId;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_scan_interval_ms() -> u64 {
    10_000
}

/// Release coordinates plus the scanner interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub group_id: String,

    #[serde(default)]
    pub artifact_id: String,

    #[serde(default)]
    pub version: String,

    /// Interval for polling new releases; reported only, no scanner runs
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
}

impl ReleaseConfig {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            scan_interval_ms: default_scan_interval_ms(),
        }
    }

    pub fn with_scan_interval_ms(mut self, interval: u64) -> Self {
        self.scan_interval_ms = interval;
        self
    }

    /// Load from `.env`, `config/rules` and `RULES_*` environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/rules").required(false))
            .add_source(config::Environment::with_prefix("RULES"))
            .build()
            .map_err(|e| {
                RulesError::Configuration(format!("Failed to read rules config: {}", e))
            })?;

        Self::deserialize_from(settings)
    }

    /// Load from one explicit file; the format follows the file extension
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| {
                RulesError::Configuration(format!(
                    "Failed to read rules config {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Self::deserialize_from(settings)
    }

    fn deserialize_from(settings: config::Config) -> Result<Self> {
        // A YAML `version: 1.0` arrives as a float and would stringify as "1"
        for key in ["group_id", "artifact_id", "version"] {
            if let Ok(value) = settings.get::<config::Value>(key) {
                if !matches!(value.kind, config::ValueKind::String(_)) {
                    return Err(RulesError::Configuration(format!(
                        "Release identifier '{}' must be a string, got {:?}; quote it in the config file",
                        key, value.kind
                    )));
                }
            }
        }

        let config: Self = settings.try_deserialize().map_err(|e| {
            RulesError::Configuration(format!("Failed to deserialize rules config: {}", e))
        })?;
        tracing::debug!(
            "Loaded release config {}:{}:{} (scan interval {} ms)",
            config.group_id,
            config.artifact_id,
            config.version,
            config.scan_interval_ms
        );
        Ok(config)
    }

    /// Release coordinates; fails naming every missing identifier
    pub fn release_id(&self) -> Result<ReleaseId> {
        let missing: Vec<&str> = [
            ("group_id", &self.group_id),
            ("artifact_id", &self.artifact_id),
            ("version", &self.version),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            tracing::error!(
                "Not able to build the container. Missing mandatory details: {}",
                missing.join(", ")
            );
            return Err(RulesError::Configuration(format!(
                "Not able to build the container. Missing mandatory details: {}",
                missing.join(", ")
            )));
        }

        Ok(ReleaseId::new(
            self.group_id.trim(),
            self.artifact_id.trim(),
            self.version.trim(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_release_id() {
        let config = ReleaseConfig::new("com.acme", "pricing-rules", "1.2.0");
        let id = config.release_id().unwrap();

        assert_eq!(id.to_string(), "com.acme:pricing-rules:1.2.0");
        assert_eq!(config.scan_interval_ms, 10_000);
    }

    #[test]
    fn test_missing_identifiers_are_named() {
        let config = ReleaseConfig::new("com.acme", " ", "");

        match config.release_id() {
            Err(RulesError::Configuration(message)) => {
                assert!(message.contains("artifact_id"));
                assert!(message.contains("version"));
                assert!(!message.contains("group_id"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "group_id: com.acme\nartifact_id: pricing-rules\nversion: 2.0.0\nscan_interval_ms: 500"
        )
        .unwrap();

        let config = ReleaseConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config,
            ReleaseConfig::new("com.acme", "pricing-rules", "2.0.0").with_scan_interval_ms(500)
        );
    }

    #[test]
    fn test_load_from_json_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"group_id": "com.acme"}}"#).unwrap();

        let config = ReleaseConfig::load_from(file.path()).unwrap();
        assert_eq!(config.group_id, "com.acme");
        assert!(config.artifact_id.is_empty());
        assert_eq!(config.scan_interval_ms, 10_000);
        assert!(config.release_id().is_err());
    }

    #[test]
    fn test_serializes_with_config_keys() {
        let config = ReleaseConfig::new("com.acme", "pricing-rules", "1.0.0");
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["group_id"], "com.acme");
        assert_eq!(json["scan_interval_ms"], 10_000);
    }

    #[test]
    fn test_load_keeps_env_identifiers_verbatim() {
        std::env::set_var("RULES_GROUP_ID", "com.acme");
        std::env::set_var("RULES_ARTIFACT_ID", "pricing-rules");
        std::env::set_var("RULES_VERSION", "2.10");
        std::env::set_var("RULES_SCAN_INTERVAL_MS", "250");

        let loaded = ReleaseConfig::load();

        for key in [
            "RULES_GROUP_ID",
            "RULES_ARTIFACT_ID",
            "RULES_VERSION",
            "RULES_SCAN_INTERVAL_MS",
        ] {
            std::env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.version, "2.10");
        assert_eq!(config.scan_interval_ms, 250);
        assert_eq!(
            config.release_id().unwrap().to_string(),
            "com.acme:pricing-rules:2.10"
        );
    }

    #[test]
    fn test_unquoted_numeric_version_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "group_id: com.acme\nartifact_id: pricing-rules\nversion: 1.0").unwrap();

        match ReleaseConfig::load_from(file.path()) {
            Err(RulesError::Configuration(message)) => assert!(message.contains("'version'")),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut quoted = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            quoted,
            "group_id: com.acme\nartifact_id: pricing-rules\nversion: \"1.0\""
        )
        .unwrap();
        assert_eq!(ReleaseConfig::load_from(quoted.path()).unwrap().version, "1.0");
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = ReleaseConfig::load_from("/nonexistent/rules.yaml");
        assert!(matches!(result, Err(RulesError::Configuration(_))));
    }
}

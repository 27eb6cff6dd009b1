// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates structural constraints that cannot be expressed via serde
//! attributes. Backend-specific required fields are checked later by each
//! adapter's `validate`, so that a health test reports them.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::TetherConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.health.stale_after_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "health.stale_after_secs must be at least 1".to_string(),
        });
    }

    if config.health.ping_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "health.ping_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.pool.max_open == 0 {
        errors.push(ConfigError::Validation {
            message: "pool.max_open must be at least 1".to_string(),
        });
    }

    // Adapter names are registry keys
    for (i, adapter) in config.adapters.iter().enumerate() {
        if adapter.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("adapters[{i}].name must not be empty"),
            });
        }
    }

    let mut seen_names = HashSet::new();
    for adapter in &config.adapters {
        let name = adapter.name.trim();
        if !name.is_empty() && !seen_names.insert(name) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate adapter name `{name}` in [[adapters]] array"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AdapterConfig;
    use tether_core::AdapterKind;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = TetherConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_adapter_name_fails_validation() {
        let mut config = TetherConfig::default();
        config.adapters = vec![AdapterConfig::new("  ", AdapterKind::Postgres)];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "adapters[0].name"));
    }

    #[test]
    fn duplicate_adapter_names_fail_validation() {
        let mut config = TetherConfig::default();
        config.adapters = vec![
            AdapterConfig::new("hr", AdapterKind::Postgres),
            AdapterConfig::new("hr", AdapterKind::Oracle),
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate adapter name `hr`"));
    }

    #[test]
    fn zero_durations_and_capacity_fail_validation() {
        let mut config = TetherConfig::default();
        config.health.stale_after_secs = 0;
        config.health.ping_timeout_secs = 0;
        config.pool.max_open = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "all errors are collected");
        assert!(has_message(&errors, "stale_after_secs"));
        assert!(has_message(&errors, "ping_timeout_secs"));
        assert!(has_message(&errors, "max_open"));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = TetherConfig::default();
        config.log.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log.level"));
    }

    #[test]
    fn missing_backend_fields_are_left_to_the_adapter() {
        let mut config = TetherConfig::default();
        // An oracle entry without a service name still loads; the adapter's
        // validate reports it.
        config.adapters = vec![AdapterConfig::new("erp", AdapterKind::Oracle)];
        assert!(validate_config(&config).is_ok());
    }
}

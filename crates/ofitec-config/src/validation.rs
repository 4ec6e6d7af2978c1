// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::OfitecConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &OfitecConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.bind_address `{}` is not a valid socket address",
                config.gateway.bind_address
            ),
        });
    }

    if config.notify.rate_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "notify.rate_limit must be at least 1".to_string(),
        });
    }

    if config.engine.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.retention_days must be at least 1".to_string(),
        });
    }

    if config.engine.reminder_batch == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.reminder_batch must be at least 1".to_string(),
        });
    }

    if config.whatsapp.enabled {
        if config.whatsapp.phone_number_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "whatsapp.phone_number_id is required when whatsapp.enabled".to_string(),
            });
        }
        if config.whatsapp.access_token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "whatsapp.access_token is required when whatsapp.enabled".to_string(),
            });
        }
        if config.whatsapp.api_version.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "whatsapp.api_version must not be empty".to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OfitecConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn enabled_whatsapp_requires_credentials() {
        let config: OfitecConfig = toml::from_str("[whatsapp]\nenabled = true").unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let config: OfitecConfig = toml::from_str("[notify]\nrate_limit = 0").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let config: OfitecConfig =
            toml::from_str("[gateway]\nbind_address = \"not an addr\"").unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn validation_collects_all_errors() {
        let config: OfitecConfig =
            toml::from_str("[notify]\nrate_limit = 0\n[engine]\nretention_days = 0").unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}

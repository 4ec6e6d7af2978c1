// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the OFITEC next-action engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level OFITEC configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OfitecConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Action generation and retention behavior.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Notification dispatch behavior.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// WhatsApp Business Cloud API credentials and webhook settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Webhook ingress settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "ofitec".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Action generation and retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Skip drafts whose source reference already has a pending action.
    ///
    /// Disable to reproduce the historical behavior where every analysis
    /// run creates fresh actions for still-unresolved conditions.
    #[serde(default = "default_true")]
    pub dedupe_pending: bool,

    /// Days a completed or cancelled action is kept before the retention
    /// sweep deletes it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Upper bound of actions handled per urgent-reminder sweep.
    #[serde(default = "default_reminder_batch")]
    pub reminder_batch: usize,

    /// Seconds between scheduled analysis/reminder runs in `serve`.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dedupe_pending: default_true(),
            retention_days: default_retention_days(),
            reminder_batch: default_reminder_batch(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> u32 {
    30
}

fn default_reminder_batch() -> usize {
    200
}

fn default_sweep_interval_secs() -> u64 {
    900
}

/// Notification dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Master switch for outbound notifications.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum outbound requests per fixed one-hour window.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_rate_limit() -> u32 {
    100
}

/// WhatsApp Business Cloud API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Whether the WhatsApp channel is active.
    #[serde(default)]
    pub enabled: bool,

    /// Friendly account label shown in status output.
    #[serde(default)]
    pub account_name: String,

    /// WhatsApp Business phone number id.
    #[serde(default)]
    pub phone_number_id: String,

    /// Graph API bearer token.
    #[serde(default)]
    pub access_token: String,

    /// App secret used to verify `X-Hub-Signature-256` on webhooks.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Token echoed during the webhook verification handshake.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// Graph API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Override for the Graph API origin; used in tests.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default template language code.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            account_name: String::new(),
            phone_number_id: String::new(),
            access_token: String::new(),
            app_secret: None,
            verify_token: None,
            api_version: default_api_version(),
            base_url: None,
            default_language: default_language(),
        }
    }
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "ofitec.db".to_string()
}

/// Webhook ingress configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address the webhook listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8085".to_string()
}

// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./ofitec.toml` > `~/.config/ofitec/ofitec.toml`
//! > `/etc/ofitec/ofitec.toml`, with environment variable overrides via the
//! `OFITEC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OfitecConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ofitec/ofitec.toml` (system-wide)
/// 3. `~/.config/ofitec/ofitec.toml` (user XDG config)
/// 4. `./ofitec.toml` (local directory)
/// 5. `OFITEC_*` environment variables
pub fn load_config() -> Result<OfitecConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OfitecConfig::default()))
        .merge(Toml::file("/etc/ofitec/ofitec.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("ofitec/ofitec.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("ofitec.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<OfitecConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OfitecConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OfitecConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OfitecConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `OFITEC_WHATSAPP_ACCESS_TOKEN` must map
/// to `whatsapp.access_token`, not `whatsapp.access.token`.
fn env_provider() -> Env {
    Env::prefixed("OFITEC_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: OFITEC_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("engine_", "engine.", 1)
            .replacen("notify_", "notify.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./propflow.toml` > `~/.config/propflow/propflow.toml`
//! > `/etc/propflow/propflow.toml` with environment variable overrides via
//! the `PROPFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PropflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults (the stock rule set)
/// 2. `/etc/propflow/propflow.toml` (system-wide)
/// 3. `~/.config/propflow/propflow.toml` (user XDG config)
/// 4. `./propflow.toml` (local directory)
/// 5. `PROPFLOW_*` environment variables
pub fn load_config() -> Result<PropflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PropflowConfig::default()))
        .merge(Toml::file("/etc/propflow/propflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("propflow/propflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("propflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PropflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PropflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PropflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PropflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay intact: `PROPFLOW_DISPATCH_MAX_ATTEMPTS` must map to
/// `dispatch.max_attempts`, not `dispatch.max.attempts`.
fn env_provider() -> Env {
    const SECTIONS: [(&str, &str); 7] = [
        ("scoring_budget_", "scoring.budget."),
        ("scoring_timeline_", "scoring.timeline."),
        ("scoring_financing_", "scoring.financing."),
        ("scoring_location_", "scoring.location."),
        ("scoring_engagement_", "scoring.engagement."),
        ("reminders_", "reminders."),
        ("dispatch_", "dispatch."),
    ];

    Env::prefixed("PROPFLOW_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: PROPFLOW_DISPATCH_MAX_ATTEMPTS -> "dispatch_max_attempts"
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|(prefix, section)| {
                key_str
                    .strip_prefix(prefix)
                    .map(|rest| format!("{section}{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Propflow lead engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides. The entire scoring rule set, the reminder offset
//! table, and all nurture sequence definitions are externally loadable, so
//! business tuning never requires a code change.
//!
//! # Usage
//!
//! ```no_run
//! use propflow_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("reminder slots: {}", config.reminders.offsets.len());
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod validation;

pub use error::{ConfigError, into_engine_error};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    DispatchConfig, PropflowConfig, ReminderConfig, ReminderOffset, ScoringConfig,
    SequenceConfig, StepConfig,
};
pub use validation::{validate_config, validate_scoring_config};

/// Load configuration from the XDG hierarchy and validate it.
///
/// The high-level entry point: loads TOML files + env vars via Figment, then
/// runs post-deserialization validation. Returns either a valid
/// [`PropflowConfig`] or every collected diagnostic.
pub fn load_and_validate() -> Result<PropflowConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(Box::new(err))]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PropflowConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Parse(Box::new(err))]),
    }
}

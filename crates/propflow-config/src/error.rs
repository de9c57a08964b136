// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error type.

use thiserror::Error;

/// An error produced while loading or validating configuration.
///
/// Configuration problems are fatal at startup, never at request time: the
/// engine refuses to construct from a config that fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parsing or figment extraction failed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    /// A semantic constraint was violated after deserialization.
    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl ConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::Validation {
            message: message.into(),
        }
    }
}

/// Join a batch of config errors into a single fatal engine error.
pub fn into_engine_error(errors: Vec<ConfigError>) -> propflow_core::PropflowError {
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    propflow_core::PropflowError::Config(joined)
}

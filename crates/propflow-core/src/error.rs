// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Propflow lead engine.

use thiserror::Error;

/// The primary error type used across all Propflow crates.
#[derive(Debug, Error)]
pub enum PropflowError {
    /// The requested schedule is impossible (past time, non-positive duration).
    #[error("invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    /// A lead, appointment, or sequence id was not found.
    #[error("not found: {entity} `{id}`")]
    NotFound { entity: &'static str, id: String },

    /// An outbound channel call failed. Always recoverable: callers log and
    /// retry, scheduling state is never rolled back on dispatch failure.
    #[error("dispatch failed: {message}")]
    Dispatch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed scoring rules or sequence definitions. Fatal at load time,
    /// never raised while serving requests.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PropflowError {
    /// Shorthand for a dispatch failure without an underlying source error.
    pub fn dispatch(message: impl Into<String>) -> Self {
        PropflowError::Dispatch {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the caller may retry the failed operation.
    ///
    /// Only dispatch failures are recoverable; validation and configuration
    /// errors will fail the same way on every attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PropflowError::Dispatch { .. })
    }
}

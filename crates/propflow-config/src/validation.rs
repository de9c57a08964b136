// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: weight sums, positive offsets, well-formed sequence tables.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::model::{PropflowConfig, ScoringConfig};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PropflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_scoring(&config.scoring, &mut errors);

    // Reminder offsets must be strictly positive; a zero offset would fire
    // at the appointment itself, violating the fire-before-scheduled invariant.
    if config.reminders.offsets.is_empty() {
        errors.push(ConfigError::validation(
            "reminders.offsets must contain at least one slot",
        ));
    }
    for (i, offset) in config.reminders.offsets.iter().enumerate() {
        if offset.minutes_before == 0 {
            errors.push(ConfigError::validation(format!(
                "reminders.offsets[{i}].minutes_before must be positive"
            )));
        }
    }

    if config.dispatch.max_attempts == 0 {
        errors.push(ConfigError::validation(
            "dispatch.max_attempts must be at least 1",
        ));
    }
    if config.dispatch.send_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "dispatch.send_timeout_secs must be at least 1",
        ));
    }
    if config.dispatch.worker_limit == 0 {
        errors.push(ConfigError::validation(
            "dispatch.worker_limit must be at least 1",
        ));
    }

    // Sequence ids must be unique; ties on trigger_score are resolved by
    // definition order, so duplicate ids would make runs ambiguous.
    let mut seen_ids = HashSet::new();
    for (i, seq) in config.sequences.iter().enumerate() {
        if seq.id.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "sequences[{i}].id must not be empty"
            )));
        }
        if !seen_ids.insert(&seq.id) {
            errors.push(ConfigError::validation(format!(
                "duplicate sequence id `{}` in [[sequences]] array",
                seq.id
            )));
        }
        if seq.trigger_score > 100 {
            errors.push(ConfigError::validation(format!(
                "sequences[{i}].trigger_score must be at most 100, got {}",
                seq.trigger_score
            )));
        }
        if seq.steps.is_empty() {
            errors.push(ConfigError::validation(format!(
                "sequences[{i}] (`{}`) must have at least one step",
                seq.id
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate the scoring section alone.
///
/// Also used by the runtime `update_scoring_rules` path, where a bad rule
/// set must be rejected before the snapshot swap.
pub fn validate_scoring_config(scoring: &ScoringConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    validate_scoring(scoring, &mut errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_scoring(scoring: &ScoringConfig, errors: &mut Vec<ConfigError>) {
    let weights = [
        ("scoring.budget.weight", scoring.budget.weight),
        ("scoring.timeline.weight", scoring.timeline.weight),
        ("scoring.financing.weight", scoring.financing.weight),
        ("scoring.location.weight", scoring.location.weight),
        ("scoring.engagement.weight", scoring.engagement.weight),
    ];
    for (name, weight) in weights {
        if !(0.0..=1.0).contains(&weight) {
            errors.push(ConfigError::validation(format!(
                "{name} must be within [0.0, 1.0], got {weight}"
            )));
        }
    }

    let sum = scoring.weight_sum();
    if (sum - 1.0).abs() > 1e-6 {
        errors.push(ConfigError::validation(format!(
            "scoring factor weights must sum to 1.0, got {sum}"
        )));
    }

    if scoring.budget.medium_min >= scoring.budget.high_min {
        errors.push(ConfigError::validation(format!(
            "scoring.budget.medium_min ({}) must be below high_min ({})",
            scoring.budget.medium_min, scoring.budget.high_min
        )));
    }
}

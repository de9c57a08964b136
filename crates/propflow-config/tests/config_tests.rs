// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Propflow configuration system.

use propflow_config::model::PropflowConfig;
use propflow_config::{load_and_validate_str, load_config_from_path, load_config_from_str};
use propflow_core::types::Channel;

/// Valid TOML overriding several sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_propflow_config() {
    let toml = r#"
[scoring.budget]
weight = 0.30
high_min = 750000
medium_min = 400000

[scoring.timeline]
weight = 0.25
immediate = 100

[dispatch]
max_attempts = 5
send_timeout_secs = 3
worker_limit = 4

[[reminders.offsets]]
minutes_before = 2880
channel = "email"

[[reminders.offsets]]
minutes_before = 60
channel = "sms"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.scoring.budget.high_min, 750_000);
    assert_eq!(config.scoring.budget.medium_min, 400_000);
    assert_eq!(config.dispatch.max_attempts, 5);
    assert_eq!(config.dispatch.send_timeout_secs, 3);
    assert_eq!(config.dispatch.worker_limit, 4);
    assert_eq!(config.reminders.offsets.len(), 2);
    assert_eq!(config.reminders.offsets[0].minutes_before, 2880);
    assert_eq!(config.reminders.offsets[1].channel, Channel::Sms);
    // Untouched sections keep their stock defaults.
    assert_eq!(config.scoring.financing.pre_approved, 100);
    assert_eq!(config.sequences.len(), 3);
}

/// Unknown field in [scoring.budget] is rejected outright.
#[test]
fn unknown_field_produces_error() {
    let toml = r#"
[scoring.budget]
wieght = 0.3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("wieght"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Empty TOML yields the complete stock rule set.
#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty config should use defaults");
    assert!((config.scoring.weight_sum() - 1.0).abs() < 1e-9);
    assert_eq!(config.reminders.offsets.len(), 3);
    assert_eq!(config.sequences.len(), 3);
    assert_eq!(config.sequences[0].trigger_score, 80);
}

/// Custom sequence tables fully replace the stock ones.
#[test]
fn custom_sequences_replace_defaults() {
    let toml = r#"
[[sequences]]
id = "vip_sequence"
name = "VIP Outreach"
trigger_score = 90

[[sequences.steps]]
delay_hours = 1
channel = "call"
template_id = "immediate_call"
fallback_content = "Call the VIP"
"#;

    let config = load_and_validate_str(toml).expect("custom sequence should validate");
    assert_eq!(config.sequences.len(), 1);
    assert_eq!(config.sequences[0].id, "vip_sequence");
    assert_eq!(config.sequences[0].steps[0].channel, Channel::Call);
    assert!(config.sequences[0].active, "active defaults to true");
}

/// Validation failures surface through load_and_validate_str.
#[test]
fn bad_weights_fail_validation() {
    let toml = r#"
[scoring.engagement]
weight = 0.5
"#;

    let errors = load_and_validate_str(toml).expect_err("weights no longer sum to 1.0");
    assert!(
        errors.iter().any(|e| e.to_string().contains("sum to 1.0")),
        "expected weight-sum diagnostic, got {errors:?}"
    );
}

/// A config file on disk loads through the path-based loader.
#[test]
fn loads_from_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("propflow.toml");
    std::fs::write(
        &path,
        r#"
[dispatch]
worker_limit = 2
"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).expect("file should load");
    assert_eq!(config.dispatch.worker_limit, 2);
}

/// Serialize-deserialize round trip preserves the default config.
#[test]
fn default_config_round_trips_through_toml() {
    let config = PropflowConfig::default();
    let serialized = toml::to_string(&config).expect("defaults serialize");
    let reloaded = load_config_from_str(&serialized).expect("serialized defaults reload");
    assert_eq!(reloaded.sequences, config.sequences);
    assert_eq!(reloaded.reminders.offsets, config.reminders.offsets);
}

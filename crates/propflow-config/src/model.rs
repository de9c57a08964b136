// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Propflow lead engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Defaults reproduce the stock rule set: scoring
//! weights and thresholds, the 24h/2h/30m reminder offset table, and the
//! three built-in nurture sequences.

use propflow_core::types::{Channel, NurtureSequence, NurtureStep, SequenceId};
use serde::{Deserialize, Serialize};

/// Top-level Propflow configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to the stock
/// rule set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropflowConfig {
    /// Scoring weights and per-factor thresholds.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Appointment reminder offset table.
    #[serde(default)]
    pub reminders: ReminderConfig,

    /// Timer loop and outbound dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Nurture sequence definitions, in definition (tie-break) order.
    #[serde(default = "default_sequences")]
    pub sequences: Vec<SequenceConfig>,
}

impl Default for PropflowConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            reminders: ReminderConfig::default(),
            dispatch: DispatchConfig::default(),
            sequences: default_sequences(),
        }
    }
}

/// Scoring weights and thresholds. Weights must sum to 1.0.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default)]
    pub budget: BudgetRules,
    #[serde(default)]
    pub timeline: TimelineRules,
    #[serde(default)]
    pub financing: FinancingRules,
    #[serde(default)]
    pub location: LocationRules,
    #[serde(default)]
    pub engagement: EngagementRules,
}

impl ScoringConfig {
    /// Sum of all five factor weights. Must be 1.0 for the score to
    /// normalize to the 0-100 scale.
    pub fn weight_sum(&self) -> f64 {
        self.budget.weight
            + self.timeline.weight
            + self.financing.weight
            + self.location.weight
            + self.engagement.weight
    }
}

/// Budget factor: tiered on the upper bound of the lead's budget range.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetRules {
    #[serde(default = "default_budget_weight")]
    pub weight: f64,
    /// At or above this amount scores `high_score`.
    #[serde(default = "default_budget_high_min")]
    pub high_min: u64,
    #[serde(default = "default_score_100")]
    pub high_score: u8,
    /// Within [`medium_min`, `high_min`) scores `medium_score`.
    #[serde(default = "default_budget_medium_min")]
    pub medium_min: u64,
    #[serde(default = "default_score_70")]
    pub medium_score: u8,
    /// Below `medium_min` scores `low_score`. No budget at all scores 0.
    #[serde(default = "default_score_40")]
    pub low_score: u8,
}

impl Default for BudgetRules {
    fn default() -> Self {
        Self {
            weight: default_budget_weight(),
            high_min: default_budget_high_min(),
            high_score: default_score_100(),
            medium_min: default_budget_medium_min(),
            medium_score: default_score_70(),
            low_score: default_score_40(),
        }
    }
}

/// Timeline factor: per-bucket scores, one field per [`Timeline`] variant.
///
/// [`Timeline`]: propflow_core::types::Timeline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineRules {
    #[serde(default = "default_timeline_weight")]
    pub weight: f64,
    #[serde(default = "default_score_100")]
    pub immediate: u8,
    #[serde(default = "default_score_70")]
    pub three_months: u8,
    #[serde(default = "default_score_40")]
    pub six_months: u8,
    #[serde(default = "default_score_20")]
    pub one_year: u8,
}

impl Default for TimelineRules {
    fn default() -> Self {
        Self {
            weight: default_timeline_weight(),
            immediate: default_score_100(),
            three_months: default_score_70(),
            six_months: default_score_40(),
            one_year: default_score_20(),
        }
    }
}

/// Financing factor: per-status scores, one field per [`FinancingStatus`] variant.
///
/// [`FinancingStatus`]: propflow_core::types::FinancingStatus
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FinancingRules {
    #[serde(default = "default_financing_weight")]
    pub weight: f64,
    #[serde(default = "default_score_100")]
    pub pre_approved: u8,
    #[serde(default = "default_score_70")]
    pub pre_qualified: u8,
    #[serde(default = "default_score_40")]
    pub exploring: u8,
    #[serde(default = "default_score_10")]
    pub not_started: u8,
}

impl Default for FinancingRules {
    fn default() -> Self {
        Self {
            weight: default_financing_weight(),
            pre_approved: default_score_100(),
            pre_qualified: default_score_70(),
            exploring: default_score_40(),
            not_started: default_score_10(),
        }
    }
}

/// Location-specificity factor: per-bucket scores for the string heuristic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocationRules {
    #[serde(default = "default_location_weight")]
    pub weight: f64,
    #[serde(default = "default_score_100")]
    pub exact_address: u8,
    #[serde(default = "default_score_80")]
    pub neighborhood: u8,
    #[serde(default = "default_score_50")]
    pub city: u8,
    #[serde(default = "default_score_20")]
    pub region: u8,
    /// Multi-word locations longer than this many characters classify as
    /// region rather than city.
    #[serde(default = "default_city_max_len")]
    pub city_max_len: usize,
}

impl Default for LocationRules {
    fn default() -> Self {
        Self {
            weight: default_location_weight(),
            exact_address: default_score_100(),
            neighborhood: default_score_80(),
            city: default_score_50(),
            region: default_score_20(),
            city_max_len: default_city_max_len(),
        }
    }
}

/// Engagement factor: all-or-nothing threshold bonuses summed together.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngagementRules {
    #[serde(default = "default_engagement_weight")]
    pub weight: f64,
    #[serde(default = "default_message_threshold")]
    pub message_count_threshold: usize,
    #[serde(default = "default_score_30")]
    pub message_count_score: u8,
    #[serde(default = "default_questions_threshold")]
    pub questions_threshold: usize,
    #[serde(default = "default_score_40")]
    pub questions_score: u8,
    #[serde(default = "default_views_threshold")]
    pub property_views_threshold: usize,
    #[serde(default = "default_score_30")]
    pub property_views_score: u8,
}

impl Default for EngagementRules {
    fn default() -> Self {
        Self {
            weight: default_engagement_weight(),
            message_count_threshold: default_message_threshold(),
            message_count_score: default_score_30(),
            questions_threshold: default_questions_threshold(),
            questions_score: default_score_40(),
            property_views_threshold: default_views_threshold(),
            property_views_score: default_score_30(),
        }
    }
}

/// One reminder slot: fire `minutes_before` the appointment on `channel`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReminderOffset {
    pub minutes_before: u32,
    pub channel: Channel,
}

/// Appointment reminder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReminderConfig {
    /// Offset table, largest offset first. Slots already in the past at
    /// booking time are omitted, not scheduled late.
    #[serde(default = "default_reminder_offsets")]
    pub offsets: Vec<ReminderOffset>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            offsets: default_reminder_offsets(),
        }
    }
}

/// Timer loop and outbound dispatch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Attempts before a work item is marked dead instead of retried.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-send timeout in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    /// Maximum concurrent outbound sends per tick.
    #[serde(default = "default_worker_limit")]
    pub worker_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            send_timeout_secs: default_send_timeout_secs(),
            worker_limit: default_worker_limit(),
        }
    }
}

/// One nurture sequence definition as it appears in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    pub id: String,
    pub name: String,
    pub trigger_score: u8,
    #[serde(default = "default_true")]
    pub active: bool,
    pub steps: Vec<StepConfig>,
}

/// One step inside a sequence definition.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub delay_hours: u32,
    pub channel: Channel,
    pub template_id: String,
    pub fallback_content: String,
}

impl From<&SequenceConfig> for NurtureSequence {
    fn from(cfg: &SequenceConfig) -> Self {
        NurtureSequence {
            id: SequenceId(cfg.id.clone()),
            name: cfg.name.clone(),
            trigger_score: cfg.trigger_score,
            active: cfg.active,
            steps: cfg
                .steps
                .iter()
                .map(|s| NurtureStep {
                    delay_hours: s.delay_hours,
                    channel: s.channel,
                    template_id: s.template_id.clone(),
                    fallback_content: s.fallback_content.clone(),
                })
                .collect(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_budget_weight() -> f64 {
    0.30
}
fn default_timeline_weight() -> f64 {
    0.25
}
fn default_financing_weight() -> f64 {
    0.20
}
fn default_location_weight() -> f64 {
    0.15
}
fn default_engagement_weight() -> f64 {
    0.10
}
fn default_budget_high_min() -> u64 {
    500_000
}
fn default_budget_medium_min() -> u64 {
    300_000
}
fn default_city_max_len() -> usize {
    15
}
fn default_message_threshold() -> usize {
    5
}
fn default_questions_threshold() -> usize {
    3
}
fn default_views_threshold() -> usize {
    5
}
fn default_max_attempts() -> u32 {
    3
}
fn default_send_timeout_secs() -> u64 {
    5
}
fn default_worker_limit() -> usize {
    8
}
fn default_score_10() -> u8 {
    10
}
fn default_score_20() -> u8 {
    20
}
fn default_score_30() -> u8 {
    30
}
fn default_score_40() -> u8 {
    40
}
fn default_score_50() -> u8 {
    50
}
fn default_score_70() -> u8 {
    70
}
fn default_score_80() -> u8 {
    80
}
fn default_score_100() -> u8 {
    100
}

fn default_reminder_offsets() -> Vec<ReminderOffset> {
    vec![
        ReminderOffset {
            minutes_before: 24 * 60,
            channel: Channel::Email,
        },
        ReminderOffset {
            minutes_before: 2 * 60,
            channel: Channel::Sms,
        },
        ReminderOffset {
            minutes_before: 30,
            channel: Channel::Push,
        },
    ]
}

/// The three stock nurture sequences, highest tier first.
fn default_sequences() -> Vec<SequenceConfig> {
    fn step(
        delay_hours: u32,
        channel: Channel,
        template_id: &str,
        fallback_content: &str,
    ) -> StepConfig {
        StepConfig {
            delay_hours,
            channel,
            template_id: template_id.to_string(),
            fallback_content: fallback_content.to_string(),
        }
    }

    vec![
        SequenceConfig {
            id: "hot_lead_sequence".to_string(),
            name: "Hot Lead Follow-up".to_string(),
            trigger_score: 80,
            active: true,
            steps: vec![
                step(
                    0,
                    Channel::Call,
                    "immediate_call",
                    "Call immediately to capitalize on high interest",
                ),
                step(
                    2,
                    Channel::Email,
                    "personalized_properties",
                    "Send personalized property recommendations",
                ),
                step(
                    24,
                    Channel::Sms,
                    "viewing_reminder",
                    "Remind about scheduled viewing or offer to schedule",
                ),
            ],
        },
        SequenceConfig {
            id: "warm_lead_sequence".to_string(),
            name: "Warm Lead Nurture".to_string(),
            trigger_score: 60,
            active: true,
            steps: vec![
                step(
                    2,
                    Channel::Email,
                    "welcome_series",
                    "Welcome email with market insights",
                ),
                step(
                    24,
                    Channel::Email,
                    "property_recommendations",
                    "Curated property recommendations",
                ),
                step(
                    72,
                    Channel::Call,
                    "follow_up_call",
                    "Follow-up call to answer questions",
                ),
                step(
                    168,
                    Channel::Email,
                    "market_update",
                    "Weekly market update and new listings",
                ),
            ],
        },
        SequenceConfig {
            id: "cool_lead_sequence".to_string(),
            name: "Cool Lead Nurture".to_string(),
            trigger_score: 40,
            active: true,
            steps: vec![
                step(
                    24,
                    Channel::Email,
                    "educational_content",
                    "Educational content about home buying process",
                ),
                step(
                    168,
                    Channel::Email,
                    "market_insights",
                    "Market insights and trends",
                ),
                step(
                    336,
                    Channel::Email,
                    "success_stories",
                    "Customer success stories and testimonials",
                ),
                step(
                    504,
                    Channel::Email,
                    "re_engagement",
                    "Re-engagement offer with special incentives",
                ),
            ],
        },
    ]
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-factor scoring functions.
//!
//! Each factor scores 0-100 independently before weighting. Missing data
//! degrades to the factor's lowest sub-score; nothing here can fail.

use propflow_config::model::{
    BudgetRules, EngagementRules, FinancingRules, LocationRules, TimelineRules,
};
use propflow_core::types::{BudgetRange, FinancingStatus, Interaction, Timeline};

/// How specific a preferred-location string is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationClass {
    ExactAddress,
    Neighborhood,
    City,
    Region,
}

/// Classifies a preferred-location string by specificity.
///
/// The default implementation is a string heuristic inherited from the
/// original rule set; it is isolated behind this trait so a geocoding-backed
/// classifier can replace it without touching the scoring weights.
pub trait LocationClassifier {
    fn classify(&self, location: &str) -> LocationClass;
}

/// String-sniffing classifier: commas look like street addresses, spaceless
/// strings look like neighborhoods, and everything else splits on length.
///
/// Known to be fragile ("St. Kilda, Melbourne" is not a street address); kept
/// bucket-for-bucket for compatibility with existing scores.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicClassifier {
    /// Multi-word strings longer than this classify as region, not city.
    pub city_max_len: usize,
}

impl From<&LocationRules> for HeuristicClassifier {
    fn from(rules: &LocationRules) -> Self {
        Self {
            city_max_len: rules.city_max_len,
        }
    }
}

impl LocationClassifier for HeuristicClassifier {
    fn classify(&self, location: &str) -> LocationClass {
        if location.contains(',') {
            LocationClass::ExactAddress
        } else if location.contains("neighborhood") || !location.contains(' ') {
            LocationClass::Neighborhood
        } else if location.len() > self.city_max_len {
            LocationClass::Region
        } else {
            LocationClass::City
        }
    }
}

/// Budget factor: tiered on the upper bound of the budget range, falling
/// back to the lower bound when no upper bound was captured.
pub fn budget_score(budget: Option<&BudgetRange>, rules: &BudgetRules) -> u8 {
    let Some(range) = budget else { return 0 };
    let amount = if range.max > 0 { range.max } else { range.min };
    if amount >= rules.high_min {
        rules.high_score
    } else if amount >= rules.medium_min {
        rules.medium_score
    } else {
        rules.low_score
    }
}

/// Timeline factor: total mapping over the closed bucket enum.
pub fn timeline_score(timeline: Option<Timeline>, rules: &TimelineRules) -> u8 {
    match timeline {
        Some(Timeline::Immediate) => rules.immediate,
        Some(Timeline::ThreeMonths) => rules.three_months,
        Some(Timeline::SixMonths) => rules.six_months,
        Some(Timeline::OneYear) => rules.one_year,
        None => 0,
    }
}

/// Financing factor: total mapping over the closed status enum.
pub fn financing_score(financing: Option<FinancingStatus>, rules: &FinancingRules) -> u8 {
    match financing {
        Some(FinancingStatus::PreApproved) => rules.pre_approved,
        Some(FinancingStatus::PreQualified) => rules.pre_qualified,
        Some(FinancingStatus::Exploring) => rules.exploring,
        Some(FinancingStatus::NotStarted) => rules.not_started,
        None => 0,
    }
}

/// Location factor: classifies the first (most specific) preferred location.
pub fn location_score(
    locations: &[String],
    rules: &LocationRules,
    classifier: &dyn LocationClassifier,
) -> u8 {
    let Some(first) = locations.first() else {
        return 0;
    };
    match classifier.classify(first) {
        LocationClass::ExactAddress => rules.exact_address,
        LocationClass::Neighborhood => rules.neighborhood,
        LocationClass::City => rules.city,
        LocationClass::Region => rules.region,
    }
}

/// Engagement factor: sum of all-or-nothing threshold bonuses. Each bonus is
/// a step function, never prorated.
pub fn engagement_score(history: &[Interaction], rules: &EngagementRules) -> u8 {
    let mut score: u32 = 0;

    if history.len() >= rules.message_count_threshold {
        score += u32::from(rules.message_count_score);
    }

    let questions = history
        .iter()
        .filter(|i| i.intent.as_deref().is_some_and(|s| s.contains("question")))
        .count();
    if questions >= rules.questions_threshold {
        score += u32::from(rules.questions_score);
    }

    let views = history
        .iter()
        .filter(|i| {
            i.action
                .as_deref()
                .is_some_and(|s| s.contains("view_property"))
        })
        .count();
    if views >= rules.property_views_threshold {
        score += u32::from(rules.property_views_score);
    }

    score.min(100) as u8
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scoring engine: a pure function of lead attributes and interaction
//! history, with an atomically swappable rule snapshot.
//!
//! Rules are held in an [`ArcSwap`] so an administrative update replaces the
//! whole set in one step; an in-flight scoring call keeps the snapshot it
//! loaded and never observes a half-updated rule set.

use arc_swap::ArcSwap;
use std::sync::Arc;

use propflow_config::model::ScoringConfig;
use propflow_config::validation::validate_scoring_config;
use propflow_core::error::PropflowError;
use propflow_core::types::{Interaction, Lead};
use tracing::info;

use crate::factors::{
    HeuristicClassifier, LocationClassifier, budget_score, engagement_score,
    financing_score, location_score, timeline_score,
};
use crate::recommendation::{Recommendation, recommend};

/// Deterministic lead scorer. No I/O, no time dependency beyond the data
/// given; safe to call concurrently for different leads.
pub struct ScoringEngine {
    rules: ArcSwap<ScoringConfig>,
    /// Replacement for the stock location heuristic, if one was injected.
    classifier: Option<Box<dyn LocationClassifier + Send + Sync>>,
}

impl ScoringEngine {
    /// Create an engine from a validated scoring configuration.
    pub fn new(rules: ScoringConfig) -> Self {
        Self {
            rules: ArcSwap::from_pointee(rules),
            classifier: None,
        }
    }

    /// Replace the location heuristic with a custom classifier (e.g. one
    /// backed by real geocoding).
    pub fn with_classifier(
        mut self,
        classifier: Box<dyn LocationClassifier + Send + Sync>,
    ) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Compute the 0-100 score for a lead against its interaction history.
    ///
    /// Never errors: missing fields degrade to the lowest sub-score for
    /// their factor.
    pub fn score(&self, lead: &Lead, history: &[Interaction]) -> u8 {
        let rules = self.rules.load();
        let heuristic = HeuristicClassifier::from(&rules.location);
        let classifier: &dyn LocationClassifier = match &self.classifier {
            Some(custom) => custom.as_ref(),
            None => &heuristic,
        };

        let weighted = [
            (
                f64::from(budget_score(lead.budget.as_ref(), &rules.budget)),
                rules.budget.weight,
            ),
            (
                f64::from(timeline_score(lead.timeline, &rules.timeline)),
                rules.timeline.weight,
            ),
            (
                f64::from(financing_score(lead.financing, &rules.financing)),
                rules.financing.weight,
            ),
            (
                f64::from(location_score(
                    &lead.preferred_locations,
                    &rules.location,
                    classifier,
                )),
                rules.location.weight,
            ),
            (
                f64::from(engagement_score(history, &rules.engagement)),
                rules.engagement.weight,
            ),
        ];

        let total: f64 = weighted.iter().map(|(score, weight)| score * weight).sum();
        let max_possible: f64 = weighted.iter().map(|(_, weight)| 100.0 * weight).sum();
        if max_possible <= 0.0 {
            return 0;
        }

        // Normalize to the 0-100 scale.
        ((total / max_possible) * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Score a lead and attach the tier recommendation.
    pub fn evaluate(&self, lead: &Lead, history: &[Interaction]) -> (u8, Recommendation) {
        let score = self.score(lead, history);
        (score, recommend(score))
    }

    /// Atomically replace the scoring rules.
    ///
    /// The new rule set is validated first; a rejected update leaves the
    /// current snapshot untouched.
    pub fn update_rules(&self, rules: ScoringConfig) -> Result<(), PropflowError> {
        validate_scoring_config(&rules).map_err(propflow_config::into_engine_error)?;
        self.rules.store(Arc::new(rules));
        info!("scoring rules snapshot replaced");
        Ok(())
    }

    /// The current rule snapshot.
    pub fn rules(&self) -> Arc<ScoringConfig> {
        self.rules.load_full()
    }
}

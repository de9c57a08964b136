// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead scoring for the Propflow engine.
//!
//! `score(lead, history)` is a deterministic weighted sum of five factors
//! (budget, timeline, financing, location specificity, engagement), each
//! normalized to 0-100 before weighting. [`recommend`] maps the final score
//! to one of four priority tiers with fixed operator guidance.

pub mod engine;
pub mod factors;
pub mod recommendation;

pub use engine::ScoringEngine;
pub use factors::{HeuristicClassifier, LocationClass, LocationClassifier};
pub use recommendation::{FollowupAction, Priority, Recommendation, recommend};

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score-to-priority tier mapping.
//!
//! The four tiers partition [0, 100] with no gaps or overlaps; boundaries
//! (80, 60, 40) belong to the higher tier.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Priority band derived from the lead score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
    VeryLow,
}

/// What the follow-up machinery should do with the lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowupAction {
    ImmediateFollowup,
    ScheduleCall,
    NurtureSequence,
    AutomatedOnly,
}

/// Operator guidance attached to a scored lead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action: FollowupAction,
    pub message: &'static str,
    /// Fixed, ordered next-step checklist for the assigned agent.
    pub next_steps: &'static [&'static str],
}

/// Map a score to its tier. Evaluated high to low; each boundary value maps
/// to the tier it opens.
pub fn recommend(score: u8) -> Recommendation {
    if score >= 80 {
        Recommendation {
            priority: Priority::High,
            action: FollowupAction::ImmediateFollowup,
            message: "Hot lead - contact within 1 hour",
            next_steps: &[
                "Call immediately",
                "Send personalized property recommendations",
                "Schedule viewing within 24 hours",
                "Assign to top-performing agent",
            ],
        }
    } else if score >= 60 {
        Recommendation {
            priority: Priority::Medium,
            action: FollowupAction::ScheduleCall,
            message: "Warm lead - contact within 24 hours",
            next_steps: &[
                "Send follow-up email",
                "Schedule phone call",
                "Provide market insights",
                "Add to nurture sequence",
            ],
        }
    } else if score >= 40 {
        Recommendation {
            priority: Priority::Low,
            action: FollowupAction::NurtureSequence,
            message: "Cool lead - add to nurture campaign",
            next_steps: &[
                "Add to automated nurture sequence",
                "Send weekly market updates",
                "Provide educational content",
                "Monitor engagement",
            ],
        }
    } else {
        Recommendation {
            priority: Priority::VeryLow,
            action: FollowupAction::AutomatedOnly,
            message: "Cold lead - automated engagement only",
            next_steps: &[
                "Add to general newsletter",
                "Send monthly updates",
                "Monitor for re-engagement",
                "Focus on higher priority leads",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_partition_the_score_range() {
        for score in 0..=100u8 {
            let tier = recommend(score).priority;
            let expected = match score {
                80..=100 => Priority::High,
                60..=79 => Priority::Medium,
                40..=59 => Priority::Low,
                _ => Priority::VeryLow,
            };
            assert_eq!(tier, expected, "score {score}");
        }
    }

    #[test]
    fn boundary_values_map_to_the_documented_tier() {
        assert_eq!(recommend(80).priority, Priority::High);
        assert_eq!(recommend(79).priority, Priority::Medium);
        assert_eq!(recommend(60).priority, Priority::Medium);
        assert_eq!(recommend(59).priority, Priority::Low);
        assert_eq!(recommend(40).priority, Priority::Low);
        assert_eq!(recommend(39).priority, Priority::VeryLow);
    }

    #[test]
    fn every_tier_carries_guidance() {
        for score in [0, 45, 65, 95] {
            let rec = recommend(score);
            assert!(!rec.message.is_empty());
            assert_eq!(rec.next_steps.len(), 4);
        }
    }
}

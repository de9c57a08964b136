// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types for the Propflow lead engine.
//!
//! Discrete attributes (timeline, financing, statuses, channels) are closed
//! enums so every score lookup is a total match, not a string-keyed table
//! with a silent zero fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque, stable identifier for a lead.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LeadId(pub String);

/// Identifier for a scheduled appointment.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AppointmentId(pub String);

/// Identifier for a nurture sequence definition.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SequenceId(pub String);

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How soon the lead intends to buy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Timeline {
    #[serde(rename = "immediate")]
    #[strum(serialize = "immediate")]
    Immediate,
    #[serde(rename = "3_months")]
    #[strum(serialize = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    #[strum(serialize = "6_months")]
    SixMonths,
    #[serde(rename = "1_year")]
    #[strum(serialize = "1_year")]
    OneYear,
}

/// Where the lead stands with financing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinancingStatus {
    PreApproved,
    PreQualified,
    Exploring,
    NotStarted,
}

/// Funnel position of a lead.
///
/// Transitions are one-directional down the funnel; `Lost` is reachable from
/// any non-terminal state and is terminal, as is `Converted`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadStatus {
    New,
    Qualified,
    Contacted,
    AppointmentScheduled,
    Converted,
    Lost,
}

impl LeadStatus {
    /// Position in the funnel, used to enforce forward-only transitions.
    fn rank(self) -> u8 {
        match self {
            LeadStatus::New => 0,
            LeadStatus::Qualified => 1,
            LeadStatus::Contacted => 2,
            LeadStatus::AppointmentScheduled => 3,
            LeadStatus::Converted => 4,
            // Lost sits outside the funnel ordering.
            LeadStatus::Lost => 5,
        }
    }

    /// Whether no further transitions are possible from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Converted | LeadStatus::Lost)
    }

    /// Whether moving to `next` is a legal funnel transition.
    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == LeadStatus::Lost {
            return true;
        }
        next != LeadStatus::Lost && next.rank() > self.rank()
    }
}

/// Inclusive budget band the lead is shopping in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u64,
    pub max: u64,
}

/// Delivery channel for outbound messages, reminders, and nurture steps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Call,
    Message,
}

/// One recorded exchange with a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    /// What the lead sent.
    pub message: String,
    /// What we replied.
    pub response: String,
    pub channel: Channel,
    /// Classified intent of the inbound message, if the classifier produced one.
    #[serde(default)]
    pub intent: Option<String>,
    /// In-product action the interaction recorded (e.g. `view_property`).
    #[serde(default)]
    pub action: Option<String>,
}

/// A prospective property buyer tracked through the funnel.
///
/// `score` is derived state: it is always recomputed from the current
/// attributes and interaction history, never edited directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub budget: Option<BudgetRange>,
    /// Ordered, most specific first. The first entry drives location scoring.
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub property_types: Vec<String>,
    #[serde(default)]
    pub timeline: Option<Timeline>,
    #[serde(default)]
    pub financing: Option<FinancingStatus>,
    pub score: u8,
    pub status: LeadStatus,
    #[serde(default)]
    pub assigned_agent: Option<String>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// Kind of scheduled contact between a lead and a property or agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppointmentKind {
    Viewing,
    VirtualTour,
    Consultation,
}

/// Lifecycle state of an appointment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
}

/// A notification tied to an appointment, fired at a fixed offset before it.
///
/// Invariant: `fire_time` is strictly before the appointment's scheduled time
/// and strictly after the moment the appointment was created. Slots whose
/// fire time had already passed at creation are never generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub channel: Channel,
    pub fire_time: DateTime<Utc>,
    pub sent: bool,
}

/// One scheduled contact between a lead and a property/agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub property_id: String,
    pub lead_id: LeadId,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub kind: AppointmentKind,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub virtual_link: Option<String>,
    /// Ordered by fire time. Sent reminders stay as historical record even
    /// after cancellation; only pending ones are discarded.
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// One delayed outreach step inside a nurture sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurtureStep {
    /// Hours after sequence start, not after the previous step.
    pub delay_hours: u32,
    pub channel: Channel,
    pub template_id: String,
    /// Literal body used when `template_id` has no registered template.
    pub fallback_content: String,
}

/// A named, ordered list of delayed outreach steps.
///
/// Definition order is significant: it is the tie-break when two sequences
/// share a trigger score, and the dispatch order for steps whose fire times
/// have both elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurtureSequence {
    pub id: SequenceId,
    pub name: String,
    /// Minimum lead score that activates this sequence.
    pub trigger_score: u8,
    pub active: bool,
    pub steps: Vec<NurtureStep>,
}

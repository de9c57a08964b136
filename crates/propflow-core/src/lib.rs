// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Propflow lead-qualification engine.
//!
//! This crate provides the domain model, the shared error type, and the
//! [`OutboundChannel`] trait that every delivery adapter implements. The
//! scoring, scheduling, and nurture crates all build on the definitions here.

pub mod channel;
pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use channel::{OutboundChannel, OutboundMessage};
pub use error::PropflowError;
pub use types::{
    Appointment, AppointmentId, AppointmentKind, AppointmentStatus, BudgetRange, Channel,
    FinancingStatus, Interaction, Lead, LeadId, LeadStatus, NurtureSequence, NurtureStep,
    Reminder, SequenceId, Timeline,
};

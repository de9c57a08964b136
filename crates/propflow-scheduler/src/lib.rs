// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment scheduling for the Propflow lead engine.
//!
//! The scheduler owns the appointment records and their reminder work items.
//! It depends on the [`OutboundChannel`] seam for confirmations and on the
//! shared work queue for time-deferred reminders; it knows nothing about
//! nurture sequences.
//!
//! [`OutboundChannel`]: propflow_core::channel::OutboundChannel

pub mod confirmation;
pub mod scheduler;

pub use confirmation::{confirmation_message, reminder_message};
pub use scheduler::{AppointmentScheduler, ScheduleRequest};

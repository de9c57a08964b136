// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Propflow: lead qualification, appointment scheduling, and automated
//! nurture follow-up for a real-estate chat product.
//!
//! The [`Engine`] is the single entry point. Inbound traffic (lead updates,
//! bookings, admin changes) goes through its synchronous operations;
//! outbound messages only leave on [`Engine::execute_tick`], driven by an
//! external timer. Delivery goes through whatever
//! [`OutboundChannel`](propflow_core::OutboundChannel) implementation the
//! embedding service provides.
//!
//! ```no_run
//! use std::sync::Arc;
//! use propflow::Engine;
//! use propflow_config::load_and_validate;
//! use propflow_test_utils::MockChannel;
//!
//! # async fn run() -> Result<(), propflow_core::PropflowError> {
//! let config = load_and_validate().map_err(propflow_config::into_engine_error)?;
//! let engine = Engine::new(config, Arc::new(MockChannel::new()))?;
//! loop {
//!     engine.execute_tick().await;
//!     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//! }
//! # }
//! ```

pub mod engine;

pub use engine::{Engine, LeadAttributes, LeadReport, TickReport};

pub use propflow_core::channel::{OutboundChannel, OutboundMessage};
pub use propflow_core::error::PropflowError;
pub use propflow_core::types::{
    Appointment, AppointmentId, AppointmentKind, AppointmentStatus, BudgetRange, Channel,
    FinancingStatus, Interaction, Lead, LeadId, LeadStatus, NurtureSequence, NurtureStep,
    Reminder, SequenceId, Timeline,
};
pub use propflow_scheduler::ScheduleRequest;
pub use propflow_scoring::{FollowupAction, Priority, Recommendation};

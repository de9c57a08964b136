// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-deferred execution for the Propflow lead engine.
//!
//! Reminders and nurture steps are not immediate calls: they are work items
//! with a future fire time, held in a pollable [`WorkQueue`] and delivered by
//! a [`Dispatcher`] whenever an external tick claims them. See the `propflow`
//! crate's `execute_tick` for the loop that drives both.

pub mod dispatcher;
pub mod queue;

pub use dispatcher::{DispatchOutcome, Dispatcher, RenderedJob};
pub use queue::{GroupKey, JobPayload, WorkItem, WorkQueue, WorkStatus};

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automated follow-up sequences for leads below the hot-transfer bar.
//!
//! A sequence is a tiered drip of delayed outreach steps. Each lead runs at
//! most one sequence at a time; score changes switch it between tiers, and
//! terminal statuses stop it. Step delivery itself goes through the shared
//! dispatch queue, this crate only decides what gets scheduled.

pub mod orchestrator;
pub mod templates;

pub use orchestrator::{NurtureOrchestrator, RunState, SequenceRun, SequenceSet};
pub use templates::{render, render_or_fallback};

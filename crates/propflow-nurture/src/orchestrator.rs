// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequence selection and per-lead run bookkeeping.
//!
//! On every score recomputation the orchestrator selects the single eligible
//! sequence: the active one with the highest trigger score not exceeding the
//! lead's score, ties broken by definition order. A lead that qualifies into
//! a different sequence mid-run switches: the old run is abandoned (its
//! pending steps cancelled) and the new one starts from its first step.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use propflow_core::error::PropflowError;
use propflow_core::types::{Lead, LeadId, LeadStatus, NurtureSequence, SequenceId};
use propflow_dispatch::{GroupKey, JobPayload, WorkQueue};
use tracing::{debug, info};

/// Immutable snapshot of the sequence definitions, in definition order.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    sequences: Vec<NurtureSequence>,
}

impl SequenceSet {
    pub fn new(sequences: Vec<NurtureSequence>) -> Self {
        Self { sequences }
    }

    /// The eligible sequence for a score: highest trigger score not
    /// exceeding it. The scan only replaces the candidate on a strictly
    /// higher trigger, so definition order wins ties.
    pub fn select(&self, score: u8) -> Option<&NurtureSequence> {
        let mut best: Option<&NurtureSequence> = None;
        for seq in &self.sequences {
            if !seq.active || seq.trigger_score > score {
                continue;
            }
            if best.is_none_or(|current| seq.trigger_score > current.trigger_score) {
                best = Some(seq);
            }
        }
        best
    }

    pub fn get(&self, id: &SequenceId) -> Option<&NurtureSequence> {
        self.sequences.iter().find(|s| s.id == *id)
    }

    pub fn sequences(&self) -> &[NurtureSequence] {
        &self.sequences
    }
}

/// Lifecycle of one (lead, sequence) execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Completed,
    Abandoned,
}

/// Bookkeeping for a lead's current sequence execution.
#[derive(Debug, Clone)]
pub struct SequenceRun {
    pub sequence_id: SequenceId,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub total_steps: usize,
}

/// Drives sequence selection and step scheduling for all leads.
pub struct NurtureOrchestrator {
    set: ArcSwap<SequenceSet>,
    /// At most one run per lead; superseded runs are overwritten on switch.
    runs: DashMap<LeadId, SequenceRun>,
    queue: Arc<WorkQueue>,
}

impl NurtureOrchestrator {
    pub fn new(sequences: Vec<NurtureSequence>, queue: Arc<WorkQueue>) -> Self {
        Self {
            set: ArcSwap::from_pointee(SequenceSet::new(sequences)),
            runs: DashMap::new(),
            queue,
        }
    }

    /// React to a recomputed score for a lead.
    ///
    /// Selects the eligible sequence and reconciles the lead's run against
    /// it: start, keep, switch, or abandon. Terminal leads never run
    /// sequences.
    pub fn apply_score(&self, lead: &Lead, score: u8) {
        if matches!(lead.status, LeadStatus::Converted | LeadStatus::Lost) {
            self.abandon(&lead.id);
            return;
        }

        let set = self.set.load();
        match set.select(score) {
            Some(sequence) => {
                let already_running = self.runs.get(&lead.id).is_some_and(|run| {
                    run.state == RunState::Running && run.sequence_id == sequence.id
                });
                if already_running {
                    debug!(lead_id = %lead.id, sequence_id = %sequence.id, "sequence unchanged");
                    return;
                }
                self.abandon(&lead.id);
                self.start(lead, sequence);
            }
            None => {
                // Score dropped below every trigger: nothing eligible, so
                // nothing may keep running.
                self.abandon(&lead.id);
            }
        }
    }

    /// Start a sequence for a lead from its first step.
    fn start(&self, lead: &Lead, sequence: &NurtureSequence) {
        let started_at = Utc::now();
        for (index, step) in sequence.steps.iter().enumerate() {
            // Delays are measured from sequence start, not from the
            // previous step's completion.
            let fire_time = started_at + Duration::hours(i64::from(step.delay_hours));
            self.queue.enqueue(
                GroupKey::Run(lead.id.clone(), sequence.id.clone()),
                index as u32,
                fire_time,
                JobPayload::Step {
                    lead_id: lead.id.clone(),
                    sequence_id: sequence.id.clone(),
                    step_index: index,
                    channel: step.channel,
                    template_id: step.template_id.clone(),
                    fallback_content: step.fallback_content.clone(),
                },
            );
        }
        self.runs.insert(
            lead.id.clone(),
            SequenceRun {
                sequence_id: sequence.id.clone(),
                state: RunState::Running,
                started_at,
                total_steps: sequence.steps.len(),
            },
        );
        info!(
            lead_id = %lead.id,
            sequence_id = %sequence.id,
            steps = sequence.steps.len(),
            "nurture sequence started"
        );
    }

    /// Abandon whatever run the lead has, cancelling its pending steps.
    /// No-op if there is no running sequence.
    pub fn abandon(&self, lead_id: &LeadId) {
        if let Some(mut run) = self.runs.get_mut(lead_id)
            && run.state == RunState::Running
        {
            run.state = RunState::Abandoned;
            self.queue
                .cancel_group(&GroupKey::Run(lead_id.clone(), run.sequence_id.clone()));
            info!(lead_id = %lead_id, sequence_id = %run.sequence_id, "nurture run abandoned");
        }
    }

    /// Record a successfully dispatched step; the run completes when its
    /// last step goes out.
    pub fn on_step_sent(&self, lead_id: &LeadId, sequence_id: &SequenceId, step_index: usize) {
        if let Some(mut run) = self.runs.get_mut(lead_id)
            && run.state == RunState::Running
            && run.sequence_id == *sequence_id
            && step_index + 1 == run.total_steps
        {
            run.state = RunState::Completed;
            info!(lead_id = %lead_id, sequence_id = %sequence_id, "nurture sequence completed");
        }
    }

    /// The lead's current run record, if any.
    pub fn run_for(&self, lead_id: &LeadId) -> Option<SequenceRun> {
        self.runs.get(lead_id).map(|run| run.clone())
    }

    /// Current sequence definitions snapshot.
    pub fn sequences(&self) -> Vec<NurtureSequence> {
        self.set.load().sequences().to_vec()
    }

    /// Insert or replace a sequence definition. New sequences append in
    /// definition order; replacements keep their position.
    pub fn upsert_sequence(&self, sequence: NurtureSequence) -> Result<(), PropflowError> {
        if sequence.steps.is_empty() {
            return Err(PropflowError::Config(format!(
                "sequence `{}` must have at least one step",
                sequence.id
            )));
        }
        if sequence.trigger_score > 100 {
            return Err(PropflowError::Config(format!(
                "sequence `{}` trigger_score must be at most 100",
                sequence.id
            )));
        }

        let current = self.set.load();
        let mut sequences = current.sequences().to_vec();
        match sequences.iter_mut().find(|s| s.id == sequence.id) {
            Some(slot) => *slot = sequence,
            None => sequences.push(sequence),
        }
        self.set.store(Arc::new(SequenceSet::new(sequences)));
        Ok(())
    }

    /// Remove a sequence definition. Running executions of it are not
    /// touched; they finish or get switched away on the next score change.
    pub fn remove_sequence(&self, id: &SequenceId) -> Result<(), PropflowError> {
        let current = self.set.load();
        let mut sequences = current.sequences().to_vec();
        let before = sequences.len();
        sequences.retain(|s| s.id != *id);
        if sequences.len() == before {
            return Err(PropflowError::NotFound {
                entity: "sequence",
                id: id.0.clone(),
            });
        }
        self.set.store(Arc::new(SequenceSet::new(sequences)));
        Ok(())
    }
}

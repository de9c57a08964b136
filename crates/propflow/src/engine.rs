// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engine facade: wires scoring, scheduling, nurture, and dispatch
//! behind one handle.
//!
//! Inbound operations (lead updates, bookings, admin changes) mutate state
//! synchronously; outbound traffic only moves on [`Engine::execute_tick`],
//! which an external timer drives. Message bodies are rendered at tick time
//! from the live records, so a reminder always carries the current
//! appointment time and a nurture step the current lead name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use propflow_config::{PropflowConfig, ScoringConfig, into_engine_error, validate_config};
use propflow_core::channel::{OutboundChannel, OutboundMessage};
use propflow_core::error::PropflowError;
use propflow_core::types::{
    Appointment, AppointmentId, AppointmentStatus, BudgetRange, FinancingStatus, Interaction,
    Lead, LeadId, LeadStatus, NurtureSequence, SequenceId, Timeline,
};
use propflow_dispatch::{Dispatcher, JobPayload, RenderedJob, WorkItem, WorkQueue};
use propflow_nurture::{NurtureOrchestrator, SequenceRun, render_or_fallback};
use propflow_scheduler::{AppointmentScheduler, ScheduleRequest, reminder_message};
use propflow_scoring::{Recommendation, ScoringEngine};
use tracing::{info, warn};

/// Caller-supplied lead attributes and interaction history.
///
/// Deliberately carries no score or status: both are derived state the
/// engine owns. The score is recomputed on every upsert and the funnel
/// status only moves through engine operations, so no caller input can
/// rewind the funnel or reopen a closed lead.
#[derive(Debug, Clone)]
pub struct LeadAttributes {
    pub id: LeadId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub budget: Option<BudgetRange>,
    pub preferred_locations: Vec<String>,
    pub property_types: Vec<String>,
    pub timeline: Option<Timeline>,
    pub financing: Option<FinancingStatus>,
    pub assigned_agent: Option<String>,
    pub interactions: Vec<Interaction>,
}

/// Result of a lead upsert: the stored record plus the tier recommendation
/// its fresh score landed on.
#[derive(Debug, Clone)]
pub struct LeadReport {
    pub lead: Lead,
    pub score: u8,
    pub recommendation: Recommendation,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Due items claimed from the queue.
    pub claimed: usize,
    /// Items delivered through the outbound channel.
    pub dispatched: usize,
    /// Items that failed to send and went back for retry (or died).
    pub failed: usize,
    /// Items dropped because their appointment or lead no longer warranted
    /// a send.
    pub skipped: usize,
}

/// One handle over the whole lead engine. Cheap to share behind an `Arc`;
/// every operation takes `&self`.
pub struct Engine {
    leads: DashMap<LeadId, Lead>,
    scoring: ScoringEngine,
    scheduler: AppointmentScheduler,
    nurture: NurtureOrchestrator,
    queue: Arc<WorkQueue>,
    dispatcher: Dispatcher,
}

impl Engine {
    /// Build an engine from a configuration and an outbound channel.
    ///
    /// The configuration is re-validated here; startup is the only place a
    /// [`PropflowError::Config`] can surface.
    pub fn new(
        config: PropflowConfig,
        channel: Arc<dyn OutboundChannel + Send + Sync>,
    ) -> Result<Self, PropflowError> {
        validate_config(&config).map_err(into_engine_error)?;

        let queue = Arc::new(WorkQueue::new(config.dispatch.max_attempts));
        let sequences: Vec<NurtureSequence> =
            config.sequences.iter().map(NurtureSequence::from).collect();

        Ok(Self {
            leads: DashMap::new(),
            scoring: ScoringEngine::new(config.scoring),
            scheduler: AppointmentScheduler::new(
                Arc::clone(&queue),
                Arc::clone(&channel),
                config.reminders.offsets,
            ),
            nurture: NurtureOrchestrator::new(sequences, Arc::clone(&queue)),
            dispatcher: Dispatcher::new(
                channel,
                config.dispatch.worker_limit,
                Duration::from_secs(config.dispatch.send_timeout_secs),
            ),
            queue,
        })
    }

    /// Upsert a lead from its attributes and interaction history, and
    /// recompute its score.
    ///
    /// The stored funnel status carries over on an existing lead, so a
    /// stale snapshot cannot reopen a converted or lost lead; unknown leads
    /// enter as `new`. A `new` lead whose score clears the lowest nurture
    /// tier advances to `qualified`, and the fresh score drives sequence
    /// selection or switching.
    pub fn update_lead(&self, attrs: LeadAttributes) -> LeadReport {
        let status = self
            .leads
            .get(&attrs.id)
            .map(|existing| existing.status)
            .unwrap_or(LeadStatus::New);

        let mut lead = Lead {
            id: attrs.id,
            name: attrs.name,
            email: attrs.email,
            phone: attrs.phone,
            budget: attrs.budget,
            preferred_locations: attrs.preferred_locations,
            property_types: attrs.property_types,
            timeline: attrs.timeline,
            financing: attrs.financing,
            score: 0,
            status,
            assigned_agent: attrs.assigned_agent,
            interactions: attrs.interactions,
        };

        let (score, recommendation) = self.scoring.evaluate(&lead, &lead.interactions);
        lead.score = score;

        if lead.status == LeadStatus::New
            && self.nurture_floor().is_some_and(|floor| score >= floor)
        {
            lead.status = LeadStatus::Qualified;
            info!(lead_id = %lead.id, score, "lead qualified");
        }

        self.nurture.apply_score(&lead, score);
        self.leads.insert(lead.id.clone(), lead.clone());
        LeadReport {
            lead,
            score,
            recommendation,
        }
    }

    /// Fetch a lead by id.
    pub fn get_lead(&self, id: &LeadId) -> Option<Lead> {
        self.leads.get(id).map(|entry| entry.clone())
    }

    /// Book an appointment for a known lead.
    ///
    /// A successful booking advances the lead to `appointment_scheduled`
    /// where the funnel allows it.
    pub async fn schedule_appointment(
        &self,
        request: ScheduleRequest,
    ) -> Result<Appointment, PropflowError> {
        if !self.leads.contains_key(&request.lead_id) {
            return Err(PropflowError::NotFound {
                entity: "lead",
                id: request.lead_id.0.clone(),
            });
        }

        let appointment = self.scheduler.schedule(request).await?;

        if let Some(mut lead) = self.leads.get_mut(&appointment.lead_id)
            && lead
                .status
                .can_transition_to(LeadStatus::AppointmentScheduled)
        {
            lead.status = LeadStatus::AppointmentScheduled;
        }
        Ok(appointment)
    }

    /// Move an appointment to a new time, regenerating its reminders.
    pub fn reschedule_appointment(
        &self,
        id: &AppointmentId,
        new_time: DateTime<Utc>,
    ) -> Result<Appointment, PropflowError> {
        self.scheduler.reschedule(id, new_time)
    }

    /// Cancel an appointment, discarding its pending reminders.
    pub fn cancel_appointment(
        &self,
        id: &AppointmentId,
        reason: Option<&str>,
    ) -> Result<(), PropflowError> {
        self.scheduler.cancel(id, reason)
    }

    /// Record that the lead confirmed attendance.
    pub fn confirm_appointment(&self, id: &AppointmentId) -> Result<Appointment, PropflowError> {
        self.scheduler.confirm(id)
    }

    /// Record that the appointment took place.
    pub fn complete_appointment(&self, id: &AppointmentId) -> Result<Appointment, PropflowError> {
        self.scheduler.complete(id)
    }

    /// Fetch an appointment by id.
    pub fn get_appointment(&self, id: &AppointmentId) -> Option<Appointment> {
        self.scheduler.get(id)
    }

    /// Mark a lead converted, stopping any running nurture sequence.
    pub fn mark_converted(&self, id: &LeadId) -> Result<Lead, PropflowError> {
        self.terminate(id, LeadStatus::Converted)
    }

    /// Mark a lead lost, stopping any running nurture sequence.
    pub fn mark_lost(&self, id: &LeadId) -> Result<Lead, PropflowError> {
        self.terminate(id, LeadStatus::Lost)
    }

    fn terminate(&self, id: &LeadId, terminal: LeadStatus) -> Result<Lead, PropflowError> {
        let mut lead = self.leads.get_mut(id).ok_or_else(|| PropflowError::NotFound {
            entity: "lead",
            id: id.0.clone(),
        })?;
        if !lead.status.can_transition_to(terminal) {
            return Err(PropflowError::Internal(format!(
                "lead `{id}` cannot move from {} to {terminal}",
                lead.status
            )));
        }
        lead.status = terminal;
        self.nurture.abandon(id);
        info!(lead_id = %id, status = %terminal, "lead closed");
        Ok(lead.clone())
    }

    /// Atomically replace the scoring rules after validating them.
    pub fn update_scoring_rules(&self, rules: ScoringConfig) -> Result<(), PropflowError> {
        self.scoring.update_rules(rules)
    }

    /// Insert or replace a nurture sequence definition.
    pub fn upsert_sequence(&self, sequence: NurtureSequence) -> Result<(), PropflowError> {
        self.nurture.upsert_sequence(sequence)
    }

    /// Remove a nurture sequence definition.
    pub fn remove_sequence(&self, id: &SequenceId) -> Result<(), PropflowError> {
        self.nurture.remove_sequence(id)
    }

    /// Current nurture sequence definitions, in definition order.
    pub fn sequences(&self) -> Vec<NurtureSequence> {
        self.nurture.sequences()
    }

    /// The lead's current nurture run record, if any.
    pub fn nurture_run(&self, id: &LeadId) -> Option<SequenceRun> {
        self.nurture.run_for(id)
    }

    /// Drain everything due right now. The entry point an external timer
    /// calls on a fixed interval.
    pub async fn execute_tick(&self) -> TickReport {
        self.execute_tick_at(Utc::now()).await
    }

    /// Drain everything due at `now`.
    ///
    /// Claims due reminders and steps, renders their bodies from the live
    /// appointment and lead records, and dispatches them with bounded
    /// concurrency. Items whose referent vanished or was cancelled in the
    /// meantime are acked away with a warning. Two concurrent ticks never
    /// double-send: the claim is a compare-and-set.
    pub async fn execute_tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let due = self.queue.claim_due(now);
        let claimed = due.len();
        if claimed == 0 {
            return TickReport::default();
        }

        let mut fire_times: HashMap<u64, DateTime<Utc>> = HashMap::with_capacity(claimed);
        let mut jobs = Vec::with_capacity(claimed);
        let mut skipped = 0usize;
        for item in due {
            fire_times.insert(item.id, item.fire_time);
            match self.render(&item) {
                Some(message) => jobs.push(RenderedJob { item, message }),
                None => {
                    self.queue.ack(item.id);
                    skipped += 1;
                }
            }
        }

        let outcomes = self.dispatcher.run(Arc::clone(&self.queue), jobs).await;

        let mut dispatched = 0usize;
        let mut failed = 0usize;
        for outcome in &outcomes {
            if !outcome.delivered {
                failed += 1;
                continue;
            }
            dispatched += 1;
            match &outcome.payload {
                JobPayload::Reminder { appointment_id, .. } => {
                    if let Some(fire_time) = fire_times.get(&outcome.item_id) {
                        self.scheduler.mark_reminder_sent(appointment_id, *fire_time);
                    }
                }
                JobPayload::Step {
                    lead_id,
                    sequence_id,
                    step_index,
                    ..
                } => {
                    self.nurture.on_step_sent(lead_id, sequence_id, *step_index);
                }
            }
        }

        // Finished items carry no further scheduling state; drop them so
        // the queue only holds live work.
        self.queue.compact();

        let report = TickReport {
            claimed,
            dispatched,
            failed,
            skipped,
        };
        info!(?report, "tick complete");
        report
    }

    /// Render a claimed work item against the live records. `None` means the
    /// item no longer warrants a send.
    fn render(&self, item: &WorkItem) -> Option<OutboundMessage> {
        match &item.payload {
            JobPayload::Reminder {
                appointment_id,
                channel,
            } => {
                let Some(appointment) = self.scheduler.get(appointment_id) else {
                    warn!(item_id = item.id, appointment_id = %appointment_id, "reminder references a missing appointment, dropping");
                    return None;
                };
                if appointment.status == AppointmentStatus::Cancelled {
                    warn!(item_id = item.id, appointment_id = %appointment_id, "reminder for a cancelled appointment, dropping");
                    return None;
                }
                Some(
                    OutboundMessage::new(
                        reminder_message(&appointment, *channel),
                        appointment.id.0.clone(),
                        *channel,
                    )
                    .with_metadata(serde_json::json!({
                        "appointment_id": appointment.id.0,
                        "type": "reminder",
                    })),
                )
            }
            JobPayload::Step {
                lead_id,
                sequence_id,
                step_index,
                channel,
                template_id,
                fallback_content,
            } => {
                let Some(lead) = self.leads.get(lead_id) else {
                    warn!(item_id = item.id, lead_id = %lead_id, "nurture step references a missing lead, dropping");
                    return None;
                };
                if lead.status.is_terminal() {
                    warn!(item_id = item.id, lead_id = %lead_id, "nurture step for a closed lead, dropping");
                    return None;
                }
                Some(
                    OutboundMessage::new(
                        render_or_fallback(template_id, fallback_content, &lead),
                        format!("nurture_{lead_id}_{channel}"),
                        *channel,
                    )
                    .with_metadata(serde_json::json!({
                        "sequence_id": sequence_id.0,
                        "step_index": step_index,
                        "type": "nurture_step",
                    })),
                )
            }
        }
    }

    /// The lowest active sequence trigger: the score at which automated
    /// nurture starts and a `new` lead counts as qualified.
    fn nurture_floor(&self) -> Option<u8> {
        self.nurture
            .sequences()
            .iter()
            .filter(|s| s.active)
            .map(|s| s.trigger_score)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use propflow_test_utils::MockChannel;

    fn engine() -> (Engine, Arc<MockChannel>) {
        let channel = Arc::new(MockChannel::new());
        let engine = Engine::new(PropflowConfig::default(), channel.clone())
            .expect("default config is valid");
        (engine, channel)
    }

    fn lead(id: &str) -> LeadAttributes {
        LeadAttributes {
            id: LeadId(id.into()),
            name: Some("Ada".into()),
            email: None,
            phone: None,
            budget: None,
            preferred_locations: vec![],
            property_types: vec![],
            timeline: None,
            financing: None,
            assigned_agent: None,
            interactions: vec![],
        }
    }

    fn warm_lead(id: &str) -> LeadAttributes {
        LeadAttributes {
            budget: Some(BudgetRange {
                min: 300_000,
                max: 450_000,
            }),
            timeline: Some(Timeline::ThreeMonths),
            financing: Some(FinancingStatus::PreQualified),
            preferred_locations: vec!["Springfield".into()],
            ..lead(id)
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = PropflowConfig::default();
        config.scoring.budget.weight = 0.9;
        let result = Engine::new(config, Arc::new(MockChannel::new()));
        assert!(matches!(result, Err(PropflowError::Config(_))));
    }

    #[test]
    fn empty_attributes_score_zero_and_enter_as_new() {
        let (engine, _channel) = engine();
        let report = engine.update_lead(lead("lead_1"));
        assert_eq!(report.score, 0);
        assert_eq!(report.lead.status, LeadStatus::New);
        assert_eq!(engine.get_lead(&LeadId("lead_1".into())).unwrap().score, 0);
    }

    #[test]
    fn closed_lead_is_not_reopened_by_a_later_upsert() {
        let (engine, _channel) = engine();
        let report = engine.update_lead(warm_lead("lead_1"));
        engine.mark_converted(&report.lead.id).unwrap();

        // Re-sending the original attributes must not rewind the funnel.
        let resent = engine.update_lead(warm_lead("lead_1"));
        assert_eq!(resent.lead.status, LeadStatus::Converted);
        assert_eq!(
            engine.get_lead(&report.lead.id).unwrap().status,
            LeadStatus::Converted
        );
        // And no nurture run restarts for the closed lead.
        assert_eq!(
            engine.nurture_run(&report.lead.id).unwrap().state,
            propflow_nurture::RunState::Abandoned
        );
    }

    #[test]
    fn lead_clearing_the_nurture_floor_qualifies() {
        let (engine, _channel) = engine();

        let below = engine.update_lead(lead("cold"));
        assert_eq!(below.lead.status, LeadStatus::New);

        let above = engine.update_lead(warm_lead("warm"));
        assert!(above.score >= 40, "warm profile must clear the floor, got {}", above.score);
        assert_eq!(above.lead.status, LeadStatus::Qualified);
        assert!(engine.nurture_run(&above.lead.id).is_some());
    }

    #[tokio::test]
    async fn booking_for_unknown_lead_is_not_found() {
        let (engine, _channel) = engine();
        let request = ScheduleRequest {
            property_id: "prop_1".into(),
            lead_id: LeadId("ghost".into()),
            scheduled_time: Utc::now() + ChronoDuration::hours(25),
            duration_minutes: 60,
            kind: propflow_core::types::AppointmentKind::Viewing,
            location: None,
            virtual_link: None,
        };
        assert!(matches!(
            engine.schedule_appointment(request).await,
            Err(PropflowError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn booking_advances_the_lead_status() {
        let (engine, _channel) = engine();
        let report = engine.update_lead(warm_lead("lead_1"));

        let request = ScheduleRequest {
            property_id: "prop_1".into(),
            lead_id: report.lead.id.clone(),
            scheduled_time: Utc::now() + ChronoDuration::hours(25),
            duration_minutes: 60,
            kind: propflow_core::types::AppointmentKind::Viewing,
            location: None,
            virtual_link: None,
        };
        engine.schedule_appointment(request).await.unwrap();

        assert_eq!(
            engine.get_lead(&report.lead.id).unwrap().status,
            LeadStatus::AppointmentScheduled
        );
    }

    #[test]
    fn conversion_abandons_the_running_sequence() {
        let (engine, _channel) = engine();
        let report = engine.update_lead(warm_lead("lead_1"));
        assert!(engine.nurture_run(&report.lead.id).is_some());

        let closed = engine.mark_converted(&report.lead.id).unwrap();
        assert_eq!(closed.status, LeadStatus::Converted);
        assert_eq!(
            engine.nurture_run(&report.lead.id).unwrap().state,
            propflow_nurture::RunState::Abandoned
        );

        // A terminal lead admits no further transitions.
        assert!(engine.mark_lost(&report.lead.id).is_err());
    }

    #[test]
    fn terminating_an_unknown_lead_is_not_found() {
        let (engine, _channel) = engine();
        assert!(matches!(
            engine.mark_lost(&LeadId("ghost".into())),
            Err(PropflowError::NotFound { .. })
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment lifecycle: schedule, reschedule, cancel, complete.
//!
//! Every reminder is enqueued as a work item at booking time; reschedule and
//! cancel invalidate the pending items so the timer loop never fires against
//! a stale time. The confirmation send is best-effort: a dispatch failure is
//! logged and the appointment stands.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use propflow_config::model::ReminderOffset;
use propflow_core::channel::{OutboundChannel, OutboundMessage};
use propflow_core::error::PropflowError;
use propflow_core::types::{
    Appointment, AppointmentId, AppointmentKind, AppointmentStatus, LeadId, Reminder,
};
use propflow_dispatch::{GroupKey, JobPayload, WorkQueue};
use tracing::{info, warn};
use uuid::Uuid;

use crate::confirmation::confirmation_message;

/// A booking request from the inbound boundary.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub property_id: String,
    pub lead_id: LeadId,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub kind: AppointmentKind,
    pub location: Option<String>,
    pub virtual_link: Option<String>,
}

/// Owns the appointment records and their pending reminder work items.
pub struct AppointmentScheduler {
    store: DashMap<AppointmentId, Appointment>,
    queue: Arc<WorkQueue>,
    channel: Arc<dyn OutboundChannel + Send + Sync>,
    offsets: Vec<ReminderOffset>,
}

impl AppointmentScheduler {
    pub fn new(
        queue: Arc<WorkQueue>,
        channel: Arc<dyn OutboundChannel + Send + Sync>,
        offsets: Vec<ReminderOffset>,
    ) -> Self {
        Self {
            store: DashMap::new(),
            queue,
            channel,
            offsets,
        }
    }

    /// Book an appointment.
    ///
    /// Validates the request, generates the reminder set against `now`, and
    /// sends the type-specific confirmation before returning. The
    /// confirmation is not transactional with the booking: a send failure is
    /// logged for the caller to retry and the appointment stands.
    pub async fn schedule(&self, request: ScheduleRequest) -> Result<Appointment, PropflowError> {
        let now = Utc::now();
        validate_schedule(request.scheduled_time, request.duration_minutes, now)?;

        let id = AppointmentId(format!("apt_{}", Uuid::new_v4()));
        let mut appointment = Appointment {
            id: id.clone(),
            property_id: request.property_id,
            lead_id: request.lead_id,
            scheduled_time: request.scheduled_time,
            duration_minutes: request.duration_minutes,
            kind: request.kind,
            status: AppointmentStatus::Scheduled,
            location: request.location,
            virtual_link: request.virtual_link,
            reminders: vec![],
        };
        appointment.reminders = self.generate_reminders(&appointment, now);

        self.store.insert(id.clone(), appointment.clone());
        info!(
            appointment_id = %id,
            kind = %appointment.kind,
            reminders = appointment.reminders.len(),
            "appointment scheduled"
        );

        let confirmation = OutboundMessage::new(
            confirmation_message(&appointment),
            id.0.clone(),
            propflow_core::types::Channel::Message,
        )
        .with_metadata(serde_json::json!({
            "appointment_id": id.0,
            "type": "confirmation",
        }));
        if let Err(err) = self.channel.send(confirmation).await {
            warn!(appointment_id = %id, error = %err, "confirmation dispatch failed");
        }

        Ok(appointment)
    }

    /// Move an appointment to a new time.
    ///
    /// All unsent reminders for the prior time are discarded, and a fresh
    /// set is generated against the new time.
    pub fn reschedule(
        &self,
        id: &AppointmentId,
        new_time: DateTime<Utc>,
    ) -> Result<Appointment, PropflowError> {
        let now = Utc::now();
        let mut entry = self.store.get_mut(id).ok_or_else(|| PropflowError::NotFound {
            entity: "appointment",
            id: id.0.clone(),
        })?;
        validate_schedule(new_time, entry.duration_minutes, now)?;

        self.queue.cancel_group(&GroupKey::Appointment(id.clone()));
        entry.reminders.retain(|r| r.sent);

        entry.scheduled_time = new_time;
        entry.status = AppointmentStatus::Rescheduled;
        let fresh = self.generate_reminders(&entry, now);
        entry.reminders.extend(fresh);

        info!(appointment_id = %id, new_time = %new_time, "appointment rescheduled");
        Ok(entry.clone())
    }

    /// Cancel an appointment.
    ///
    /// Idempotent: cancelling an already-cancelled appointment is a no-op.
    /// Pending reminders are discarded; sent ones stay as historical record.
    pub fn cancel(&self, id: &AppointmentId, reason: Option<&str>) -> Result<(), PropflowError> {
        let mut entry = self.store.get_mut(id).ok_or_else(|| PropflowError::NotFound {
            entity: "appointment",
            id: id.0.clone(),
        })?;
        if entry.status == AppointmentStatus::Cancelled {
            return Ok(());
        }

        entry.status = AppointmentStatus::Cancelled;
        self.queue.cancel_group(&GroupKey::Appointment(id.clone()));
        entry.reminders.retain(|r| r.sent);

        info!(
            appointment_id = %id,
            reason = reason.unwrap_or("not provided"),
            "appointment cancelled"
        );
        Ok(())
    }

    /// Confirm an upcoming appointment (lead acknowledged attendance).
    pub fn confirm(&self, id: &AppointmentId) -> Result<Appointment, PropflowError> {
        self.transition(id, AppointmentStatus::Confirmed)
    }

    /// Mark an appointment as completed after it took place.
    pub fn complete(&self, id: &AppointmentId) -> Result<Appointment, PropflowError> {
        self.transition(id, AppointmentStatus::Completed)
    }

    fn transition(
        &self,
        id: &AppointmentId,
        next: AppointmentStatus,
    ) -> Result<Appointment, PropflowError> {
        let mut entry = self.store.get_mut(id).ok_or_else(|| PropflowError::NotFound {
            entity: "appointment",
            id: id.0.clone(),
        })?;
        entry.status = next;
        Ok(entry.clone())
    }

    /// Fetch an appointment by id.
    pub fn get(&self, id: &AppointmentId) -> Option<Appointment> {
        self.store.get(id).map(|entry| entry.clone())
    }

    /// Mark the reminder slot matching `fire_time` as sent on the record.
    pub fn mark_reminder_sent(&self, id: &AppointmentId, fire_time: DateTime<Utc>) {
        if let Some(mut entry) = self.store.get_mut(id) {
            for reminder in entry.reminders.iter_mut() {
                if reminder.fire_time == fire_time {
                    reminder.sent = true;
                }
            }
        }
    }

    /// Build the reminder set for `appointment` against `now`.
    ///
    /// A slot is included only if its fire time is still in the future;
    /// already-past slots are omitted entirely, never scheduled late. Short
    /// lead times therefore yield fewer reminders, down to zero.
    fn generate_reminders(&self, appointment: &Appointment, now: DateTime<Utc>) -> Vec<Reminder> {
        let mut reminders = Vec::new();
        for (slot, offset) in self.offsets.iter().enumerate() {
            let fire_time =
                appointment.scheduled_time - Duration::minutes(i64::from(offset.minutes_before));
            if fire_time <= now {
                continue;
            }
            reminders.push(Reminder {
                channel: offset.channel,
                fire_time,
                sent: false,
            });
            self.queue.enqueue(
                GroupKey::Appointment(appointment.id.clone()),
                slot as u32,
                fire_time,
                JobPayload::Reminder {
                    appointment_id: appointment.id.clone(),
                    channel: offset.channel,
                },
            );
        }
        reminders
    }
}

fn validate_schedule(
    scheduled_time: DateTime<Utc>,
    duration_minutes: u32,
    now: DateTime<Utc>,
) -> Result<(), PropflowError> {
    if scheduled_time <= now {
        return Err(PropflowError::InvalidSchedule {
            reason: format!("scheduled time {scheduled_time} is in the past"),
        });
    }
    if duration_minutes == 0 {
        return Err(PropflowError::InvalidSchedule {
            reason: "duration must be positive".to_string(),
        });
    }
    Ok(())
}

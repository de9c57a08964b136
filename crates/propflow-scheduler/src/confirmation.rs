// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message bodies for appointment confirmations and reminders.
//!
//! Confirmations are type-specific; reminder bodies are rendered at fire
//! time from the live appointment record, so they always carry the current
//! scheduled time.

use propflow_core::types::{Appointment, AppointmentKind, Channel};

/// Type-specific confirmation body, generated before the appointment is
/// considered successfully scheduled.
pub fn confirmation_message(appointment: &Appointment) -> String {
    let time = appointment.scheduled_time.format("%A %d %B %Y, %H:%M UTC");
    match appointment.kind {
        AppointmentKind::Viewing => format!(
            "Appointment confirmed!\n\
             Date & time: {time}\n\
             Property: {property}\n\
             Location: {location}\n\
             Duration: {duration} minutes\n\n\
             You'll receive reminders 24 hours and 2 hours before your appointment. \
             If you need to reschedule, please contact us at least 4 hours in advance.",
            property = appointment.property_id,
            location = appointment.location.as_deref().unwrap_or("Property address"),
            duration = appointment.duration_minutes,
        ),
        AppointmentKind::VirtualTour => format!(
            "Virtual tour scheduled!\n\
             Date & time: {time}\n\
             Property: {property}\n\
             Virtual link: {link}\n\
             Duration: {duration} minutes\n\n\
             You'll receive the virtual tour link 30 minutes before your scheduled time.",
            property = appointment.property_id,
            link = appointment
                .virtual_link
                .as_deref()
                .unwrap_or("Will be sent before the tour"),
            duration = appointment.duration_minutes,
        ),
        AppointmentKind::Consultation => format!(
            "Consultation scheduled!\n\
             Date & time: {time}\n\
             Type: Real estate consultation\n\
             Duration: {duration} minutes\n\n\
             We'll discuss your real estate needs and provide personalized recommendations.",
            duration = appointment.duration_minutes,
        ),
    }
}

/// Reminder body for one channel slot.
pub fn reminder_message(appointment: &Appointment, channel: Channel) -> String {
    let time = appointment.scheduled_time.format("%A %d %B %Y, %H:%M UTC");
    let what = match appointment.kind {
        AppointmentKind::Viewing => "property viewing",
        AppointmentKind::VirtualTour => "virtual tour",
        AppointmentKind::Consultation => "consultation",
    };
    match channel {
        Channel::Email => format!(
            "A reminder about your upcoming {what} of property {property} on {time}. \
             Reply to this email if you have any questions or need to reschedule.",
            property = appointment.property_id,
        ),
        Channel::Sms => format!(
            "Reminder: your {what} is coming up on {time}. See you there!"
        ),
        _ => format!("Your {what} starts soon: {time}."),
    }
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flows through the engine facade: lead intake, booking,
//! nurture switching, and the tick loop, all against a capturing
//! mock channel.

use std::sync::Arc;

use chrono::{Duration, Utc};
use propflow::{
    AppointmentKind, BudgetRange, Channel, Engine, FinancingStatus, Interaction, LeadAttributes,
    LeadId, LeadStatus, Priority, ScheduleRequest, Timeline,
};
use propflow_config::PropflowConfig;
use propflow_nurture::RunState;
use propflow_test_utils::MockChannel;

fn engine() -> (Engine, Arc<MockChannel>) {
    let channel = Arc::new(MockChannel::new());
    let engine =
        Engine::new(PropflowConfig::default(), channel.clone()).expect("default config is valid");
    (engine, channel)
}

fn base_lead(id: &str, name: &str) -> LeadAttributes {
    LeadAttributes {
        id: LeadId(id.into()),
        name: Some(name.into()),
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

/// Budget 600k + immediate + pre-approved + exact address + heavy
/// engagement: every factor maxed.
fn hot_lead(id: &str, name: &str) -> LeadAttributes {
    let mut interactions: Vec<Interaction> = (0..6)
        .map(|i| Interaction {
            timestamp: Utc::now(),
            message: format!("message {i}"),
            response: "reply".into(),
            channel: Channel::Message,
            intent: (i < 4).then(|| "pricing_question".to_string()),
            action: None,
        })
        .collect();
    interactions.extend((0..6).map(|i| Interaction {
        timestamp: Utc::now(),
        message: format!("view {i}"),
        response: String::new(),
        channel: Channel::Message,
        intent: None,
        action: Some("view_property".into()),
    }));

    LeadAttributes {
        budget: Some(BudgetRange {
            min: 400_000,
            max: 600_000,
        }),
        preferred_locations: vec!["123 Main St, Springfield".into()],
        timeline: Some(Timeline::Immediate),
        financing: Some(FinancingStatus::PreApproved),
        interactions,
        ..base_lead(id, name)
    }
}

/// Lands in the 40-59 band: low budget, slow timeline, exploring financing.
fn cool_lead(id: &str, name: &str) -> LeadAttributes {
    LeadAttributes {
        budget: Some(BudgetRange {
            min: 100_000,
            max: 200_000,
        }),
        preferred_locations: vec!["Springfield".into()],
        timeline: Some(Timeline::SixMonths),
        financing: Some(FinancingStatus::Exploring),
        ..base_lead(id, name)
    }
}

fn viewing_request(lead_id: &LeadId, hours_ahead: i64) -> ScheduleRequest {
    ScheduleRequest {
        property_id: "prop_9".into(),
        lead_id: lead_id.clone(),
        scheduled_time: Utc::now() + Duration::hours(hours_ahead),
        duration_minutes: 60,
        kind: AppointmentKind::Viewing,
        location: Some("12 High St".into()),
        virtual_link: None,
    }
}

#[tokio::test]
async fn hot_lead_gets_called_on_the_very_first_tick() {
    let (engine, channel) = engine();

    let report = engine.update_lead(hot_lead("lead_1", "Taylor"));
    assert_eq!(report.score, 100);
    assert_eq!(report.recommendation.priority, Priority::High);
    assert_eq!(report.lead.status, LeadStatus::Qualified);
    assert_eq!(
        engine.nurture_run(&report.lead.id).unwrap().sequence_id.0,
        "hot_lead_sequence"
    );

    // The hot sequence opens with a zero-delay call step.
    let tick = engine.execute_tick().await;
    assert_eq!(tick.claimed, 1);
    assert_eq!(tick.dispatched, 1);
    assert_eq!(tick.failed, 0);

    let messages = channel.sent_messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].body.starts_with("Hi Taylor!"));
    assert_eq!(messages[0].channel, Channel::Call);
    assert_eq!(messages[0].conversation_key, "nurture_lead_1_call");
}

#[tokio::test]
async fn concurrent_ticks_never_double_send() {
    let (engine, channel) = engine();
    engine.update_lead(hot_lead("lead_1", "Taylor"));

    let (a, b) = tokio::join!(engine.execute_tick(), engine.execute_tick());

    assert_eq!(a.dispatched + b.dispatched, 1, "the due step goes out once");
    assert_eq!(channel.sent_count().await, 1);
}

#[tokio::test]
async fn reminders_fire_at_their_offsets_and_are_marked_sent() {
    let (engine, channel) = engine();
    // Zero-score lead: no nurture sequence interferes with the counts.
    let report = engine.update_lead(base_lead("lead_1", "Taylor"));

    let appointment = engine
        .schedule_appointment(viewing_request(&report.lead.id, 25))
        .await
        .unwrap();
    assert_eq!(appointment.reminders.len(), 3);
    // The confirmation went out before schedule_appointment returned.
    assert_eq!(channel.sent_count().await, 1);

    // Two hours in, only the 24h-before email is due.
    let tick = engine.execute_tick_at(Utc::now() + Duration::hours(2)).await;
    assert_eq!(tick.dispatched, 1);

    let messages = channel.sent_messages().await;
    let reminder = messages.last().unwrap();
    assert_eq!(reminder.channel, Channel::Email);
    assert!(reminder.body.contains("prop_9"));

    let stored = engine.get_appointment(&appointment.id).unwrap();
    assert!(stored.reminders[0].sent);
    assert!(!stored.reminders[1].sent);
}

#[tokio::test]
async fn cancelled_appointment_sends_no_further_reminders() {
    let (engine, channel) = engine();
    let report = engine.update_lead(base_lead("lead_1", "Taylor"));

    let appointment = engine
        .schedule_appointment(viewing_request(&report.lead.id, 25))
        .await
        .unwrap();
    let before_cancel = channel.sent_count().await;

    engine.cancel_appointment(&appointment.id, Some("lead asked")).unwrap();

    // Past every reminder offset; nothing may fire.
    let tick = engine.execute_tick_at(Utc::now() + Duration::hours(26)).await;
    assert_eq!(tick.claimed, 0);
    assert_eq!(channel.sent_count().await, before_cancel);
}

#[tokio::test]
async fn score_crossing_into_warm_switches_sequences_from_the_first_step() {
    let (engine, channel) = engine();

    let cool = engine.update_lead(cool_lead("lead_1", "Riley"));
    assert!((40..60).contains(&cool.score), "got {}", cool.score);
    assert_eq!(
        engine.nurture_run(&cool.lead.id).unwrap().sequence_id.0,
        "cool_lead_sequence"
    );

    // Better budget, faster timeline, pre-qualified: the score crosses 60.
    let mut improved = cool_lead("lead_1", "Riley");
    improved.budget = Some(BudgetRange {
        min: 300_000,
        max: 350_000,
    });
    improved.timeline = Some(Timeline::ThreeMonths);
    improved.financing = Some(FinancingStatus::PreQualified);
    let warm = engine.update_lead(improved);
    assert!((60..80).contains(&warm.score), "got {}", warm.score);

    let run = engine.nurture_run(&warm.lead.id).unwrap();
    assert_eq!(run.sequence_id.0, "warm_lead_sequence");
    assert_eq!(run.state, RunState::Running);

    // 25 hours in, the cool sequence's 24h step would have been due; only
    // the warm sequence's first two steps may dispatch.
    let tick = engine.execute_tick_at(Utc::now() + Duration::hours(25)).await;
    assert_eq!(tick.dispatched, 2);

    let bodies: Vec<String> = channel
        .sent_messages()
        .await
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert!(bodies[0].starts_with("Welcome!"));
    assert!(bodies[1].starts_with("I've curated some properties"));
    assert!(
        bodies.iter().all(|b| !b.contains("home buying process")),
        "no cool-tier step may survive the switch"
    );
}

#[tokio::test]
async fn warm_run_completes_when_its_last_step_dispatches() {
    let (engine, _channel) = engine();
    let mut lead = cool_lead("lead_1", "Riley");
    lead.budget = Some(BudgetRange {
        min: 300_000,
        max: 350_000,
    });
    lead.timeline = Some(Timeline::ThreeMonths);
    lead.financing = Some(FinancingStatus::PreQualified);
    let report = engine.update_lead(lead);
    assert_eq!(
        engine.nurture_run(&report.lead.id).unwrap().sequence_id.0,
        "warm_lead_sequence"
    );

    // Past the final 168h step: all four go out, the run completes.
    let tick = engine.execute_tick_at(Utc::now() + Duration::hours(169)).await;
    assert_eq!(tick.dispatched, 4);
    assert_eq!(
        engine.nurture_run(&report.lead.id).unwrap().state,
        RunState::Completed
    );
}

#[tokio::test]
async fn failed_send_retries_on_the_next_tick() {
    let (engine, channel) = engine();
    engine.update_lead(hot_lead("lead_1", "Taylor"));
    channel.fail_next(1).await;

    let first = engine.execute_tick().await;
    assert_eq!(first.failed, 1);
    assert_eq!(first.dispatched, 0);

    let second = engine.execute_tick().await;
    assert_eq!(second.dispatched, 1);
    assert_eq!(channel.sent_count().await, 1);
}

#[tokio::test]
async fn converted_lead_receives_no_further_nurture_steps() {
    let (engine, channel) = engine();
    let report = engine.update_lead(cool_lead("lead_1", "Riley"));
    engine.mark_converted(&report.lead.id).unwrap();

    let tick = engine.execute_tick_at(Utc::now() + Duration::hours(600)).await;
    assert_eq!(tick.claimed, 0, "abandoned steps are cancelled, not claimed");
    assert_eq!(channel.sent_count().await, 0);
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory work-item queue for time-deferred dispatch.
//!
//! Every pending reminder and nurture step is a `(fire_time, payload)` work
//! item. The queue is mutated from two sides: external callers enqueue and
//! cancel, the tick loop claims due items and acks or fails them. Claiming is
//! a compare-and-set on the item status, so two concurrent polls can never
//! dispatch the same item twice.
//!
//! The store is deliberately shaped like a persisted queue (status column,
//! attempt counter, lock-free claim) so a database-backed implementation can
//! replace it without changing callers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use propflow_core::types::{AppointmentId, Channel, LeadId, SequenceId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Groups work items that share a lifecycle: all reminders of one
/// appointment, or all steps of one sequence run. Cancellation and ordering
/// guarantees hold within a group; across groups items are independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupKey {
    Appointment(AppointmentId),
    Run(LeadId, SequenceId),
}

/// What to dispatch when the item comes due. Bodies are rendered at fire
/// time against the live records, never at enqueue time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobPayload {
    Reminder {
        appointment_id: AppointmentId,
        channel: Channel,
    },
    Step {
        lead_id: LeadId,
        sequence_id: SequenceId,
        step_index: usize,
        channel: Channel,
        template_id: String,
        fallback_content: String,
    },
}

/// Lifecycle of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    /// Waiting for its fire time (or for a retry).
    Pending,
    /// Claimed by a tick, dispatch in progress.
    InFlight,
    /// Dispatched successfully.
    Sent,
    /// Invalidated by cancel/reschedule/abandon before it was sent.
    Cancelled,
    /// Exhausted its retry budget.
    Dead,
}

/// One pending dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    pub group: GroupKey,
    /// Position within the group; due items of one group dispatch in this
    /// order regardless of fire-time ties.
    pub order: u32,
    pub fire_time: DateTime<Utc>,
    pub payload: JobPayload,
    pub status: WorkStatus,
    pub attempts: u32,
    /// Set when the group was cancelled while this item was in flight; a
    /// subsequent `fail` drops the item instead of retrying it.
    cancel_requested: bool,
}

/// Shared store of pending work items.
pub struct WorkQueue {
    items: DashMap<u64, WorkItem>,
    next_id: AtomicU64,
    max_attempts: u32,
}

impl WorkQueue {
    /// Create a queue whose items are retried up to `max_attempts` times
    /// before being marked dead.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            items: DashMap::new(),
            next_id: AtomicU64::new(1),
            max_attempts,
        }
    }

    /// Add a pending item. Returns its id.
    pub fn enqueue(
        &self,
        group: GroupKey,
        order: u32,
        fire_time: DateTime<Utc>,
        payload: JobPayload,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.items.insert(
            id,
            WorkItem {
                id,
                group,
                order,
                fire_time,
                payload,
                status: WorkStatus::Pending,
                attempts: 0,
                cancel_requested: false,
            },
        );
        id
    }

    /// Claim every pending item whose fire time has elapsed.
    ///
    /// Claimed items move `Pending -> InFlight` under the shard lock, so a
    /// concurrent claim sees them as taken. The returned batch is sorted by
    /// `(group, order, fire_time)`: within one group the definition order
    /// holds, across groups there is no guarantee.
    pub fn claim_due(&self, now: DateTime<Utc>) -> Vec<WorkItem> {
        let candidates: Vec<u64> = self
            .items
            .iter()
            .filter(|entry| entry.status == WorkStatus::Pending && entry.fire_time <= now)
            .map(|entry| entry.id)
            .collect();

        let mut claimed = Vec::new();
        for id in candidates {
            if let Some(mut entry) = self.items.get_mut(&id) {
                // Re-check under the lock: another poll may have taken it,
                // or a cancel may have landed in between.
                if entry.status == WorkStatus::Pending && entry.fire_time <= now {
                    entry.status = WorkStatus::InFlight;
                    claimed.push(entry.clone());
                }
            }
        }

        claimed.sort_by(|a, b| {
            (&a.group, a.order, a.fire_time).cmp(&(&b.group, b.order, b.fire_time))
        });
        claimed
    }

    /// Record a successful dispatch.
    pub fn ack(&self, id: u64) {
        if let Some(mut entry) = self.items.get_mut(&id) {
            entry.status = WorkStatus::Sent;
        }
    }

    /// Record a failed dispatch.
    ///
    /// The item returns to `Pending` for the next poll until its attempt
    /// budget is exhausted, then it is marked `Dead`. If its group was
    /// cancelled while the dispatch was in flight the item is dropped as
    /// `Cancelled` instead of retried.
    pub fn fail(&self, id: u64) {
        if let Some(mut entry) = self.items.get_mut(&id) {
            entry.attempts += 1;
            if entry.cancel_requested {
                entry.status = WorkStatus::Cancelled;
                debug!(item_id = id, "dropping failed item whose group was cancelled");
            } else if entry.attempts >= self.max_attempts {
                entry.status = WorkStatus::Dead;
                debug!(
                    item_id = id,
                    attempts = entry.attempts,
                    "work item exhausted its retry budget"
                );
            } else {
                entry.status = WorkStatus::Pending;
            }
        }
    }

    /// Invalidate every pending item in a group.
    ///
    /// The next poll simply skips cancelled items; an in-flight dispatch is
    /// not interrupted, but is prevented from retrying if it fails.
    pub fn cancel_group(&self, group: &GroupKey) {
        let mut cancelled = 0usize;
        for mut entry in self.items.iter_mut() {
            if entry.group != *group {
                continue;
            }
            match entry.status {
                WorkStatus::Pending => {
                    entry.status = WorkStatus::Cancelled;
                    cancelled += 1;
                }
                WorkStatus::InFlight => {
                    entry.cancel_requested = true;
                }
                _ => {}
            }
        }
        debug!(?group, cancelled, "cancelled pending work items");
    }

    /// Drop every item that reached a terminal status.
    ///
    /// Sent, cancelled, and dead items carry no further scheduling state
    /// (delivery history lives on the domain records), so the tick loop
    /// sweeps them after each drain to keep the store bounded. Returns the
    /// number of items removed.
    pub fn compact(&self) -> usize {
        let before = self.items.len();
        self.items.retain(|_, item| {
            !matches!(
                item.status,
                WorkStatus::Sent | WorkStatus::Cancelled | WorkStatus::Dead
            )
        });
        let removed = before - self.items.len();
        if removed > 0 {
            debug!(removed, "compacted terminal work items");
        }
        removed
    }

    /// Current status of an item, if it exists.
    pub fn status(&self, id: u64) -> Option<WorkStatus> {
        self.items.get(&id).map(|entry| entry.status)
    }

    /// Number of items in a group still waiting to fire.
    pub fn pending_in_group(&self, group: &GroupKey) -> usize {
        self.items
            .iter()
            .filter(|entry| entry.group == *group && entry.status == WorkStatus::Pending)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn group() -> GroupKey {
        GroupKey::Appointment(AppointmentId("apt_1".into()))
    }

    fn reminder_payload() -> JobPayload {
        JobPayload::Reminder {
            appointment_id: AppointmentId("apt_1".into()),
            channel: Channel::Email,
        }
    }

    #[test]
    fn claim_is_exclusive() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());

        let first = queue.claim_due(now);
        assert_eq!(first.len(), 1);
        let second = queue.claim_due(now);
        assert!(second.is_empty(), "claimed item must not be claimable again");
    }

    #[test]
    fn future_items_are_not_claimed() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        queue.enqueue(group(), 0, now + Duration::hours(1), reminder_payload());
        assert!(queue.claim_due(now).is_empty());
    }

    #[test]
    fn failed_item_retries_until_attempt_budget_exhausted() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        let id = queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());

        for attempt in 1..=2 {
            let due = queue.claim_due(now);
            assert_eq!(due.len(), 1, "attempt {attempt} should re-claim");
            queue.fail(id);
            assert_eq!(queue.status(id), Some(WorkStatus::Pending));
        }

        let due = queue.claim_due(now);
        assert_eq!(due.len(), 1);
        queue.fail(id);
        assert_eq!(queue.status(id), Some(WorkStatus::Dead));
        assert!(queue.claim_due(now).is_empty(), "dead items never fire");
    }

    #[test]
    fn cancel_group_skips_pending_items() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());
        queue.enqueue(group(), 1, now - Duration::minutes(1), reminder_payload());

        queue.cancel_group(&group());
        assert!(queue.claim_due(now).is_empty());
        assert_eq!(queue.pending_in_group(&group()), 0);
    }

    #[test]
    fn cancel_during_flight_prevents_retry() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        let id = queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());

        let due = queue.claim_due(now);
        assert_eq!(due.len(), 1);
        queue.cancel_group(&group());
        queue.fail(id);
        assert_eq!(queue.status(id), Some(WorkStatus::Cancelled));
    }

    #[test]
    fn ack_after_cancel_request_still_counts_as_sent() {
        // An in-flight dispatch that succeeds stays sent; cancellation does
        // not rewrite history.
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        let id = queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());
        queue.claim_due(now);
        queue.cancel_group(&group());
        queue.ack(id);
        assert_eq!(queue.status(id), Some(WorkStatus::Sent));
    }

    #[test]
    fn compact_drops_only_terminal_items() {
        let queue = WorkQueue::new(1);
        let now = Utc::now();
        let sent = queue.enqueue(group(), 0, now - Duration::minutes(1), reminder_payload());
        let future = queue.enqueue(group(), 1, now + Duration::hours(1), reminder_payload());
        let dead = queue.enqueue(group(), 2, now - Duration::minutes(1), reminder_payload());
        let inflight = queue.enqueue(group(), 3, now - Duration::minutes(1), reminder_payload());

        queue.claim_due(now);
        queue.ack(sent);
        // max_attempts is 1, so a single failure is terminal.
        queue.fail(dead);

        assert_eq!(queue.compact(), 2);
        assert_eq!(queue.status(sent), None);
        assert_eq!(queue.status(dead), None);
        assert_eq!(queue.status(future), Some(WorkStatus::Pending));
        assert_eq!(queue.status(inflight), Some(WorkStatus::InFlight));
    }

    #[test]
    fn due_items_sorted_by_group_order_not_fire_time() {
        let queue = WorkQueue::new(3);
        let now = Utc::now();
        let run = GroupKey::Run(LeadId("lead_1".into()), SequenceId("warm".into()));
        // Later step has the earlier fire time; definition order must win.
        queue.enqueue(
            run.clone(),
            1,
            now - Duration::minutes(30),
            reminder_payload(),
        );
        queue.enqueue(
            run.clone(),
            0,
            now - Duration::minutes(5),
            reminder_payload(),
        );

        let due = queue.claim_due(now);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].order, 0);
        assert_eq!(due[1].order, 1);
    }
}

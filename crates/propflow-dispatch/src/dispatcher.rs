// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded concurrent dispatch of claimed work items.
//!
//! Sends must not block the timer loop for other leads: each group of items
//! runs as its own task, sends are capped by a semaphore and wrapped in a
//! per-send timeout. Within a group items go out one at a time in claim
//! order, preserving the per-appointment and per-sequence ordering
//! guarantees; across groups everything is concurrent.

use std::sync::Arc;
use std::time::Duration;

use propflow_core::channel::{OutboundChannel, OutboundMessage};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::queue::{GroupKey, JobPayload, WorkItem, WorkQueue};

/// A claimed work item whose message body has been rendered.
#[derive(Debug, Clone)]
pub struct RenderedJob {
    pub item: WorkItem,
    pub message: OutboundMessage,
}

/// Result of one dispatch attempt, reported back to the caller so it can
/// update domain records (mark reminders sent, complete sequence runs).
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub item_id: u64,
    pub payload: JobPayload,
    pub delivered: bool,
}

/// Sends rendered jobs through the outbound channel with bounded concurrency.
pub struct Dispatcher {
    channel: Arc<dyn OutboundChannel + Send + Sync>,
    permits: Arc<Semaphore>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        channel: Arc<dyn OutboundChannel + Send + Sync>,
        worker_limit: usize,
        send_timeout: Duration,
    ) -> Self {
        Self {
            channel,
            permits: Arc::new(Semaphore::new(worker_limit)),
            send_timeout,
        }
    }

    /// Dispatch a batch of rendered jobs.
    ///
    /// `jobs` must be in claim order (sorted by group, then order); the batch
    /// is partitioned into per-group runs that execute concurrently. Every
    /// job is acked or failed on the queue before its outcome is reported.
    /// Failures are logged and never propagate: delivery is best-effort.
    pub async fn run(&self, queue: Arc<WorkQueue>, jobs: Vec<RenderedJob>) -> Vec<DispatchOutcome> {
        let mut groups: Vec<(GroupKey, Vec<RenderedJob>)> = Vec::new();
        for job in jobs {
            match groups.last_mut() {
                Some((group, batch)) if *group == job.item.group => batch.push(job),
                _ => groups.push((job.item.group.clone(), vec![job])),
            }
        }

        let mut tasks = JoinSet::new();
        for (group, batch) in groups {
            let channel = Arc::clone(&self.channel);
            let permits = Arc::clone(&self.permits);
            let queue = Arc::clone(&queue);
            let send_timeout = self.send_timeout;

            tasks.spawn(async move {
                let mut outcomes = Vec::with_capacity(batch.len());
                for job in batch {
                    let permit = permits
                        .acquire()
                        .await
                        .expect("dispatch semaphore is never closed");
                    let result =
                        tokio::time::timeout(send_timeout, channel.send(job.message)).await;
                    drop(permit);

                    let delivered = match result {
                        Ok(Ok(())) => {
                            queue.ack(job.item.id);
                            debug!(item_id = job.item.id, group = ?group, "dispatched");
                            true
                        }
                        Ok(Err(err)) => {
                            queue.fail(job.item.id);
                            warn!(
                                item_id = job.item.id,
                                error = %err,
                                "dispatch failed, item queued for retry"
                            );
                            false
                        }
                        Err(_) => {
                            queue.fail(job.item.id);
                            warn!(
                                item_id = job.item.id,
                                timeout_secs = send_timeout.as_secs(),
                                "dispatch timed out, item queued for retry"
                            );
                            false
                        }
                    };
                    outcomes.push(DispatchOutcome {
                        item_id: job.item.id,
                        payload: job.item.payload.clone(),
                        delivered,
                    });
                }
                outcomes
            });
        }

        let mut all = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcomes) => all.extend(outcomes),
                Err(err) => warn!(error = %err, "dispatch task panicked"),
            }
        }
        all
    }
}

// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock outbound channel for deterministic testing.
//!
//! `MockChannel` implements `OutboundChannel` with captured outbound messages
//! for assertion in tests, and injectable failures to exercise the retry and
//! best-effort paths.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use propflow_core::channel::{OutboundChannel, OutboundMessage};
use propflow_core::error::PropflowError;

/// A mock delivery channel for testing.
///
/// Messages passed to `send()` are captured and retrievable via
/// `sent_messages()`. `fail_next(n)` makes the next `n` sends return a
/// dispatch error instead of being captured.
pub struct MockChannel {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failures_remaining: Arc<Mutex<usize>>,
}

impl MockChannel {
    /// Create a new mock channel with an empty capture buffer.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failures_remaining: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` sends fail with a dispatch error.
    pub async fn fail_next(&self, n: usize) {
        *self.failures_remaining.lock().await = n;
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Bodies of all captured messages, in send order.
    pub async fn sent_bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutboundChannel for MockChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<(), PropflowError> {
        let mut failures = self.failures_remaining.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(PropflowError::dispatch("mock channel failure injected"));
        }
        drop(failures);

        self.sent.lock().await.push(msg);
        Ok(())
    }
}

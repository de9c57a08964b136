// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound channel trait, the single point where the engine touches the
//! outside world.
//!
//! Both the appointment scheduler and the nurture orchestrator depend on this
//! trait, never on each other. Any real messaging, email, or SMS provider can
//! implement it.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PropflowError;
use crate::types::Channel;

/// A rendered message ready for delivery.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Rendered message body.
    pub body: String,
    /// Conversation the message belongs to, e.g. `apt_<id>` for appointment
    /// traffic or `nurture_<lead>_<channel>` for sequence steps.
    pub conversation_key: String,
    pub channel: Channel,
    /// Provider-specific metadata passed through untouched.
    pub metadata: Value,
}

impl OutboundMessage {
    pub fn new(body: impl Into<String>, conversation_key: impl Into<String>, channel: Channel) -> Self {
        Self {
            body: body.into(),
            conversation_key: conversation_key.into(),
            channel,
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Adapter for one-way message delivery.
///
/// Delivery is best-effort: a failed `send` is reported as
/// [`PropflowError::Dispatch`] and retried by the caller, it never rolls back
/// the scheduling state that produced the message.
#[async_trait]
pub trait OutboundChannel {
    /// Deliver a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<(), PropflowError>;
}

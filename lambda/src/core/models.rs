use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Trigger recorded when the invocation payload carries no `detail-type`.
pub const DEFAULT_TRIGGER: &str = "API CALL";
pub const DETAIL_TYPE_KEY: &str = "detail-type";

/// Separator placed between message bodies in a notification.
pub const BODY_SEPARATOR: &str = "\n\n";

/// One delivery received from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    /// One-time handle tied to this delivery; required to delete it.
    pub receipt_handle: String,
}

impl QueueMessage {
    pub fn new(body: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

/// Messages collected during a single cycle, in receive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch {
    messages: Vec<QueueMessage>,
    capacity: usize,
}

impl MessageBatch {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.messages.len())
    }

    /// Appends messages until the batch is full. Returns how many overflowed.
    pub fn extend_bounded(&mut self, incoming: Vec<QueueMessage>) -> usize {
        let take = incoming.len().min(self.remaining());
        let overflow = incoming.len() - take;
        self.messages.extend(incoming.into_iter().take(take));
        overflow
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueMessage> {
        self.messages.iter()
    }
}

/// Aggregated payload published to the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Joins every body with a blank line. Returns `None` for an empty batch.
    #[must_use]
    pub fn from_batch(subject: &str, batch: &MessageBatch) -> Option<Self> {
        if batch.is_empty() {
            return None;
        }
        let body = batch
            .iter()
            .map(|m| m.body.as_str())
            .collect::<Vec<_>>()
            .join(BODY_SEPARATOR);
        Some(Self {
            subject: subject.to_string(),
            body,
        })
    }
}

/// Reads `detail-type` from the invocation payload, defaulting to [`DEFAULT_TRIGGER`].
#[must_use]
pub fn trigger_hint(payload: &Value) -> String {
    payload
        .get(DETAIL_TYPE_KEY)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TRIGGER)
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Queue lookup or a receive call failed; nothing was relayed.
    PollFailed,
    Empty,
    /// Publish failed; the batch stays on the queue for redelivery.
    PublishFailed { retained: usize },
    Relayed {
        relayed: usize,
        deleted: usize,
        delete_failures: usize,
    },
}

impl CycleOutcome {
    #[must_use]
    pub fn relayed_count(&self) -> usize {
        match self {
            CycleOutcome::Relayed { relayed, .. } => *relayed,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationSummary {
    pub function_name: String,
    pub trigger: String,
    pub relayed_count: usize,
    pub outcome: CycleOutcome,
}

impl InvocationSummary {
    pub fn new(function_name: impl Into<String>, trigger: impl Into<String>, outcome: CycleOutcome) -> Self {
        Self {
            function_name: function_name.into(),
            trigger: trigger.into(),
            relayed_count: outcome.relayed_count(),
            outcome,
        }
    }
}

impl fmt::Display for InvocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lambda function name = {}. Detail type = {}. Processed messages count = {}.",
            self.function_name, self.trigger, self.relayed_count
        )
    }
}

//! In-memory queue and topic used for local runs and tests.
//!
//! `InMemoryQueue` mimics SQS visibility: received messages move in flight and
//! only leave for good when deleted. `redeliver` plays the role of the
//! visibility timeout expiring.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{QueueClient, TopicClient};
use crate::core::models::{Notification, QueueMessage};
use crate::errors::RelayError;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<QueueMessage>,
    in_flight: Vec<QueueMessage>,
    receive_calls: Vec<usize>,
    delete_calls: Vec<String>,
    deleted: Vec<String>,
    fail_resolve: bool,
    fail_receive_on_call: Option<usize>,
    fail_delete: HashSet<String>,
}

#[derive(Debug)]
pub struct InMemoryQueue {
    url: String,
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Enqueues bodies; the receipt handle of each is `rh-<body>`.
    #[must_use]
    pub fn with_bodies(self, bodies: &[&str]) -> Self {
        {
            let mut state = lock(&self.state);
            state.pending.extend(
                bodies
                    .iter()
                    .map(|b| QueueMessage::new(*b, format!("rh-{b}"))),
            );
        }
        self
    }

    #[must_use]
    pub fn failing_resolve(self) -> Self {
        lock(&self.state).fail_resolve = true;
        self
    }

    /// Fails the n-th (zero based) receive call of the queue's lifetime.
    #[must_use]
    pub fn failing_receive_on_call(self, call: usize) -> Self {
        lock(&self.state).fail_receive_on_call = Some(call);
        self
    }

    #[must_use]
    pub fn failing_delete(self, receipt_handle: &str) -> Self {
        lock(&self.state).fail_delete.insert(receipt_handle.to_string());
        self
    }

    /// Returns every undeleted in-flight message to the front of the queue.
    pub fn redeliver(&self) {
        let mut state = lock(&self.state);
        let in_flight = std::mem::take(&mut state.in_flight);
        for message in in_flight.into_iter().rev() {
            state.pending.push_front(message);
        }
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    #[must_use]
    pub fn in_flight_len(&self) -> usize {
        lock(&self.state).in_flight.len()
    }

    /// `max_messages` requested by each receive call, in order.
    #[must_use]
    pub fn receive_calls(&self) -> Vec<usize> {
        lock(&self.state).receive_calls.clone()
    }

    /// Receipt handles of every attempted delete, including failed ones.
    #[must_use]
    pub fn delete_calls(&self) -> Vec<String> {
        lock(&self.state).delete_calls.clone()
    }

    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.state).deleted.clone()
    }
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, RelayError> {
        if lock(&self.state).fail_resolve {
            return Err(RelayError::Transport(format!(
                "queue {queue_name} does not exist"
            )));
        }
        Ok(self.url.clone())
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: usize,
        _wait_seconds: i32,
    ) -> Result<Vec<QueueMessage>, RelayError> {
        let mut state = lock(&self.state);
        let call = state.receive_calls.len();
        state.receive_calls.push(max_messages);
        if queue_url != self.url {
            return Err(RelayError::Transport(format!("unknown queue url {queue_url}")));
        }
        if state.fail_receive_on_call == Some(call) {
            return Err(RelayError::Transport("receive timed out".to_string()));
        }

        let take = max_messages.min(state.pending.len());
        let received: Vec<QueueMessage> = state.pending.drain(..take).collect();
        state.in_flight.extend(received.iter().cloned());
        Ok(received)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), RelayError> {
        let mut state = lock(&self.state);
        state.delete_calls.push(receipt_handle.to_string());
        if queue_url != self.url || state.fail_delete.contains(receipt_handle) {
            return Err(RelayError::Transport(format!(
                "could not delete {receipt_handle}"
            )));
        }
        state.in_flight.retain(|m| m.receipt_handle != receipt_handle);
        state.deleted.push(receipt_handle.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingTopic {
    published: Mutex<Vec<(String, Notification)>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingTopic {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Successful publishes as `(topic_arn, notification)`.
    #[must_use]
    pub fn published(&self) -> Vec<(String, Notification)> {
        lock(&self.published).clone()
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        *lock(&self.attempts)
    }
}

#[async_trait]
impl TopicClient for RecordingTopic {
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), RelayError> {
        *lock(&self.attempts) += 1;
        if self.fail {
            return Err(RelayError::Transport("publish throttled".to_string()));
        }
        lock(&self.published).push((
            topic_arn.to_string(),
            Notification {
                subject: subject.to_string(),
                body: body.to_string(),
            },
        ));
        Ok(())
    }
}

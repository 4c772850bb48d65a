//! Poll, aggregate, publish, delete.
//!
//! Each phase returns its own result type and the cycle decides the fallback,
//! so every failure combination is visible in one `match`. Messages are only
//! deleted after the notification carrying them has been published. A failed
//! delete after a successful publish means the message is redelivered and
//! notified again; that duplicate is accepted (at-least-once).

use std::fmt;

use tracing::{debug, info, warn};

use crate::clients::{QueueClient, TopicClient};
use crate::core::config::{RelayConfig, SQS_MAX_MESSAGES_PER_RECEIVE};
use crate::core::models::{CycleOutcome, InvocationSummary, MessageBatch, Notification};
use crate::errors::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Polling,
    Empty,
    Publishing,
    Deleting,
    PublishFailed,
    Done,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Polling => "polling",
            CycleState::Empty => "empty",
            CycleState::Publishing => "publishing",
            CycleState::Deleting => "deleting",
            CycleState::PublishFailed => "publish_failed",
            CycleState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-cycle state tracker. Never outlives `run_cycle`.
#[derive(Debug)]
struct Cycle {
    state: CycleState,
    history: Vec<CycleState>,
}

impl Cycle {
    fn start() -> Self {
        Self {
            state: CycleState::Idle,
            history: vec![CycleState::Idle],
        }
    }

    fn advance(&mut self, next: CycleState) {
        debug!(from = %self.state, to = %next, "Relay cycle transition");
        self.state = next;
        self.history.push(next);
    }
}

/// Batch received in the poll phase together with the queue URL it came from.
#[derive(Debug)]
pub struct PolledBatch {
    pub queue_url: String,
    pub batch: MessageBatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Result of one cycle: the summary plus the states it went through.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub summary: InvocationSummary,
    pub states: Vec<CycleState>,
}

pub struct RelayEngine<Q, T> {
    queue: Q,
    topic: T,
    config: RelayConfig,
}

impl<Q, T> RelayEngine<Q, T>
where
    Q: QueueClient,
    T: TopicClient,
{
    pub fn new(queue: Q, topic: T, config: RelayConfig) -> Self {
        Self {
            queue,
            topic,
            config,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn topic(&self) -> &T {
        &self.topic
    }

    /// Runs one relay cycle. Transport failures never escape; they are logged
    /// and reflected in the summary's outcome.
    pub async fn run_cycle(&self, function_name: &str, trigger: &str) -> CycleReport {
        let mut cycle = Cycle::start();

        cycle.advance(CycleState::Polling);
        let outcome = match self.poll().await {
            Err(e) => {
                warn!(
                    queue = %self.config.queue_name,
                    error = %e,
                    "Failed to receive messages from {}", self.config.queue_name
                );
                cycle.advance(CycleState::Empty);
                CycleOutcome::PollFailed
            }
            Ok(polled) if polled.batch.is_empty() => {
                info!(queue = %self.config.queue_name, "No SQS messages to process");
                cycle.advance(CycleState::Empty);
                CycleOutcome::Empty
            }
            Ok(polled) => {
                cycle.advance(CycleState::Publishing);
                match self.publish(&polled.batch).await {
                    Err(e) => {
                        warn!(
                            topic = %self.config.topic_arn,
                            count = polled.batch.len(),
                            error = %e,
                            "Failed to publish notification; messages left on the queue"
                        );
                        cycle.advance(CycleState::PublishFailed);
                        CycleOutcome::PublishFailed {
                            retained: polled.batch.len(),
                        }
                    }
                    Ok(()) => {
                        cycle.advance(CycleState::Deleting);
                        let report = self.delete_batch(&polled).await;
                        CycleOutcome::Relayed {
                            relayed: polled.batch.len(),
                            deleted: report.deleted,
                            delete_failures: report.failed,
                        }
                    }
                }
            }
        };
        cycle.advance(CycleState::Done);

        CycleReport {
            summary: InvocationSummary::new(function_name, trigger, outcome),
            states: cycle.history,
        }
    }

    /// Resolves the queue and drains up to `max_batch` messages.
    ///
    /// Any failure discards what was received so far; those messages become
    /// visible again once their visibility timeout lapses.
    ///
    /// # Errors
    ///
    /// Returns the first transport error from the lookup or a receive call.
    pub async fn poll(&self) -> Result<PolledBatch, RelayError> {
        let queue_url = self
            .queue
            .resolve_queue_url(&self.config.queue_name)
            .await?;
        let mut batch = MessageBatch::with_capacity(self.config.max_batch);

        for attempt in 0..self.config.receive_attempts {
            if batch.is_full() {
                break;
            }
            let want = batch.remaining().min(SQS_MAX_MESSAGES_PER_RECEIVE);
            let received = self
                .queue
                .receive(&queue_url, want, self.config.wait_seconds)
                .await?;
            debug!(attempt, requested = want, received = received.len(), "Receive call finished");
            if received.is_empty() {
                break;
            }
            let overflow = batch.extend_bounded(received);
            if overflow > 0 {
                warn!(overflow, "Queue returned more messages than requested; extras left in flight");
            }
        }

        Ok(PolledBatch { queue_url, batch })
    }

    /// Publishes the whole batch as a single notification.
    ///
    /// # Errors
    ///
    /// Returns the topic client's transport error unchanged.
    pub async fn publish(&self, batch: &MessageBatch) -> Result<(), RelayError> {
        let Some(notification) = Notification::from_batch(&self.config.subject, batch) else {
            return Ok(());
        };
        self.topic
            .publish(
                &self.config.topic_arn,
                &notification.subject,
                &notification.body,
            )
            .await?;
        info!(
            topic = %self.config.topic_arn,
            count = batch.len(),
            "Published notification"
        );
        Ok(())
    }

    /// Deletes every message of a published batch. One failure does not stop the rest.
    pub async fn delete_batch(&self, polled: &PolledBatch) -> DeleteReport {
        info!(queue_url = %polled.queue_url, "Deleting SQS messages");
        let mut report = DeleteReport::default();
        for message in polled.batch.iter() {
            match self
                .queue
                .delete(&polled.queue_url, &message.receipt_handle)
                .await
            {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(
                        queue_url = %polled.queue_url,
                        receipt_handle = %message.receipt_handle,
                        error = %e,
                        "Failed to delete SQS message; it may be relayed again"
                    );
                    report.failed += 1;
                }
            }
        }
        info!(
            queue_url = %polled.queue_url,
            deleted = report.deleted,
            failed = report.failed,
            "Deleted SQS messages"
        );
        report
    }
}

//! Client seams for the queue and topic backends
//!
//! The relay engine only talks to these traits; the SQS and SNS adapters are
//! the production implementations.

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod sns;
pub mod sqs;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::models::QueueMessage;
use crate::errors::RelayError;

#[cfg(any(test, feature = "test-util"))]
pub use memory::{InMemoryQueue, RecordingTopic};
pub use sns::SnsTopic;
pub use sqs::SqsQueue;

#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Resolves a logical queue name to the URL every other call needs.
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, RelayError>;

    /// Long-polls for up to `max_messages`. An empty result is not an error.
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: usize,
        wait_seconds: i32,
    ) -> Result<Vec<QueueMessage>, RelayError>;

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), RelayError>;
}

#[async_trait]
pub trait TopicClient: Send + Sync {
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), RelayError>;
}

// Lets several engines share one client.
#[async_trait]
impl<Q: QueueClient + ?Sized> QueueClient for Arc<Q> {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, RelayError> {
        (**self).resolve_queue_url(queue_name).await
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: usize,
        wait_seconds: i32,
    ) -> Result<Vec<QueueMessage>, RelayError> {
        (**self).receive(queue_url, max_messages, wait_seconds).await
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), RelayError> {
        (**self).delete(queue_url, receipt_handle).await
    }
}

#[async_trait]
impl<T: TopicClient + ?Sized> TopicClient for Arc<T> {
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), RelayError> {
        (**self).publish(topic_arn, subject, body).await
    }
}

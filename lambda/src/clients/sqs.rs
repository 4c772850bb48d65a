use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::Message;
use tracing::{debug, warn};

use super::QueueClient;
use crate::core::config::SQS_MAX_MESSAGES_PER_RECEIVE;
use crate::core::models::QueueMessage;
use crate::errors::RelayError;

/// SQS-backed queue client. Cheap to clone; the SDK client is reference counted.
#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: Client,
}

impl SqsQueue {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn from_conf(shared: &SdkConfig) -> Self {
        Self::new(Client::new(shared))
    }
}

#[async_trait]
impl QueueClient for SqsQueue {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, RelayError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await?;

        output.queue_url.ok_or_else(|| {
            RelayError::Transport(format!("GetQueueUrl returned no URL for {queue_name}"))
        })
    }

    async fn receive(
        &self,
        queue_url: &str,
        max_messages: usize,
        wait_seconds: i32,
    ) -> Result<Vec<QueueMessage>, RelayError> {
        // Bounded by SQS_MAX_MESSAGES_PER_RECEIVE (10), so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let max = max_messages.clamp(1, SQS_MAX_MESSAGES_PER_RECEIVE) as i32;

        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max)
            .wait_time_seconds(wait_seconds)
            .send()
            .await?;

        let messages = into_queue_messages(output.messages.unwrap_or_default());
        debug!(queue_url, count = messages.len(), "Received SQS messages");
        Ok(messages)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), RelayError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;
        Ok(())
    }
}

/// Keeps receive order; drops deliveries that cannot be relayed or deleted.
fn into_queue_messages(messages: Vec<Message>) -> Vec<QueueMessage> {
    messages
        .into_iter()
        .filter_map(|m| match (m.body, m.receipt_handle) {
            (Some(body), Some(receipt_handle)) => Some(QueueMessage {
                body,
                receipt_handle,
            }),
            (_, _) => {
                warn!(
                    message_id = m.message_id.as_deref().unwrap_or("unknown"),
                    "Skipping SQS message without body or receipt handle"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, body: Option<&str>, receipt_handle: Option<&str>) -> Message {
        Message::builder()
            .message_id(id)
            .set_body(body.map(str::to_string))
            .set_receipt_handle(receipt_handle.map(str::to_string))
            .build()
    }

    #[test]
    fn complete_messages_keep_receive_order() {
        let messages = into_queue_messages(vec![
            message("1", Some("first"), Some("rh-1")),
            message("2", Some("second"), Some("rh-2")),
        ]);
        assert_eq!(
            messages,
            vec![
                QueueMessage::new("first", "rh-1"),
                QueueMessage::new("second", "rh-2"),
            ]
        );
    }

    #[test]
    fn messages_missing_body_or_receipt_handle_are_dropped() {
        let messages = into_queue_messages(vec![
            message("1", None, Some("rh-1")),
            message("2", Some("kept"), Some("rh-2")),
            message("3", Some("orphan"), None),
            message("4", Some("also kept"), Some("rh-4")),
        ]);
        assert_eq!(
            messages,
            vec![
                QueueMessage::new("kept", "rh-2"),
                QueueMessage::new("also kept", "rh-4"),
            ]
        );
    }

    #[test]
    fn empty_response_is_not_an_error() {
        assert!(into_queue_messages(Vec::new()).is_empty());
    }
}

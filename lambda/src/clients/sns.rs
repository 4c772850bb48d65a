use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::Client;
use tracing::debug;

use super::TopicClient;
use crate::errors::RelayError;

#[derive(Debug, Clone)]
pub struct SnsTopic {
    client: Client,
}

impl SnsTopic {
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
impl TopicClient for SnsTopic {
    async fn publish(&self, topic_arn: &str, subject: &str, body: &str) -> Result<(), RelayError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(body)
            .send()
            .await?;

        debug!(
            topic_arn,
            message_id = output.message_id.as_deref().unwrap_or("unknown"),
            "Published SNS notification"
        );
        Ok(())
    }
}

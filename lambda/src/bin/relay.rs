// This is the Lambda bootstrap entry point for the SQS-to-SNS relay function

use std::sync::Arc;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use relay::clients::{SnsTopic, SqsQueue};
use relay::core::config::RelayConfig;
use relay::relay::{RelayEngine, handler};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    relay::setup_logging();

    // Fail fast on a bad environment, before the first invocation.
    let config = RelayConfig::from_env().context("loading relay configuration")?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let shared = loader.load().await;

    let queue = SqsQueue::from_conf(&shared);
    let topic = SnsTopic::from_conf(&shared);
    info!(
        queue = %config.queue_name,
        topic = %config.topic_arn,
        max_batch = config.max_batch,
        "Initialized relay clients"
    );

    // Built once per process and shared by every invocation it serves.
    let engine = Arc::new(RelayEngine::new(queue, topic, config));

    run(service_fn(move |event: LambdaEvent<Value>| {
        let engine = Arc::clone(&engine);
        async move { handler(&*engine, event).await }
    }))
    .await
}

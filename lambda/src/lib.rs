/// CloudX relay - moves messages from an SQS queue to an SNS topic.
///
/// This crate implements two Lambda functions:
/// 1. A relay Lambda that drains a small batch from SQS, publishes the joined
///    bodies as one SNS notification, then deletes what was published
/// 2. An upload notifier Lambda that logs the keys of newly uploaded S3 objects
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - SQS as the pull-based source and SNS as the push-based sink
/// - Traits in [`clients`] so the engine runs against in-memory fakes in tests
/// - Tokio for async runtime
///
/// # Example
///
/// ```
/// use relay::clients::{InMemoryQueue, RecordingTopic};
/// use relay::core::config::RelayConfig;
/// use relay::relay::RelayEngine;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RelayConfig::from_lookup(|key| match key {
///         "SQS_QUEUE_NAME" => Some("uploads".to_string()),
///         "SNS_TOPIC_ARN" => Some("arn:aws:sns:eu-west-1:123456789012:uploads".to_string()),
///         _ => None,
///     })?;
///
///     let queue = InMemoryQueue::new("https://sqs.local/uploads").with_bodies(&["m1", "m2"]);
///     let engine = RelayEngine::new(queue, RecordingTopic::new(), config);
///
///     let report = engine.run_cycle("demo", "API CALL").await;
///     assert_eq!(report.summary.relayed_count, 2);
///     println!("{}", report.summary);
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod clients;
pub mod core;
pub mod errors;
pub mod relay;
pub mod upload;

pub use crate::errors::RelayError;
pub use crate::relay::RelayEngine;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level comes from `RUST_LOG` and defaults
/// to `info`. Calling it again after a subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// // Initialize structured logging at the start of your Lambda handler
/// relay::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

use super::engine::RelayEngine;
use crate::clients::{QueueClient, TopicClient};
use crate::core::models::{InvocationSummary, trigger_hint};

pub use self::function_handler as handler;

/// Lambda handler for the relay entrypoint. Runs one cycle, logs the summary line
/// and hands the summary back as the invocation response.
///
/// # Errors
///
/// Never fails once the engine is built; queue and topic failures are logged
/// inside the cycle.
#[tracing::instrument(level = "info", skip(engine, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler<Q, T>(
    engine: &RelayEngine<Q, T>,
    event: LambdaEvent<Value>,
) -> Result<InvocationSummary, Error>
where
    Q: QueueClient,
    T: TopicClient,
{
    let trigger = trigger_hint(&event.payload);
    let function_name = &event.context.env_config.function_name;

    let report = engine.run_cycle(function_name, &trigger).await;
    info!(outcome = ?report.summary.outcome, "{}", report.summary);

    Ok(report.summary)
}

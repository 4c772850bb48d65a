use std::sync::Arc;

use lambda_runtime::{Context, LambdaEvent};
use relay::clients::{InMemoryQueue, RecordingTopic};
use relay::core::config::RelayConfig;
use relay::core::models::{CycleOutcome, DEFAULT_TRIGGER, trigger_hint};
use relay::relay::{RelayEngine, handler};
use serde_json::json;

const URL: &str = "https://sqs.eu-west-1.amazonaws.com/123456789012/uploads";
const TOPIC: &str = "arn:aws:sns:eu-west-1:123456789012:uploads";

fn config() -> RelayConfig {
    RelayConfig::from_lookup(|key| match key {
        "SQS_QUEUE_NAME" => Some("uploads".to_string()),
        "SNS_TOPIC_ARN" => Some(TOPIC.to_string()),
        _ => None,
    })
    .unwrap()
}

#[test]
fn test_trigger_hint_defaults_to_api_call() {
    assert_eq!(trigger_hint(&json!({})), "API CALL");
    assert_eq!(trigger_hint(&json!({ "detail-type": "X" })), "X");
    assert_eq!(trigger_hint(&json!("not an object")), DEFAULT_TRIGGER);
}

#[tokio::test]
async fn test_handler_relays_three_messages() {
    let queue = InMemoryQueue::new(URL).with_bodies(&["m1", "m2", "m3"]);
    let engine = RelayEngine::new(queue, RecordingTopic::new(), config());
    let event = LambdaEvent::new(
        json!({ "detail-type": "Scheduled Event" }),
        Context::default(),
    );

    let summary = handler(&engine, event).await.unwrap();

    assert_eq!(summary.relayed_count, 3);
    assert_eq!(summary.trigger, "Scheduled Event");
    assert_eq!(
        engine.topic().published()[0].1.body,
        "m1\n\nm2\n\nm3"
    );
    assert_eq!(engine.queue().deleted(), vec!["rh-m1", "rh-m2", "rh-m3"]);
    assert_eq!(engine.queue().pending_len() + engine.queue().in_flight_len(), 0);
}

#[tokio::test]
async fn test_handler_without_detail_type_reports_api_call() {
    let engine = RelayEngine::new(InMemoryQueue::new(URL), RecordingTopic::new(), config());
    let event = LambdaEvent::new(json!({}), Context::default());

    let summary = handler(&engine, event).await.unwrap();

    assert_eq!(summary.trigger, "API CALL");
    assert_eq!(summary.relayed_count, 0);
    assert_eq!(summary.outcome, CycleOutcome::Empty);
}

#[tokio::test]
async fn test_failed_publish_is_relayed_after_redelivery() {
    let queue = Arc::new(InMemoryQueue::new(URL).with_bodies(&["a", "b"]));
    let failing = RelayEngine::new(Arc::clone(&queue), RecordingTopic::failing(), config());

    let report = failing.run_cycle("relay", DEFAULT_TRIGGER).await;
    assert_eq!(report.summary.relayed_count, 0);
    assert!(queue.delete_calls().is_empty());
    assert_eq!(queue.in_flight_len(), 2);

    // Visibility timeout lapses; a later invocation with a healthy topic
    // picks up the same messages.
    queue.redeliver();
    assert_eq!(queue.pending_len(), 2);

    let healthy = RelayEngine::new(Arc::clone(&queue), RecordingTopic::new(), config());
    let report = healthy.run_cycle("relay", DEFAULT_TRIGGER).await;
    assert_eq!(report.summary.relayed_count, 2);
    assert_eq!(healthy.topic().published()[0].1.body, "a\n\nb");
    assert_eq!(queue.deleted(), vec!["rh-a", "rh-b"]);
}

#[tokio::test]
async fn test_deleted_iff_published_across_batch_sizes() {
    let bodies = ["m0", "m1", "m2"];
    for size in 0..=bodies.len() {
        for publish_ok in [true, false] {
            let queue = InMemoryQueue::new(URL).with_bodies(&bodies[..size]);
            let topic = if publish_ok {
                RecordingTopic::new()
            } else {
                RecordingTopic::failing()
            };
            let engine = RelayEngine::new(queue, topic, config());

            let report = engine.run_cycle("relay", DEFAULT_TRIGGER).await;

            let expected: Vec<String> = if publish_ok {
                bodies[..size].iter().map(|b| format!("rh-{b}")).collect()
            } else {
                Vec::new()
            };
            assert_eq!(engine.queue().deleted(), expected, "size={size} ok={publish_ok}");
            let expected_count = if publish_ok { size } else { 0 };
            assert_eq!(report.summary.relayed_count, expected_count);
            assert_eq!(engine.topic().attempts(), usize::from(size > 0));
        }
    }
}

#[test]
fn test_summary_line_format() {
    let summary = relay::core::models::InvocationSummary::new(
        "relay-fn",
        "API CALL",
        CycleOutcome::Relayed {
            relayed: 2,
            deleted: 2,
            delete_failures: 0,
        },
    );
    assert_eq!(
        summary.to_string(),
        "Lambda function name = relay-fn. Detail type = API CALL. Processed messages count = 2."
    );
}

#[test]
fn test_summary_response_shape() {
    let summary = relay::core::models::InvocationSummary::new(
        "relay-fn",
        "Scheduled Event",
        CycleOutcome::PublishFailed { retained: 2 },
    );
    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        json!({
            "function_name": "relay-fn",
            "trigger": "Scheduled Event",
            "relayed_count": 0,
            "outcome": { "outcome": "publish_failed", "retained": 2 }
        })
    );
}

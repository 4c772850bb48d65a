//! S3 upload notifier: logs the key of every object in an S3 event

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{Error, LambdaEvent};
use tracing::{info, warn};

/// Extracts the object keys of an S3 notification event, in record order.
/// Records that do not carry an object key are skipped.
#[must_use]
pub fn uploaded_keys(event: S3Event) -> Vec<String> {
    event
        .records
        .into_iter()
        .filter_map(|record| {
            let key = record.s3.object.key;
            if key.is_none() {
                warn!(
                    event_name = record.event_name.as_deref().unwrap_or("unknown"),
                    "Skipping S3 record without an object key"
                );
            }
            key
        })
        .collect()
}

/// Lambda handler for the upload notifier entrypoint. Returns how many keys were logged.
///
/// # Errors
///
/// Does not fail; an event without records simply logs nothing.
pub async fn function_handler(event: LambdaEvent<S3Event>) -> Result<usize, Error> {
    let keys = uploaded_keys(event.payload);
    for key in &keys {
        info!(key = %key, "New image uploaded: {}", key);
    }
    Ok(keys.len())
}

pub use self::function_handler as handler;

// This is the Lambda bootstrap entry point for the S3 upload notifier

use lambda_runtime::{Error, run, service_fn};
use relay::upload::handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    relay::setup_logging();

    run(service_fn(handler)).await
}

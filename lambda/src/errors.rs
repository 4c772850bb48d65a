use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid relay configuration: {0}")]
    Config(String),

    #[error("Failed to interact with AWS services: {0}")]
    Transport(String),
}

// SQS and SNS share the smithy `SdkError`, so one impl covers both clients.
impl<E, R> From<SdkError<E, R>> for RelayError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(error: SdkError<E, R>) -> Self {
        RelayError::Transport(DisplayErrorContext(&error).to_string())
    }
}

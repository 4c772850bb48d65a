use std::env;

use crate::errors::RelayError;

pub const DEFAULT_MAX_BATCH: usize = 3;
pub const DEFAULT_WAIT_SECONDS: i32 = 5;
pub const DEFAULT_RECEIVE_ATTEMPTS: usize = 2;
pub const DEFAULT_SUBJECT: &str = "Notification from CloudX web application";

/// SQS refuses to hand out more than ten messages per receive call.
pub const SQS_MAX_MESSAGES_PER_RECEIVE: usize = 10;
/// SQS long-poll ceiling.
pub const SQS_MAX_WAIT_SECONDS: i32 = 20;
/// SNS rejects subjects longer than this.
pub const SNS_MAX_SUBJECT_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub queue_name: String,
    pub topic_arn: String,
    pub region: Option<String>,
    pub max_batch: usize,
    pub wait_seconds: i32,
    pub receive_attempts: usize,
    pub subject: String,
}

impl RelayConfig {
    /// Reads the relay settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if a required variable is missing or blank,
    /// or an optional one is present but out of range.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RelayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, RelayError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RelayError::Config(format!("{key} must be set and non-blank")))
        };
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_batch = match optional("RELAY_MAX_BATCH") {
            Some(raw) => parse_in_range("RELAY_MAX_BATCH", &raw, 1, SQS_MAX_MESSAGES_PER_RECEIVE)?,
            None => DEFAULT_MAX_BATCH,
        };
        let wait_seconds = match optional("RELAY_WAIT_SECONDS") {
            Some(raw) => parse_in_range("RELAY_WAIT_SECONDS", &raw, 0, SQS_MAX_WAIT_SECONDS)?,
            None => DEFAULT_WAIT_SECONDS,
        };
        let receive_attempts = match optional("RELAY_RECEIVE_ATTEMPTS") {
            Some(raw) => parse_in_range("RELAY_RECEIVE_ATTEMPTS", &raw, 1, usize::MAX)?,
            None => DEFAULT_RECEIVE_ATTEMPTS,
        };
        let subject = optional("RELAY_NOTIFICATION_SUBJECT")
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        if subject.chars().count() > SNS_MAX_SUBJECT_LEN {
            return Err(RelayError::Config(format!(
                "RELAY_NOTIFICATION_SUBJECT exceeds {SNS_MAX_SUBJECT_LEN} characters"
            )));
        }

        Ok(Self {
            queue_name: required("SQS_QUEUE_NAME")?,
            topic_arn: required("SNS_TOPIC_ARN")?,
            region: optional("AWS_REGION"),
            max_batch,
            wait_seconds,
            receive_attempts,
            subject,
        })
    }
}

fn parse_in_range<T>(key: &str, raw: &str, min: T, max: T) -> Result<T, RelayError>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
{
    let value: T = raw
        .parse()
        .map_err(|_| RelayError::Config(format!("{key}: '{raw}' is not a number")))?;
    if value < min || value > max {
        return Err(RelayError::Config(format!(
            "{key}: {value} is outside {min}..={max}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_vars_set() {
        let config = RelayConfig::from_lookup(lookup_from(&[
            ("SQS_QUEUE_NAME", "uploads"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:123:uploads"),
        ]))
        .unwrap();

        assert_eq!(config.max_batch, DEFAULT_MAX_BATCH);
        assert_eq!(config.wait_seconds, DEFAULT_WAIT_SECONDS);
        assert_eq!(config.receive_attempts, DEFAULT_RECEIVE_ATTEMPTS);
        assert_eq!(config.subject, DEFAULT_SUBJECT);
        assert_eq!(config.region, None);
    }

    #[test]
    fn blank_queue_name_is_rejected() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            ("SQS_QUEUE_NAME", "   "),
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:123:uploads"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SQS_QUEUE_NAME"));
    }

    #[test]
    fn out_of_range_batch_is_rejected() {
        let err = RelayConfig::from_lookup(lookup_from(&[
            ("SQS_QUEUE_NAME", "uploads"),
            ("SNS_TOPIC_ARN", "arn"),
            ("RELAY_MAX_BATCH", "11"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    #[test]
    fn overlong_subject_is_rejected() {
        let subject = "s".repeat(SNS_MAX_SUBJECT_LEN + 1);
        let err = RelayConfig::from_lookup(lookup_from(&[
            ("SQS_QUEUE_NAME", "uploads"),
            ("SNS_TOPIC_ARN", "arn"),
            ("RELAY_NOTIFICATION_SUBJECT", subject.as_str()),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RELAY_NOTIFICATION_SUBJECT"));
    }
}

//! Notification Adapters
//!
//! Publishes the formatted report. [`SnsNotifier`] sends to an SNS topic;
//! [`LogNotifier`] only logs, for dry runs.

use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use tracing::{debug, info};

use crate::types::AuditError;

/// SNS rejects subjects of 100 characters or more
const MAX_SUBJECT_LEN: usize = 99;

/// Used when sanitizing leaves nothing behind
const FALLBACK_SUBJECT: &str = "IAM Security Scan";

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish `subject`/`body` to `destination`
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AuditError>;
}

/// Notifier backed by `aws-sdk-sns`
#[derive(Debug, Clone)]
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AuditError> {
        let subject = sns_subject(subject);

        debug!(topic = %destination, subject = %subject, "Publishing SNS message");

        let output = self
            .client
            .publish()
            .topic_arn(destination)
            .subject(&subject)
            .message(body)
            .send()
            .await
            .map_err(|e| AuditError::Publish(DisplayErrorContext(&e).to_string()))?;

        info!(
            topic = %destination,
            message_id = output.message_id().unwrap_or("unknown"),
            "SNS notification sent"
        );

        Ok(())
    }
}

/// Notifier that writes the report to the log instead of sending it
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AuditError> {
        info!(
            destination = %destination,
            subject = %subject,
            "DRY RUN - would publish report"
        );
        for line in body.lines() {
            info!("    {}", line);
        }
        Ok(())
    }
}

/// Make a subject acceptable to SNS: printable ASCII, single line, under 100 chars
pub fn sns_subject(subject: &str) -> String {
    let cleaned: String = subject
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        return FALLBACK_SUBJECT.to_string();
    }

    collapsed.chars().take(MAX_SUBJECT_LEN).collect()
}

//! Audit Configuration
//!
//! The run is driven by one explicit [`AuditConfig`], sourced once at startup.
//! Every field is both a CLI flag and an environment variable so the
//! scheduler (CronJob, EventBridge task, systemd timer) can inject it without
//! code changes.

use std::time::Duration;

use clap::Args;

use crate::scanner::ScanPolicy;
use crate::types::AuditError;

/// Keys older than this are reported
pub const DEFAULT_MAX_KEY_AGE_DAYS: i64 = 90;

/// Users fetched in the single directory page
pub const DEFAULT_MAX_USERS: i32 = 50;

/// Keys fetched per user
pub const DEFAULT_MAX_KEYS_PER_USER: i32 = 5;

/// Wall-clock budget for one invocation
pub const DEFAULT_TIME_BUDGET_SECS: u64 = 300;

/// Minimum remaining time required to start checking another user
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 10;

/// IAM `MaxItems` upper bound
const MAX_PAGE_SIZE: i32 = 1000;

/// Destination reported when nothing is actually published
const DRY_RUN_DESTINATION: &str = "dry-run";

/// Configuration for one audit invocation
#[derive(Args, Debug, Clone)]
pub struct AuditConfig {
    /// SNS topic ARN that receives the report
    #[arg(long, env = "AUDIT_SNS_TOPIC_ARN")]
    pub topic_arn: Option<String>,

    /// Access keys older than this many days are reported
    #[arg(long, env = "AUDIT_MAX_KEY_AGE_DAYS", default_value_t = DEFAULT_MAX_KEY_AGE_DAYS)]
    pub max_key_age_days: i64,

    /// Maximum number of IAM users to fetch (single page, no pagination)
    #[arg(long, env = "AUDIT_MAX_USERS", default_value_t = DEFAULT_MAX_USERS)]
    pub max_users: i32,

    /// Maximum number of access keys to fetch per user
    #[arg(long, env = "AUDIT_MAX_KEYS_PER_USER", default_value_t = DEFAULT_MAX_KEYS_PER_USER)]
    pub max_keys_per_user: i32,

    /// Time budget for the whole run in seconds
    #[arg(long, env = "AUDIT_TIME_BUDGET_SECS", default_value_t = DEFAULT_TIME_BUDGET_SECS)]
    pub time_budget_secs: u64,

    /// Stop checking users once less than this many seconds remain
    #[arg(long, env = "AUDIT_SAFETY_MARGIN_SECS", default_value_t = DEFAULT_SAFETY_MARGIN_SECS)]
    pub safety_margin_secs: u64,

    /// AWS region (falls back to the SDK default chain)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Mention in the report when more users exist than were fetched
    #[arg(long, env = "AUDIT_REPORT_LISTING_TRUNCATION", default_value = "false")]
    pub report_listing_truncation: bool,

    /// Log the report instead of publishing it
    #[arg(long, env = "AUDIT_DRY_RUN", default_value = "false")]
    pub dry_run: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            topic_arn: None,
            max_key_age_days: DEFAULT_MAX_KEY_AGE_DAYS,
            max_users: DEFAULT_MAX_USERS,
            max_keys_per_user: DEFAULT_MAX_KEYS_PER_USER,
            time_budget_secs: DEFAULT_TIME_BUDGET_SECS,
            safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
            region: None,
            report_listing_truncation: false,
            dry_run: false,
        }
    }
}

impl AuditConfig {
    /// Set the notification topic
    pub fn with_topic(mut self, topic_arn: impl Into<String>) -> Self {
        self.topic_arn = Some(topic_arn.into());
        self
    }

    /// Set the age threshold in days
    pub fn with_max_key_age_days(mut self, days: i64) -> Self {
        self.max_key_age_days = days;
        self
    }

    /// Check the configuration before any client is built
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.max_key_age_days < 0 {
            return Err(AuditError::Config(format!(
                "max key age must not be negative: {}",
                self.max_key_age_days
            )));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.max_users) {
            return Err(AuditError::Config(format!(
                "max users must be between 1 and {}: {}",
                MAX_PAGE_SIZE, self.max_users
            )));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.max_keys_per_user) {
            return Err(AuditError::Config(format!(
                "max keys per user must be between 1 and {}: {}",
                MAX_PAGE_SIZE, self.max_keys_per_user
            )));
        }

        if self.safety_margin_secs >= self.time_budget_secs {
            return Err(AuditError::Config(format!(
                "safety margin ({}s) must be smaller than the time budget ({}s)",
                self.safety_margin_secs, self.time_budget_secs
            )));
        }

        match self.topic_arn.as_deref() {
            Some(arn) if !is_sns_topic_arn(arn) => Err(AuditError::Config(format!(
                "not an SNS topic ARN: {}",
                arn
            ))),
            None if !self.dry_run => Err(AuditError::Config(
                "AUDIT_SNS_TOPIC_ARN must be set unless running with --dry-run".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Where the report goes
    pub fn destination(&self) -> &str {
        self.topic_arn.as_deref().unwrap_or(DRY_RUN_DESTINATION)
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    /// Scanner policy derived from this configuration
    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            max_identities: self.max_users,
            max_credentials: self.max_keys_per_user,
            age_threshold_days: self.max_key_age_days,
            safety_margin: Duration::from_secs(self.safety_margin_secs),
        }
    }
}

/// `arn:<partition>:sns:<region>:<account>:<topic>`
fn is_sns_topic_arn(arn: &str) -> bool {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    parts.len() == 6
        && parts[0] == "arn"
        && parts[1].starts_with("aws")
        && parts[2] == "sns"
        && !parts[5].is_empty()
}

//! IAM Key Audit - Standalone Binary
//!
//! Run-once job for a scheduler (CronJob, EventBridge Scheduler task, systemd
//! timer). Lists IAM users, flags access keys older than the threshold and
//! publishes the report to SNS.
//!
//! ## Usage
//!
//! ```bash
//! # Audit and publish to a topic
//! iam-key-audit --topic-arn arn:aws:sns:us-east-1:123456789012:iam-audit
//!
//! # Log the report instead of publishing it
//! iam-key-audit --dry-run --max-key-age-days 60
//!
//! # Pass the scheduler's trigger payload through
//! iam-key-audit --event '{"source":"aws.events"}' --json-logs
//! ```
//!
//! The invocation result is printed as JSON on stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use iam_key_audit::{run_invocation, AuditConfig, DeadlineContext};

/// IAM Key Audit - Report IAM access keys older than a threshold
#[derive(Parser, Debug)]
#[command(name = "iam-key-audit", version, about)]
struct Cli {
    #[command(flatten)]
    audit: AuditConfig,

    /// Trigger payload (JSON); accepted and ignored
    #[arg(long, default_value = "{}")]
    event: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "AUDIT_JSON_LOGS", default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs)?;

    let event: Value = serde_json::from_str(&cli.event).context("Invalid --event payload")?;

    info!(
        topic = cli.audit.topic_arn.as_deref().unwrap_or("none"),
        max_key_age_days = cli.audit.max_key_age_days,
        max_users = cli.audit.max_users,
        dry_run = cli.audit.dry_run,
        "Starting IAM Key Audit"
    );

    let ctx = DeadlineContext::new(cli.audit.time_budget());
    let result = run_invocation(cli.audit, &event, &ctx).await;

    let output = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    println!("{}", output);

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // RUST_LOG wins over --verbose when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
    .context("Failed to initialize logging")
}

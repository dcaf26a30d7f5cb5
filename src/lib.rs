//! IAM Key Audit Library
//!
//! Scheduled audit of IAM access-key age: list users, age their keys against
//! a threshold, format a report and publish it to an SNS topic.

pub mod config;
pub mod context;
pub mod directory;
pub mod handler;
pub mod notifier;
pub mod observer;
pub mod report;
pub mod scanner;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::AuditConfig;
pub use context::{DeadlineContext, ExecutionContext};
pub use directory::{DirectoryService, IamDirectory};
pub use handler::{run_invocation, AuditHandler, Collaborators, Stage};
pub use notifier::{LogNotifier, Notifier, SnsNotifier};
pub use observer::{ScanObserver, TracingObserver};
pub use scanner::{ScanPolicy, Scanner};
pub use types::{
    AuditError, InvocationResult, InvocationStatus, Issue, IssueKind, Report, ScanResult,
};

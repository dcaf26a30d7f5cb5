//! Types for the IAM access key audit
//!
//! Directory records, scan findings, notification payloads and the error
//! taxonomy shared by the scanner, the reporter and the handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An IAM user as returned by the directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User name (opaque to the audit)
    pub name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One page of identities from the directory
#[derive(Debug, Clone, Default)]
pub struct IdentityPage {
    /// Identities in directory order
    pub identities: Vec<Identity>,
    /// More identities exist beyond this page
    pub truncated: bool,
}

/// A long-lived access key belonging to exactly one identity
///
/// The full key id is held privately; only [`AccessKey::masked_id`] is ever
/// surfaced in issues, reports and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    id: String,
    /// Creation instant (timezone-aware)
    pub created_at: DateTime<Utc>,
}

impl AccessKey {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }

    /// Last four characters of the key id, e.g. `...WXYZ`
    pub fn masked_id(&self) -> String {
        let chars: Vec<char> = self.id.chars().collect();
        let start = chars.len().saturating_sub(4);
        let tail: String = chars[start..].iter().collect();
        format!("...{}", tail)
    }

    /// Whole days elapsed between creation and `now`, rounded down
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

impl std::fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessKey")
            .field("id", &self.masked_id())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Key older than the age threshold
    StaleKey,
    /// Key lookup for one user failed
    LookupFailed,
    /// Scan stopped early on a low time budget
    Truncated,
}

/// A single textual finding emitted by the scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    pub fn stale_key(identity: &Identity, key: &AccessKey, age_days: i64) -> Self {
        Self {
            kind: IssueKind::StaleKey,
            message: format!(
                "🚨 OLD ACCESS KEY: User '{}' has {}-day-old key ({})",
                identity.name,
                age_days,
                key.masked_id()
            ),
        }
    }

    pub fn lookup_failed(identity: &Identity) -> Self {
        Self {
            kind: IssueKind::LookupFailed,
            message: format!("⚠️ ERROR: Failed to check user '{}'", identity.name),
        }
    }

    pub fn truncated(unchecked: usize, listed: usize) -> Self {
        Self {
            kind: IssueKind::Truncated,
            message: format!(
                "⏱️ SCAN TRUNCATED: time budget nearly exhausted, {} of {} users not checked",
                unchecked, listed
            ),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of one scan, consumed by the reporter and then dropped
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Findings in processing order
    pub issues: Vec<Issue>,
    /// Identities returned by the directory page
    pub identities_listed: usize,
    /// Identities whose keys were actually checked
    pub identities_scanned: usize,
    /// The directory reported more identities than the page held
    pub listing_truncated: bool,
    /// Instant the key ages were measured against
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    /// The time budget stopped the scan before every listed identity was checked
    pub fn stopped_early(&self) -> bool {
        self.identities_scanned < self.identities_listed
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

/// Formatted notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

/// Overall invocation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Failure,
}

/// Structured result returned to the invoker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub status: InvocationStatus,
    pub body: InvocationBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationBody {
    pub message: String,
    pub identities_checked: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationResult {
    pub fn success(
        identities_checked: usize,
        issues_found: usize,
        scan_time: DateTime<Utc>,
    ) -> Self {
        Self {
            status_code: 200,
            status: InvocationStatus::Success,
            body: InvocationBody {
                message: "Security scan completed".to_string(),
                identities_checked,
                issues_found: Some(issues_found),
                scan_time: Some(scan_time),
                error: None,
            },
        }
    }

    pub fn failure(error: &AuditError, identities_checked: usize) -> Self {
        Self {
            status_code: 500,
            status: InvocationStatus::Failure,
            body: InvocationBody {
                message: "Security scan failed".to_string(),
                identities_checked,
                issues_found: None,
                scan_time: None,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

/// Errors that can occur during an audit run
#[derive(Debug, Error)]
pub enum AuditError {
    /// Invalid or missing configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A collaborator handle could not be acquired
    #[error("Client initialization failed: {0}")]
    ClientInit(String),

    /// The identity enumeration failed
    #[error("Failed to list IAM users: {0}")]
    ListIdentities(String),

    /// Key lookup failed for one identity
    #[error("Failed to list access keys for user '{identity}': {detail}")]
    ListCredentials { identity: String, detail: String },

    /// The notification could not be published
    #[error("Failed to publish notification: {0}")]
    Publish(String),
}

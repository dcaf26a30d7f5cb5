//! Report formatting
//!
//! Pure functions turning a scan result (or a fatal error) into the
//! subject/body pair that gets published. No I/O happens here.

use chrono::{DateTime, Utc};

use crate::types::{AuditError, Issue, Report, ScanResult};

pub const SUBJECT_ALL_CLEAR: &str = "IAM Security Scan - All Clear";
pub const SUBJECT_ISSUES_FOUND: &str = "IAM Security Issues Found";
pub const SUBJECT_FAILED: &str = "IAM Security Scan - FAILED";

const HEADER: &str = "🔒 IAM SECURITY SCAN REPORT";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Everything the reporter needs from a scan
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub issues: &'a [Issue],
    pub identities_scanned: usize,
    /// Age threshold quoted in the remediation guidance
    pub threshold_days: i64,
    pub timestamp: DateTime<Utc>,
    /// Add a note that the user listing was cut at the page size
    pub more_identities: bool,
}

impl<'a> ReportInput<'a> {
    pub fn from_scan(
        scan: &'a ScanResult,
        threshold_days: i64,
        note_listing_truncation: bool,
    ) -> Self {
        Self {
            issues: &scan.issues,
            identities_scanned: scan.identities_scanned,
            threshold_days,
            timestamp: scan.timestamp,
            more_identities: note_listing_truncation && scan.listing_truncated,
        }
    }
}

/// Format the scan report
pub fn format_report(input: &ReportInput<'_>) -> Report {
    let mut lines = vec![HEADER.to_string(), String::new()];

    if input.issues.is_empty() {
        lines.push("✅ ALL CLEAR! No security issues detected.".to_string());
    } else {
        lines.push("🚨 SECURITY ISSUES FOUND:".to_string());
        lines.extend(input.issues.iter().map(|issue| issue.message.clone()));
    }

    lines.push(String::new());
    lines.push("📊 SCAN SUMMARY:".to_string());
    lines.push(format!("• Users Scanned: {}", input.identities_scanned));
    lines.push(format!("• Issues Found: {}", input.issues.len()));
    lines.push(format!("• Scan Time: {}", input.timestamp.format(TIMESTAMP_FORMAT)));
    if input.more_identities {
        lines.push(
            "• Note: more IAM users exist than fit in one page; they were not checked".to_string(),
        );
    }
    lines.push(String::new());

    let subject = if input.issues.is_empty() {
        lines.push("🎉 Excellent security hygiene!".to_string());
        SUBJECT_ALL_CLEAR
    } else {
        lines.push("⚠️  Recommended Actions:".to_string());
        lines.push(format!(
            "• Rotate access keys older than {} days",
            input.threshold_days
        ));
        lines.push("• Review IAM user permissions regularly".to_string());
        SUBJECT_ISSUES_FOUND
    };

    Report {
        subject: subject.to_string(),
        body: lines.join("\n"),
    }
}

/// Format the best-effort notification sent when the run fails
pub fn failure_report(error: &AuditError) -> Report {
    Report {
        subject: SUBJECT_FAILED.to_string(),
        body: format!("IAM Security Scan Failed:\n❌ SCAN FAILED: {}", error),
    }
}

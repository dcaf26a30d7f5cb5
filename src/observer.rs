//! Scan progress hooks
//!
//! The scanner reports progress through [`ScanObserver`] instead of logging
//! directly. [`TracingObserver`] is the default and turns every hook into a
//! `tracing` event.

use tracing::{info, warn};

use crate::types::{AccessKey, AuditError, Identity, ScanResult};

/// Progress callbacks invoked by the scanner at fixed points
///
/// All methods default to no-ops.
pub trait ScanObserver: Send + Sync {
    /// Identities have been listed and checking is about to begin
    fn scan_started(&self, _listed: usize, _listing_truncated: bool) {}

    /// Key lookup for `identity` is about to run
    fn identity_started(&self, _identity: &Identity) {}

    /// One key has been aged against the threshold
    fn credential_evaluated(
        &self,
        _identity: &Identity,
        _key: &AccessKey,
        _age_days: i64,
        _compliant: bool,
    ) {
    }

    /// Key lookup for `identity` failed and was recorded as an issue
    fn identity_failed(&self, _identity: &Identity, _error: &AuditError) {}

    /// The time budget ran low; `unchecked` identities were skipped
    fn scan_stopped_early(&self, _remaining_ms: u64, _unchecked: usize) {}

    /// The scan produced its result
    fn scan_finished(&self, _result: &ScanResult) {}
}

/// Observer that narrates the scan through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn scan_started(&self, listed: usize, listing_truncated: bool) {
        info!(users = listed, "🔍 Scanning {} IAM users...", listed);
        if listing_truncated {
            warn!("More IAM users exist beyond the configured page size; they are not checked");
        }
    }

    fn identity_started(&self, identity: &Identity) {
        info!(user = %identity, "   👤 Checking user: {}", identity);
    }

    fn credential_evaluated(
        &self,
        identity: &Identity,
        key: &AccessKey,
        age_days: i64,
        compliant: bool,
    ) {
        if compliant {
            info!(
                user = %identity,
                key = %key.masked_id(),
                age_days,
                "      ✅ Key is within compliance ({} days)",
                age_days
            );
        } else {
            warn!(
                user = %identity,
                key = %key.masked_id(),
                age_days,
                "      ⚠️  Key {} is {} days old",
                key.masked_id(),
                age_days
            );
        }
    }

    fn identity_failed(&self, identity: &Identity, error: &AuditError) {
        warn!(user = %identity, error = %error, "      ❌ Failed to check user");
    }

    fn scan_stopped_early(&self, remaining_ms: u64, unchecked: usize) {
        warn!(
            remaining_ms,
            unchecked,
            "⏱️  Time budget low, stopping scan early"
        );
    }

    fn scan_finished(&self, result: &ScanResult) {
        info!(
            users_scanned = result.identities_scanned,
            issues = result.issues.len(),
            "📋 Scan finished"
        );
    }
}

//! Access Key Scanner
//!
//! Walks the first page of directory users, ages each of their access keys
//! against the policy threshold and collects findings in processing order.
//!
//! A failed key lookup for one user is recorded as an issue and the scan moves
//! on. Before each user the remaining time budget is checked; once it drops
//! under the safety margin the scan stops with a truncation issue instead of
//! running into the hard timeout. Only a failed user listing aborts the scan.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::{
    DEFAULT_MAX_KEYS_PER_USER, DEFAULT_MAX_KEY_AGE_DAYS, DEFAULT_MAX_USERS,
    DEFAULT_SAFETY_MARGIN_SECS,
};
use crate::context::ExecutionContext;
use crate::directory::DirectoryService;
use crate::observer::ScanObserver;
use crate::types::{AuditError, Issue, ScanResult};

/// Page sizes and thresholds for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Users fetched in the single directory page
    pub max_identities: i32,
    /// Keys fetched per user
    pub max_credentials: i32,
    /// Keys strictly older than this many days are reported
    pub age_threshold_days: i64,
    /// Minimum remaining time required to start another user
    pub safety_margin: Duration,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            max_identities: DEFAULT_MAX_USERS,
            max_credentials: DEFAULT_MAX_KEYS_PER_USER,
            age_threshold_days: DEFAULT_MAX_KEY_AGE_DAYS,
            safety_margin: Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS),
        }
    }
}

/// Scanner over one directory
pub struct Scanner<'a> {
    directory: &'a dyn DirectoryService,
    policy: ScanPolicy,
}

impl<'a> Scanner<'a> {
    pub fn new(directory: &'a dyn DirectoryService, policy: ScanPolicy) -> Self {
        Self { directory, policy }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Run the scan, ageing keys against the current time
    pub async fn scan(
        &self,
        ctx: &dyn ExecutionContext,
        observer: &dyn ScanObserver,
    ) -> Result<ScanResult, AuditError> {
        self.scan_at(Utc::now(), ctx, observer).await
    }

    /// Run the scan, ageing keys against `now`
    pub async fn scan_at(
        &self,
        now: DateTime<Utc>,
        ctx: &dyn ExecutionContext,
        observer: &dyn ScanObserver,
    ) -> Result<ScanResult, AuditError> {
        let page = self
            .directory
            .list_identities(self.policy.max_identities)
            .await?;

        let page_size = usize::try_from(self.policy.max_identities).unwrap_or(0);
        let key_page_size = usize::try_from(self.policy.max_credentials).unwrap_or(0);

        let mut identities = page.identities;
        let mut listing_truncated = page.truncated;
        if identities.len() > page_size {
            identities.truncate(page_size);
            listing_truncated = true;
        }

        let listed = identities.len();
        observer.scan_started(listed, listing_truncated);

        let margin_ms = u64::try_from(self.policy.safety_margin.as_millis()).unwrap_or(u64::MAX);
        let mut issues = Vec::new();
        let mut scanned = 0;

        for identity in &identities {
            let remaining_ms = ctx.remaining_time_millis();
            if remaining_ms < margin_ms {
                let unchecked = listed - scanned;
                observer.scan_stopped_early(remaining_ms, unchecked);
                issues.push(Issue::truncated(unchecked, listed));
                break;
            }

            observer.identity_started(identity);
            scanned += 1;

            match self
                .directory
                .list_credentials(identity, self.policy.max_credentials)
                .await
            {
                Ok(keys) => {
                    for key in keys.iter().take(key_page_size) {
                        let age_days = key.age_days(now);
                        let compliant = age_days <= self.policy.age_threshold_days;
                        observer.credential_evaluated(identity, key, age_days, compliant);

                        if !compliant {
                            issues.push(Issue::stale_key(identity, key, age_days));
                        }
                    }
                }
                Err(e) => {
                    observer.identity_failed(identity, &e);
                    issues.push(Issue::lookup_failed(identity));
                }
            }
        }

        let result = ScanResult {
            issues,
            identities_listed: listed,
            identities_scanned: scanned,
            listing_truncated,
            timestamp: now,
        };

        observer.scan_finished(&result);
        Ok(result)
    }
}

//! In-memory collaborators for unit tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::context::ExecutionContext;
use crate::directory::DirectoryService;
use crate::notifier::Notifier;
use crate::observer::ScanObserver;
use crate::types::{AccessKey, AuditError, Identity, IdentityPage, ScanResult};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Key created `days` whole days (plus one hour) before [`fixed_now`]
pub fn key_aged(id: &str, days: i64) -> AccessKey {
    AccessKey::new(id, fixed_now() - Duration::days(days) - Duration::hours(1))
}

enum UserKeys {
    Keys(Vec<AccessKey>),
    Fails(String),
}

/// Directory serving a fixed list of users
#[derive(Default)]
pub struct FakeDirectory {
    users: Vec<(Identity, UserKeys)>,
    list_error: Option<String>,
    more_available: bool,
    credential_calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            list_error: Some(detail.to_string()),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, name: &str, keys: Vec<AccessKey>) -> Self {
        self.users.push((Identity::new(name), UserKeys::Keys(keys)));
        self
    }

    pub fn with_failing_user(mut self, name: &str, detail: &str) -> Self {
        self.users
            .push((Identity::new(name), UserKeys::Fails(detail.to_string())));
        self
    }

    /// Report more users beyond whatever page is served
    pub fn with_more_available(mut self) -> Self {
        self.more_available = true;
        self
    }

    /// Users whose keys were requested, in call order
    pub fn credential_calls(&self) -> Vec<String> {
        self.credential_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list_identities(&self, max: i32) -> Result<IdentityPage, AuditError> {
        if let Some(detail) = &self.list_error {
            return Err(AuditError::ListIdentities(detail.clone()));
        }

        let max = usize::try_from(max).unwrap_or(0);
        Ok(IdentityPage {
            identities: self
                .users
                .iter()
                .take(max)
                .map(|(identity, _)| identity.clone())
                .collect(),
            truncated: self.more_available || self.users.len() > max,
        })
    }

    async fn list_credentials(
        &self,
        identity: &Identity,
        max: i32,
    ) -> Result<Vec<AccessKey>, AuditError> {
        self.credential_calls
            .lock()
            .unwrap()
            .push(identity.name.clone());

        let max = usize::try_from(max).unwrap_or(0);
        match self.users.iter().find(|(user, _)| user == identity) {
            Some((_, UserKeys::Keys(keys))) => Ok(keys.iter().take(max).cloned().collect()),
            Some((_, UserKeys::Fails(detail))) => Err(AuditError::ListCredentials {
                identity: identity.name.clone(),
                detail: detail.clone(),
            }),
            None => Err(AuditError::ListCredentials {
                identity: identity.name.clone(),
                detail: "NoSuchEntity".to_string(),
            }),
        }
    }
}

/// Context whose remaining time never changes
pub struct FixedContext(pub u64);

impl ExecutionContext for FixedContext {
    fn remaining_time_millis(&self) -> u64 {
        self.0
    }
}

/// Context that loses `step` milliseconds on every query
pub struct DrainingContext {
    remaining: AtomicU64,
    step: u64,
}

impl DrainingContext {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            remaining: AtomicU64::new(start),
            step,
        }
    }
}

impl ExecutionContext for DrainingContext {
    fn remaining_time_millis(&self) -> u64 {
        let current = self.remaining.load(Ordering::SeqCst);
        self.remaining
            .store(current.saturating_sub(self.step), Ordering::SeqCst);
        current
    }
}

/// Published message as seen by [`RecordingNotifier`]
#[derive(Debug, Clone)]
pub struct Published {
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records every attempt and can be told to fail
#[derive(Default)]
pub struct RecordingNotifier {
    attempts: Mutex<Vec<Published>>,
    fail_all: bool,
    fail_first: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish fails
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Only the first publish fails
    pub fn failing_once() -> Self {
        Self {
            fail_first: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> Vec<Published> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), AuditError> {
        let mut attempts = self.attempts.lock().unwrap();
        attempts.push(Published {
            destination: destination.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        if self.fail_all || (self.fail_first && attempts.len() == 1) {
            return Err(AuditError::Publish("AuthorizationError".to_string()));
        }
        Ok(())
    }
}

/// Observer that records hook names in call order
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ScanObserver for RecordingObserver {
    fn scan_started(&self, listed: usize, _listing_truncated: bool) {
        self.record(format!("started:{}", listed));
    }

    fn identity_started(&self, identity: &Identity) {
        self.record(format!("user:{}", identity));
    }

    fn credential_evaluated(
        &self,
        identity: &Identity,
        key: &AccessKey,
        age_days: i64,
        compliant: bool,
    ) {
        self.record(format!(
            "key:{}:{}:{}:{}",
            identity,
            key.masked_id(),
            age_days,
            compliant
        ));
    }

    fn identity_failed(&self, identity: &Identity, _error: &AuditError) {
        self.record(format!("failed:{}", identity));
    }

    fn scan_stopped_early(&self, _remaining_ms: u64, unchecked: usize) {
        self.record(format!("stopped:{}", unchecked));
    }

    fn scan_finished(&self, result: &ScanResult) {
        self.record(format!("finished:{}", result.issues.len()));
    }
}

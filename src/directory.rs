//! Directory Service Adapters
//!
//! Trait-based access to the identity directory. Production uses
//! [`IamDirectory`] over the official `aws-sdk-iam` client; tests swap in an
//! in-memory directory.

use async_trait::async_trait;
use aws_sdk_iam::error::DisplayErrorContext;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::types::{AccessKey, AuditError, Identity, IdentityPage};

/// Read-only view of users and their access keys
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Fetch up to `max` identities (first page only)
    async fn list_identities(&self, max: i32) -> Result<IdentityPage, AuditError>;

    /// Fetch up to `max` access keys belonging to `identity`
    async fn list_credentials(
        &self,
        identity: &Identity,
        max: i32,
    ) -> Result<Vec<AccessKey>, AuditError>;
}

/// IAM directory backed by `aws-sdk-iam`
///
/// Credentials and region come from the shared SDK config, i.e. the default
/// AWS provider chain of the execution environment.
#[derive(Debug, Clone)]
pub struct IamDirectory {
    client: aws_sdk_iam::Client,
}

impl IamDirectory {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_iam::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl DirectoryService for IamDirectory {
    async fn list_identities(&self, max: i32) -> Result<IdentityPage, AuditError> {
        debug!(max_items = max, "Listing IAM users");

        let output = self
            .client
            .list_users()
            .max_items(max)
            .send()
            .await
            .map_err(|e| AuditError::ListIdentities(DisplayErrorContext(&e).to_string()))?;

        let identities: Vec<Identity> = output
            .users()
            .iter()
            .map(|user| Identity::new(user.user_name()))
            .collect();

        debug!(
            count = identities.len(),
            truncated = output.is_truncated(),
            "IAM users listed"
        );

        Ok(IdentityPage {
            identities,
            truncated: output.is_truncated(),
        })
    }

    async fn list_credentials(
        &self,
        identity: &Identity,
        max: i32,
    ) -> Result<Vec<AccessKey>, AuditError> {
        let output = self
            .client
            .list_access_keys()
            .user_name(&identity.name)
            .max_items(max)
            .send()
            .await
            .map_err(|e| AuditError::ListCredentials {
                identity: identity.name.clone(),
                detail: DisplayErrorContext(&e).to_string(),
            })?;

        let mut keys = Vec::new();

        for metadata in output.access_key_metadata() {
            let created_at = metadata.create_date().and_then(to_utc);

            match (metadata.access_key_id(), created_at) {
                (Some(id), Some(created_at)) => keys.push(AccessKey::new(id, created_at)),
                _ => {
                    warn!(user = %identity.name, "Skipping access key without id or creation date");
                }
            }
        }

        Ok(keys)
    }
}

/// Convert an SDK timestamp to a chrono UTC instant
fn to_utc(dt: &aws_sdk_iam::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

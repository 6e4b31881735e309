//! Managed ACL service client.
//!
//! One client covers both sides of the remote ACL: reading the current
//! entries and submitting batched create/delete updates. The service is
//! the only durable store; nothing is cached between passes.

use crate::config::AclConfig;
use crate::error::{ApplyError, FetchError};
use crate::reconcile::Delta;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One entry currently present in the remote ACL.
///
/// The identifier is opaque and assigned by the service; it is required for
/// deletion and unused for creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AclEntry {
    pub ip: String,
    pub id: String,
}

/// Wire form of one batched ACL operation.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WireOp<'a> {
    Create { ip: &'a str },
    Delete { id: &'a str },
}

impl<'a> From<&'a Delta> for WireOp<'a> {
    fn from(delta: &'a Delta) -> Self {
        match delta {
            Delta::Create { ip } => WireOp::Create { ip },
            Delta::Delete { id, .. } => WireOp::Delete { id },
        }
    }
}

/// PATCH request body for a batch update.
#[derive(Debug, Serialize)]
struct PatchBody<'a> {
    entries: Vec<WireOp<'a>>,
}

/// Error detail body returned by the service on rejection.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: String,
}

/// HTTP client for the managed ACL service.
pub struct AclClient {
    config: AclConfig,
    client: Client,
}

impl AclClient {
    /// Create a new ACL client.
    pub fn new(config: AclConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/service/{}/acl/{}/entries",
            self.config.api_base.trim_end_matches('/'),
            self.config.service_id,
            self.config.acl_id
        )
    }

    /// Fetch the current ACL entries.
    pub async fn fetch_current(&self) -> Result<Vec<AclEntry>, FetchError> {
        let url = self.entries_url();
        debug!(url = %url, "Fetching current ACL entries");

        let response = self
            .client
            .get(&url)
            .header("Fastly-Key", &self.config.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, detail });
        }

        let entries: Vec<AclEntry> = response.json().await?;

        debug!(entries = entries.len(), "Current ACL entries loaded");

        Ok(entries)
    }

    /// Submit one batch of deltas as a single PATCH request.
    ///
    /// The batch either applies as a whole or is rejected; there is no
    /// partial acceptance within one request.
    pub async fn apply_batch(&self, deltas: &[Delta]) -> Result<(), ApplyError> {
        let body = PatchBody {
            entries: deltas.iter().map(WireOp::from).collect(),
        };

        let response = self
            .client
            .patch(self.entries_url())
            .header("Fastly-Key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) if !body.detail.is_empty() => body.detail,
                _ => "no detail provided".to_string(),
            };
            return Err(ApplyError::Rejected { status, detail });
        }

        Ok(())
    }
}

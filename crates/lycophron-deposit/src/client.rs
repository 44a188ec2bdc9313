use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Record;

/// Confirmation returned by a deposition service for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub record_id: String,
    /// Identifier assigned by the remote service, if any.
    pub remote_id: Option<String>,
    pub published_at: String,
}

/// Client for a remote deposition service.
#[async_trait]
pub trait PublishClient: Send + Sync {
    /// Returns the client identifier (e.g. `dry-run`).
    fn name(&self) -> &'static str;

    /// Submit a record and its files for publication.
    async fn publish(&self, record: &Record) -> Result<PublishReceipt>;
}

/// Client that logs what would be deposited and contacts nothing.
#[derive(Debug, Clone)]
pub struct DryRunClient {
    api_url: String,
}

impl DryRunClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl PublishClient for DryRunClient {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn publish(&self, record: &Record) -> Result<PublishReceipt> {
        tracing::info!(
            event = "dry_run_publish",
            record_id = %record.id,
            api_url = %self.api_url,
            files = record.filenames.len(),
            fields = record.metadata.len()
        );
        Ok(PublishReceipt {
            record_id: record.id.clone(),
            remote_id: None,
            published_at: Utc::now().to_rfc3339(),
        })
    }
}

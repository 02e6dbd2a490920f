//! Staleness detection for generated artifacts.
//!
//! A generation run leaves a marker file behind; its mtime is the generation time. Regeneration
//! is needed when the marker is missing or any input resource was modified strictly after it.
//! Checking never writes anything, [`write_marker`] is a separate step taken after a successful
//! run.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    result::Result,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::{
    error::VocabError,
    resource::{is_online, HttpTransport, DEFAULT_ACCEPT},
};

/// Milliseconds since the epoch assumed for remote resources that report no usable
/// `Last-Modified` header (early 1991), i.e. "older than any marker".
pub const DEFAULT_MODIFICATION_TIME_MS: u64 = 662_688_059_000;

pub fn default_modification_time() -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(DEFAULT_MODIFICATION_TIME_MS)
}

/// Human-readable marker content. Only the marker's mtime is ever compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerProvenance {
    pub generator: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub resources: Vec<String>,
}

impl MarkerProvenance {
    pub fn now(resources: Vec<String>) -> Self {
        MarkerProvenance {
            generator: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            resources,
        }
    }
}

/// Writes through a temporary sibling and a rename, so a reader sees either the old file or
/// the complete new one.
pub(crate) async fn write_atomic(path: &Path, content: &str) -> Result<(), VocabError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

pub async fn write_marker(path: &Path, provenance: &MarkerProvenance) -> Result<(), VocabError> {
    let content = serde_yaml::to_string(provenance)
        .map_err(|e| VocabError::Serialization(format!("marker provenance: {e}")))?;
    write_atomic(path, &content).await?;
    tracing::debug!("[StalenessChecker] wrote marker {:?}", path);
    Ok(())
}

pub struct StalenessChecker {
    transport: Arc<dyn HttpTransport>,
}

impl StalenessChecker {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        StalenessChecker { transport }
    }

    pub async fn is_regeneration_necessary(
        &self,
        marker: &Path,
        resources: &[String],
    ) -> Result<bool, VocabError> {
        Ok(self
            .stale_resources(marker, resources)
            .await?
            .map(|stale| !stale.is_empty())
            .unwrap_or(true))
    }

    /// Resources modified after the marker, or `None` when there is no marker yet.
    #[tracing::instrument(skip(self, resources))]
    pub async fn stale_resources(
        &self,
        marker: &Path,
        resources: &[String],
    ) -> Result<Option<Vec<String>>, VocabError> {
        let marker_time = match tokio::fs::metadata(marker).await {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[StalenessChecker] no marker at {:?}", marker);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let times = join_all(
            resources
                .iter()
                .map(|resource| self.modification_time(resource)),
        )
        .await;

        let mut stale = Vec::new();
        for (resource, modified) in resources.iter().zip(times) {
            if modified? > marker_time {
                tracing::debug!("[StalenessChecker] {resource} changed since last generation");
                stale.push(resource.clone());
            }
        }
        Ok(Some(stale))
    }

    pub async fn modification_time(&self, resource: &str) -> Result<SystemTime, VocabError> {
        if !is_online(resource) {
            let meta = tokio::fs::metadata(resource)
                .await
                .map_err(|e| VocabError::Fetch {
                    resource: resource.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(meta.modified()?);
        }

        match self
            .transport
            .get(resource, &[("Accept", DEFAULT_ACCEPT)])
            .await
        {
            Ok(response) => Ok(response
                .header("last-modified")
                .and_then(|value| match DateTime::parse_from_rfc2822(value) {
                    Ok(date) => Some(SystemTime::from(date.with_timezone(&Utc))),
                    Err(e) => {
                        tracing::warn!(
                            "[StalenessChecker] unparsable Last-Modified '{value}' from {resource}: {e}"
                        );
                        None
                    }
                })
                .unwrap_or_else(default_modification_time)),
            Err(e) => {
                tracing::warn!(
                    "[StalenessChecker] {resource} unreachable ({e}), treating it as modified now"
                );
                Ok(SystemTime::now())
            }
        }
    }
}

//! Alert archive download and extraction.

use std::path::Path;
use std::time::Duration;

use alert_common::{AlertMapError, AlertMapResult};
use flate2::read::GzDecoder;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::SourceConfig;

/// Downloads the current NWS alert archive.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: Client,
    url: String,
}

impl ArchiveFetcher {
    pub fn new(config: &SourceConfig) -> AlertMapResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AlertMapError::Download {
                url: config.url.clone(),
                reason: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// GET the archive. Any non-2xx status is a download failure; no retries.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> AlertMapResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.failure(format!("reading body: {}", e)))?;

        info!(bytes = body.len(), "Downloaded alert archive");
        Ok(body.to_vec())
    }

    fn failure(&self, reason: String) -> AlertMapError {
        AlertMapError::Download {
            url: self.url.clone(),
            reason,
        }
    }
}

/// Unpack a `.tar.gz` into `destination`, creating it if needed.
///
/// Existing files are overwritten. Entries that would land outside
/// `destination` are skipped. Returns the number of entries unpacked.
pub fn extract(bytes: &[u8], destination: &Path) -> AlertMapResult<u64> {
    std::fs::create_dir_all(destination).map_err(|e| {
        AlertMapError::Archive(format!("cannot create {}: {}", destination.display(), e))
    })?;

    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive.set_overwrite(true);

    let entries = archive
        .entries()
        .map_err(|e| AlertMapError::Archive(format!("unreadable archive: {}", e)))?;

    let mut unpacked = 0u64;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| AlertMapError::Archive(format!("corrupt entry: {}", e)))?;
        let name = entry
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let written = entry
            .unpack_in(destination)
            .map_err(|e| AlertMapError::Archive(format!("cannot unpack {}: {}", name, e)))?;

        if written {
            debug!(entry = %name, "Unpacked");
            unpacked += 1;
        } else {
            debug!(entry = %name, "Skipped entry outside destination");
        }
    }

    info!(
        entries = unpacked,
        destination = %destination.display(),
        "Extracted alert archive"
    );
    Ok(unpacked)
}

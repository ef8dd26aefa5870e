//! HTTP client wrapper

use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// HTTP client wrapper for downloading artifacts
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(300))
    }

    /// Create a new HTTP client with a custom overall request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("apidoc/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }

        if !response.status().is_success() {
            return Err(Error::other(format!(
                "HTTP request failed with status {}: {}",
                response.status(),
                url
            )));
        }

        Ok(response)
    }

    /// Stream a GET response body into `path`, creating parent directories.
    ///
    /// A partially written file is removed when the transfer fails, so a
    /// broken download never looks like a complete one.
    pub async fn download_to(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.get(url).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match stream_to_file(response, path).await {
            Ok(written) => {
                tracing::debug!(url, path = %path.display(), bytes = written, "download complete");
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(path).await {
                    tracing::debug!(path = %path.display(), error = %cleanup, "no partial download to remove");
                }
                Err(e)
            }
        }
    }
}

async fn stream_to_file(mut response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

//! Artifact acquisition

use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::types::{AcquiredFile, Location};
use std::path::Path;

/// Makes archives and metadata descriptors available on local disk.
///
/// Remote locations are streamed to a fixed file name under the target
/// directory; local locations are used in place without copying. There is
/// no retry at this layer.
#[derive(Debug, Clone)]
pub struct Acquirer {
    client: HttpClient,
}

impl Acquirer {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Acquire `location`, downloading to `target_dir/file_name` if remote.
    ///
    /// # Errors
    ///
    /// Any transfer failure, an unsupported scheme, or a missing local file.
    pub async fn acquire(
        &self,
        location: &str,
        target_dir: &Path,
        file_name: &str,
    ) -> Result<AcquiredFile> {
        match Location::parse(location)? {
            Location::Remote(url) => {
                let path = target_dir.join(file_name);
                tracing::info!(%url, path = %path.display(), "downloading");
                self.client.download_to(url.as_str(), &path).await?;
                Ok(AcquiredFile {
                    path,
                    downloaded: true,
                })
            }
            Location::Local(path) => {
                let is_file = tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.is_file())
                    .unwrap_or(false);
                if !is_file {
                    return Err(Error::LocalFileNotFound(path));
                }
                tracing::debug!(path = %path.display(), "using local file in place");
                Ok(AcquiredFile {
                    path,
                    downloaded: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_file_used_in_place() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("foo.jar");
        std::fs::write(&source, b"PK").unwrap();
        let target = temp.path().join("work");

        let acquirer = Acquirer::new(HttpClient::new().unwrap());
        let acquired = acquirer
            .acquire(source.to_str().unwrap(), &target, "artifact.jar")
            .await
            .unwrap();

        assert_eq!(acquired.path, source);
        assert!(!acquired.downloaded);
        assert!(!target.exists(), "local sources must not be copied");
    }

    #[tokio::test]
    async fn test_missing_local_file_fails() {
        let temp = TempDir::new().unwrap();
        let acquirer = Acquirer::new(HttpClient::new().unwrap());

        let err = acquirer
            .acquire(
                temp.path().join("missing.jar").to_str().unwrap(),
                temp.path(),
                "artifact.jar",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LocalFileNotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_is_not_an_archive() {
        let temp = TempDir::new().unwrap();
        let acquirer = Acquirer::new(HttpClient::new().unwrap());

        let err = acquirer
            .acquire(temp.path().to_str().unwrap(), temp.path(), "artifact.jar")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::LocalFileNotFound(_)));
    }
}

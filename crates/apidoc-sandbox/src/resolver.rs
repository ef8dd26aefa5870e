//! Fetching pinned coordinates into a sandbox-local repository.

use apidoc_core::{Error, PinnedDependency, Result};
use apidoc_fetch::HttpClient;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Places the jar for one coordinate at a destination path.
///
/// Resolution is flat: a resolver fetches exactly the coordinate it is given
/// and never walks a dependency graph.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    /// Fetch `dependency` to `destination`, returning where it came from.
    async fn fetch(&self, dependency: &PinnedDependency, destination: &Path) -> Result<String>;
}

/// Resolves against an ordered list of repositories; the first hit wins.
#[derive(Debug, Clone)]
pub struct RemoteRepositoryResolver {
    client: HttpClient,
    repositories: Vec<Url>,
}

impl RemoteRepositoryResolver {
    pub fn new(client: HttpClient, repositories: &[String]) -> Result<Self> {
        let repositories = repositories
            .iter()
            .map(|repo| {
                let with_slash = if repo.ends_with('/') {
                    repo.clone()
                } else {
                    format!("{}/", repo)
                };
                Url::parse(&with_slash)
                    .map_err(|e| Error::sandbox(format!("invalid repository {}: {}", repo, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        if repositories.is_empty() {
            return Err(Error::sandbox("no repositories configured"));
        }

        Ok(Self {
            client,
            repositories,
        })
    }

    pub fn repositories(&self) -> &[Url] {
        &self.repositories
    }
}

#[async_trait]
impl DependencyResolver for RemoteRepositoryResolver {
    async fn fetch(&self, dependency: &PinnedDependency, destination: &Path) -> Result<String> {
        let relative = dependency.repository_path()?;

        for repository in &self.repositories {
            let url = repository
                .join(&relative)
                .map_err(|e| Error::sandbox(format!("cannot locate {}: {}", dependency, e)))?;

            if url.scheme() == "file" {
                let source = url
                    .to_file_path()
                    .map_err(|_| Error::sandbox(format!("invalid file repository URL {}", url)))?;
                if copy_if_present(&source, destination).await? {
                    return Ok(url.to_string());
                }
                debug!(%url, "not present in file repository");
                continue;
            }

            match self.client.download_to(url.as_str(), destination).await {
                Ok(_) => return Ok(url.to_string()),
                Err(e) if e.is_not_found() => {
                    debug!(%url, "not present in repository");
                }
                Err(e) => {
                    return Err(Error::sandbox(format!(
                        "failed to fetch {} from {}: {}",
                        dependency, url, e
                    )))
                }
            }
        }

        Err(Error::sandbox(format!(
            "unresolvable dependency {}: not found in {} repositories",
            dependency,
            self.repositories.len()
        )))
    }
}

/// Resolves from a directory in Maven layout, for offline use.
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DependencyResolver for LocalRepositoryResolver {
    async fn fetch(&self, dependency: &PinnedDependency, destination: &Path) -> Result<String> {
        let source = relative_to(&self.root, &dependency.repository_path()?);
        if copy_if_present(&source, destination).await? {
            Ok(source.display().to_string())
        } else {
            Err(Error::sandbox(format!(
                "unresolvable dependency {}: {} does not exist",
                dependency,
                source.display()
            )))
        }
    }
}

/// Join a `/`-separated repository path onto `root`.
pub(crate) fn relative_to(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

async fn copy_if_present(source: &Path, destination: &Path) -> Result<bool> {
    match tokio::fs::metadata(source).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Ok(false),
    }
    let copy_error = |e: std::io::Error| {
        Error::sandbox(format!(
            "failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            e
        ))
    };
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(copy_error)?;
    }
    tokio::fs::copy(source, destination)
        .await
        .map_err(copy_error)?;
    Ok(true)
}

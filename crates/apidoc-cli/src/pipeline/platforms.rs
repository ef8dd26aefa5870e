//! Platform resolution: override table first, structural inference second.

use apidoc_config::OverrideTable;
use apidoc_core::{Error, NamespaceFilter, Platform, PlatformSet, ProjectId, Result};
use apidoc_fs::{DiscoveryOptions, FileSystem, NativeFileSystem};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Where a resolved platform set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformSource {
    Override,
    Inferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatforms {
    pub platforms: PlatformSet,
    pub source: PlatformSource,
    /// Namespace allow-list from the override table; independent of `source`.
    pub namespaces: Option<NamespaceFilter>,
}

/// Resolve the platforms and namespace filter for `project`.
///
/// An override entry's platform set wins outright; inference is not
/// consulted. An empty inferred set is returned as-is.
pub async fn resolve_platforms(
    overrides: &OverrideTable,
    project: &ProjectId,
    source_dir: &Path,
) -> Result<ResolvedPlatforms> {
    let namespaces = overrides.namespaces(project);

    let (platforms, source) = match overrides.platforms(project) {
        Some(platforms) => (platforms, PlatformSource::Override),
        None => (infer_platforms(source_dir).await?, PlatformSource::Inferred),
    };

    info!(
        project = %project,
        platforms = ?platforms.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        source = ?source,
        "Resolved platforms"
    );
    Ok(ResolvedPlatforms {
        platforms,
        source,
        namespaces,
    })
}

/// Platforms whose characteristic files appear anywhere below `source_dir`.
pub async fn infer_platforms(source_dir: &Path) -> Result<PlatformSet> {
    let inspect_error = |e: std::io::Error| Error::InvalidPath {
        path: source_dir.to_path_buf(),
        reason: format!("cannot inspect unpacked sources: {}", e),
    };

    let fs = NativeFileSystem::new(source_dir).map_err(inspect_error)?;
    let extensions: BTreeSet<&str> = Platform::all()
        .iter()
        .flat_map(|p| p.extensions().iter().copied())
        .collect();
    let extensions: Vec<&str> = extensions.into_iter().collect();

    let root = fs.root().to_path_buf();
    let files = fs
        .discover_files(&root, &extensions, &DiscoveryOptions::default())
        .await
        .map_err(inspect_error)?;

    let mut platforms = PlatformSet::new();
    for file in &files {
        let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let ext = format!(".{}", ext);
        for platform in Platform::all() {
            if platform.extensions().contains(&ext.as_str()) {
                platforms.insert(*platform);
            }
        }
        if platforms.len() == Platform::all().len() {
            break;
        }
    }
    Ok(platforms)
}

//! Archive extraction and post-extraction cleanup.

use apidoc_core::{Error, Result};
use apidoc_fetch::{AcquiredFile, Acquirer};
use apidoc_fs::{FileSystem, NativeFileSystem};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Top-level directory some archives wrongly ship their build output in.
///
/// Also a legal top-level namespace; archives publishing `public.*`
/// namespaces lose that content.
pub const BUILT_OUTPUT_DIR: &str = "public";

/// Top-level manifest that would pull extra dependencies into analysis.
pub const PLATFORM_MANIFEST_FILE: &str = "deps.cljs";

/// What post-extraction cleanup removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub entries: usize,
    pub removed_built_output: bool,
    pub removed_platform_manifest: bool,
}

/// Extract every entry of `archive` into `target`.
///
/// Entries whose names would escape `target` are rejected by the zip reader.
pub async fn extract_archive(archive: &Path, target: &Path) -> Result<usize> {
    let archive = archive.to_path_buf();
    let target = target.to_path_buf();
    let archive_for_error = archive.clone();

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&target).map_err(|e| unpack_error(&archive, e))?;
        let file = File::open(&archive).map_err(|e| unpack_error(&archive, e))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| unpack_error(&archive, e))?;
        let entries = zip.len();
        zip.extract(&target).map_err(|e| unpack_error(&archive, e))?;
        Ok::<_, Error>(entries)
    })
    .await
    .map_err(|e| unpack_error(&archive_for_error, e))?
}

/// Apply the cleanup rules to an extracted tree.
pub async fn clean_extracted(target: &Path) -> Result<CleanupReport> {
    let fs = NativeFileSystem::new(target).map_err(|e| unpack_error(target, e))?;
    let mut report = CleanupReport::default();

    let built_output = Path::new(BUILT_OUTPUT_DIR);
    let meta = fs
        .metadata(built_output)
        .await
        .map_err(|e| unpack_error(target, e))?;
    if meta.is_dir {
        warn!(
            dir = BUILT_OUTPUT_DIR,
            "Removing bundled build output; sources in a top-level `public` namespace are removed too"
        );
        fs.remove_dir_all(built_output)
            .await
            .map_err(|e| unpack_error(target, e))?;
        report.removed_built_output = true;
    }

    let manifest = Path::new(PLATFORM_MANIFEST_FILE);
    let meta = fs
        .metadata(manifest)
        .await
        .map_err(|e| unpack_error(target, e))?;
    if meta.is_file {
        debug!(file = PLATFORM_MANIFEST_FILE, "Removing platform dependency manifest");
        fs.remove_file(manifest)
            .await
            .map_err(|e| unpack_error(target, e))?;
        report.removed_platform_manifest = true;
    }

    Ok(report)
}

/// Extract an acquired archive, clean the result and drop the archive if
/// this run downloaded it.
pub async fn unpack(acquired: &AcquiredFile, target: &Path) -> Result<CleanupReport> {
    let entries = extract_archive(&acquired.path, target).await?;
    let mut report = clean_extracted(target).await?;
    report.entries = entries;

    if acquired.downloaded {
        tokio::fs::remove_file(&acquired.path)
            .await
            .map_err(|e| unpack_error(&acquired.path, e))?;
        debug!(path = %acquired.path.display(), "Removed downloaded archive");
    }

    info!(
        entries,
        removed_built_output = report.removed_built_output,
        removed_platform_manifest = report.removed_platform_manifest,
        "Unpacked archive"
    );
    Ok(report)
}

/// Standalone operation: fetch the archive at `location` and unpack it
/// into `output_dir`.
pub async fn unpack_archive(
    acquirer: &Acquirer,
    location: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let download_dir = tempfile::Builder::new()
        .prefix("apidoc-unpack-")
        .tempdir()
        .map_err(|e| Error::acquisition(location, e))?;

    let acquired = acquirer
        .acquire(location, download_dir.path(), "archive.jar")
        .await
        .map_err(|e| Error::acquisition(location, e))?;
    unpack(&acquired, output_dir).await?;

    Ok(output_dir.to_path_buf())
}

fn unpack_error(archive: &Path, e: impl std::fmt::Display) -> Error {
    Error::Unpack {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    }
}

//! Per-run working directory.

use apidoc_core::{ArtifactRef, Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const ARCHIVE_DIR: &str = "archive";
const CONTENTS_DIR: &str = "contents";
const SANDBOX_DIR: &str = "sandbox";

pub const ARCHIVE_FILE_NAME: &str = "artifact.jar";
pub const METADATA_FILE_NAME: &str = "artifact.pom";

/// A uniquely named directory owned by one pipeline run.
///
/// Removed on drop unless the run asked to keep it.
#[derive(Debug)]
pub struct WorkingDirectory {
    dir: TempDir,
}

impl WorkingDirectory {
    /// Create `apidoc-<group>-<artifact>-<version>-XXXX` under `parent`
    /// (system temp dir if `None`).
    pub fn create(parent: Option<&Path>, artifact: &ArtifactRef) -> Result<Self> {
        let prefix = artifact.work_dir_prefix();
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| workdir_error(parent, e))?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| workdir_error(Path::new(&prefix), e))?;

        let workdir = Self { dir };
        for sub in [workdir.archive_dir(), workdir.contents_dir(), workdir.sandbox_dir()] {
            std::fs::create_dir_all(&sub).map_err(|e| workdir_error(&sub, e))?;
        }
        debug!(path = %workdir.path().display(), "Created working directory");
        Ok(workdir)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Downloaded archive and metadata descriptor.
    pub fn archive_dir(&self) -> PathBuf {
        self.path().join(ARCHIVE_DIR)
    }

    /// The unpacked archive; the sandbox's only visible source directory.
    pub fn contents_dir(&self) -> PathBuf {
        self.path().join(CONTENTS_DIR)
    }

    pub fn sandbox_dir(&self) -> PathBuf {
        self.path().join(SANDBOX_DIR)
    }

    /// End of run: delete the directory, or keep it and return its path.
    pub fn finish(self, keep: bool) -> Result<Option<PathBuf>> {
        if keep {
            let path = self.dir.keep();
            info!(path = %path.display(), "Keeping working directory");
            Ok(Some(path))
        } else {
            let path = self.path().to_path_buf();
            self.dir.close().map_err(|e| workdir_error(&path, e))?;
            Ok(None)
        }
    }
}

fn workdir_error(path: &Path, e: std::io::Error) -> Error {
    Error::acquisition(
        path.display().to_string(),
        format!("cannot prepare working directory: {}", e),
    )
}

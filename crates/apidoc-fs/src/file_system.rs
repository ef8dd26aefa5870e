//! FileSystem trait for root-scoped filesystem operations.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// File metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Whether the path exists.
    pub exists: bool,
    /// Whether the path is a file (false if directory or doesn't exist).
    pub is_file: bool,
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// Whether the path is a symbolic link.
    pub is_symlink: bool,
    /// File size in bytes (0 for directories or non-existent files).
    pub size: u64,
}

/// Options for file discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum file size to include (bytes).
    pub max_file_size: Option<u64>,

    /// Follow symbolic links (default: false for security).
    pub follow_symlinks: bool,

    /// Maximum directory depth (default: 100).
    pub max_depth: usize,

    /// Include hidden files (default: false).
    pub include_hidden: bool,

    /// Respect .gitignore files (default: false).
    ///
    /// Unpacked archives are not checkouts; an ignore file shipped inside
    /// one must not hide sources from analysis.
    pub respect_gitignore: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_file_size: Some(10 * 1024 * 1024), // 10MB default
            follow_symlinks: false,
            max_depth: 100,
            include_hidden: false,
            respect_gitignore: false,
        }
    }
}

/// Root-scoped filesystem abstraction.
///
/// Every path is validated against [`FileSystem::root`]; operations that
/// would escape it fail with `io::ErrorKind::PermissionDenied`. Archives
/// under analysis are untrusted, so nothing the pipeline touches on their
/// behalf may leave the run's working directory.
///
/// All methods are async; the native implementation offloads blocking
/// `std::fs` calls to tokio's blocking pool.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read file contents as a string.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` if file doesn't exist.
    /// Returns `io::ErrorKind::InvalidData` if file is not valid UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Get file/directory metadata.
    ///
    /// Returns metadata even if the file doesn't exist (exists=false).
    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Write string contents to a file, replacing it.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Write bytes to a file, replacing it.
    async fn write_bytes(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Remove a file. Symlinks are refused.
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it. Symlinks are refused.
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Atomically rename a file.
    ///
    /// Used for atomic file updates (write to .tmp, then rename).
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and all parent directories.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Discover files below `root` whose extension is in `extensions`.
    ///
    /// Extensions include the dot (e.g. `".clj"`). Returns canonical
    /// absolute paths in sorted order.
    async fn discover_files(
        &self,
        root: &Path,
        extensions: &[&str],
        options: &DiscoveryOptions,
    ) -> io::Result<BTreeSet<PathBuf>>;

    /// The directory this filesystem is scoped to.
    fn root(&self) -> &Path;
}

//! Native filesystem implementation using std::fs + tokio.

use crate::{DiscoveryOptions, FileMetadata, FileSystem};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::task;

/// Native filesystem implementation using std::fs + tokio.
///
/// This implementation wraps blocking std::fs calls with tokio::spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    root: PathBuf,
}

impl NativeFileSystem {
    /// Create a new native filesystem scoped to `root`.
    ///
    /// The root itself may not exist yet, but its parent must.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the root nor its parent can be canonicalized.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let root = match root.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => {
                let parent = root.parent().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("Root does not exist: {}", root.display()),
                    )
                })?;
                let name = root.file_name().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "Invalid root path")
                })?;
                parent.canonicalize()?.join(name)
            }
        };

        Ok(Self { root })
    }

    /// Validate that a path is within the root.
    ///
    /// Existing paths are canonicalized so symlinks cannot point outside;
    /// missing paths are normalized syntactically.
    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let resolved = match absolute.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => match (absolute.parent(), absolute.file_name()) {
                (Some(parent), Some(name)) => match parent.canonicalize() {
                    Ok(canonical_parent) => canonical_parent.join(name),
                    Err(_) => normalize_lexically(&absolute),
                },
                _ => normalize_lexically(&absolute),
            },
        };

        if !resolved.starts_with(&self.root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside root {}",
                    resolved.display(),
                    self.root.display()
                ),
            ));
        }

        Ok(resolved)
    }

    async fn refuse_symlink(&self, path: &Path) -> io::Result<()> {
        let meta = self.metadata(path).await?;
        if meta.is_symlink {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Refusing to remove symlink {}", path.display()),
            ));
        }
        Ok(())
    }
}

/// Removes `.` and resolves `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                result = PathBuf::from(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => result.push(name),
        }
    }
    result
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || Ok(validated.exists()))
            .await
            .map_err(join_error)?
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::read_to_string(&validated))
            .await
            .map_err(join_error)?
    }

    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        // Not canonicalized: a symlink must be reported as a symlink.
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let normalized = normalize_lexically(&absolute);
        if !normalized.starts_with(&self.root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Path traversal detected: {}", normalized.display()),
            ));
        }

        task::spawn_blocking(move || match std::fs::symlink_metadata(&normalized) {
            Ok(meta) => Ok(FileMetadata {
                exists: true,
                is_file: meta.is_file(),
                is_dir: meta.is_dir(),
                is_symlink: meta.file_type().is_symlink(),
                size: meta.len(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileMetadata {
                exists: false,
                is_file: false,
                is_dir: false,
                is_symlink: false,
                size: 0,
            }),
            Err(e) => Err(e),
        })
        .await
        .map_err(join_error)?
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.write_bytes(path, contents.as_bytes()).await
    }

    async fn write_bytes(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        let contents = contents.to_vec();
        task::spawn_blocking(move || std::fs::write(&validated, contents))
            .await
            .map_err(join_error)?
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.refuse_symlink(path).await?;
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::remove_file(&validated))
            .await
            .map_err(join_error)?
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.refuse_symlink(path).await?;
        let validated = self.validate_path(path)?;
        if validated == self.root {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Refusing to remove the filesystem root",
            ));
        }
        task::spawn_blocking(move || std::fs::remove_dir_all(&validated))
            .await
            .map_err(join_error)?
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from_validated = self.validate_path(from)?;
        let to_validated = self.validate_path(to)?;
        task::spawn_blocking(move || std::fs::rename(&from_validated, &to_validated))
            .await
            .map_err(join_error)?
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::create_dir_all(&validated))
            .await
            .map_err(join_error)?
    }

    async fn discover_files(
        &self,
        root: &Path,
        extensions: &[&str],
        options: &DiscoveryOptions,
    ) -> io::Result<BTreeSet<PathBuf>> {
        let validated_root = self.validate_path(root)?;
        let extensions: Vec<String> = extensions.iter().map(|s| s.to_string()).collect();
        let opts = options.clone();
        let scope = self.root.clone();

        task::spawn_blocking(move || {
            discover_files_sync(&validated_root, &extensions, &opts, &scope)
        })
        .await
        .map_err(join_error)?
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/// Synchronous file discovery implementation.
fn discover_files_sync(
    root: &Path,
    extensions: &[String],
    options: &DiscoveryOptions,
    scope: &Path,
) -> io::Result<BTreeSet<PathBuf>> {
    let mut discovered = BTreeSet::new();

    let mut walker = WalkBuilder::new(root);
    walker
        .follow_links(options.follow_symlinks)
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .git_global(false)
        .ignore(options.respect_gitignore)
        .parents(false)
        .max_depth(Some(options.max_depth))
        .max_filesize(options.max_file_size);

    for result in walker.build() {
        let entry = result.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext_with_dot = format!(".{}", ext);
            if extensions.contains(&ext_with_dot) {
                if let Ok(canonical) = path.canonicalize() {
                    if canonical.starts_with(scope) {
                        discovered.insert(canonical);
                    }
                }
            }
        }
    }

    Ok(discovered)
}

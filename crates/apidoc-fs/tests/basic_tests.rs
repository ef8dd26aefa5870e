//! Basic tests for the native FileSystem implementation.

use apidoc_fs::{DiscoveryOptions, FileSystem, NativeFileSystem};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[tokio::test]
async fn test_native_read_write() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let test_file = temp_dir.path().join("test.txt");
    let contents = "Hello, World!";

    fs.write(&test_file, contents).await.unwrap();

    let read_contents = fs.read_to_string(&test_file).await.unwrap();
    assert_eq!(read_contents, contents);
}

#[tokio::test]
async fn test_native_exists() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let test_file = temp_dir.path().join("test.txt");

    assert!(!fs.exists(&test_file).await.unwrap());
    fs.write(&test_file, "test").await.unwrap();
    assert!(fs.exists(&test_file).await.unwrap());
}

#[tokio::test]
async fn test_native_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let test_file = temp_dir.path().join("test.txt");
    let contents = "Hello, World!";
    fs.write(&test_file, contents).await.unwrap();

    let metadata = fs.metadata(&test_file).await.unwrap();
    assert!(metadata.exists);
    assert!(metadata.is_file);
    assert!(!metadata.is_dir);
    assert_eq!(metadata.size, contents.len() as u64);

    let missing = fs.metadata(Path::new("missing.txt")).await.unwrap();
    assert!(!missing.exists);
}

#[tokio::test]
async fn test_native_discover_files() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    fs::create_dir_all(temp_dir.path().join("foo")).unwrap();
    fs::write(temp_dir.path().join("foo/core.clj"), "(ns foo.core)").unwrap();
    fs::write(temp_dir.path().join("foo/ui.cljs"), "(ns foo.ui)").unwrap();
    fs::write(temp_dir.path().join("README.md"), "readme").unwrap();

    let discovered = fs
        .discover_files(temp_dir.path(), &[".clj", ".cljs"], &DiscoveryOptions::default())
        .await
        .unwrap();

    assert_eq!(discovered.len(), 2);
    assert!(discovered.iter().any(|p| p.ends_with("foo/core.clj")));
    assert!(discovered.iter().any(|p| p.ends_with("foo/ui.cljs")));
}

#[tokio::test]
async fn test_discovery_ignores_shipped_gitignore() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    fs::write(temp_dir.path().join(".gitignore"), "*.clj\n").unwrap();
    fs::write(temp_dir.path().join("core.clj"), "(ns core)").unwrap();

    let discovered = fs
        .discover_files(temp_dir.path(), &[".clj"], &DiscoveryOptions::default())
        .await
        .unwrap();

    assert_eq!(discovered.len(), 1);
}

#[tokio::test]
async fn test_native_path_traversal_blocked() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let malicious_paths = vec![
        "../../../etc/passwd",
        "../../.ssh/id_rsa",
        "foo/../../bar/../../baz",
    ];

    for path in malicious_paths {
        let result = fs.read_to_string(Path::new(path)).await;
        assert!(result.is_err(), "Path traversal not blocked: {}", path);

        if let Err(e) = result {
            assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied);
        }
    }
}

#[tokio::test]
async fn test_native_remove_file() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let test_file = temp_dir.path().join("test.txt");
    fs.write(&test_file, "test").await.unwrap();
    assert!(fs.exists(&test_file).await.unwrap());

    fs.remove_file(&test_file).await.unwrap();
    assert!(!fs.exists(&test_file).await.unwrap());
}

#[tokio::test]
async fn test_native_remove_dir_all() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let nested = temp_dir.path().join("public/js/compiled");
    fs.create_dir_all(&nested).await.unwrap();
    fs.write(&nested.join("app.js"), "var x;").await.unwrap();

    fs.remove_dir_all(&temp_dir.path().join("public")).await.unwrap();
    assert!(!fs.exists(&temp_dir.path().join("public")).await.unwrap());

    let err = fs.remove_dir_all(temp_dir.path()).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
}

#[cfg(unix)]
#[tokio::test]
async fn test_native_refuses_to_remove_symlink() {
    let temp_dir = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

    let link = temp_dir.path().join("public");
    std::os::unix::fs::symlink(outside.path(), &link).unwrap();

    let err = fs.remove_dir_all(&link).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    assert!(outside.path().exists());
}

//! Writing validated records.

use apidoc_core::{validate_path, AnalysisResult, Error, Result};
use apidoc_fs::{FileSystem, NativeFileSystem};
use std::path::{Path, PathBuf};
use tracing::info;

/// Serialize `result` to `<output_root>/<group>/<artifact>/<version>/apidoc.json`.
///
/// The file is written next to its final name and renamed into place, so
/// readers never observe a half-written record. Output is pretty-printed
/// JSON with a trailing newline; identical records produce identical bytes.
pub async fn persist(result: &AnalysisResult, output_root: &Path) -> Result<PathBuf> {
    let relative = result.relative_path();
    let target = output_root.join(&relative);
    let persist_error = |e: std::io::Error| Error::Persistence {
        path: target.clone(),
        source: e,
    };

    tokio::fs::create_dir_all(output_root)
        .await
        .map_err(persist_error)?;
    let fs = NativeFileSystem::new(output_root).map_err(persist_error)?;

    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');

    if let Some(parent) = relative.parent() {
        fs.create_dir_all(parent).await.map_err(persist_error)?;
    }
    let temp = relative.with_extension("json.tmp");
    fs.write(&temp, &json).await.map_err(persist_error)?;
    fs.rename(&temp, &relative).await.map_err(persist_error)?;

    let written = fs.root().join(&relative);
    validate_path(&written, fs.root())?;
    info!(path = %written.display(), bytes = json.len(), "Persisted analysis result");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidoc_core::{NamespaceDoc, Platform, PlatformDocTree};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn result() -> AnalysisResult {
        let mut codox = BTreeMap::new();
        codox.insert(
            Platform::Clj,
            PlatformDocTree {
                namespaces: vec![NamespaceDoc::new("widgets.core").with("doc", "Widgets.".into())],
            },
        );
        AnalysisResult {
            group_id: "org.example".to_string(),
            artifact_id: "widgets".to_string(),
            version: "0.3.0".to_string(),
            codox,
            pom_str: "<project/>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deterministic_path_and_bytes() {
        let out = TempDir::new().unwrap();

        let first = persist(&result(), out.path()).await.unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = persist(&result(), out.path()).await.unwrap();
        let second_bytes = std::fs::read(&second).unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with("org.example/widgets/0.3.0/apidoc.json"));
        assert_eq!(first_bytes, second_bytes);
        assert!(first_bytes.ends_with(b"\n"));
        assert!(!first.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_written_keys_are_external_names() {
        let out = TempDir::new().unwrap();
        let path = persist(&result(), out.path()).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["artifact-id", "codox", "group-id", "pom-str", "version"]
        );
    }
}

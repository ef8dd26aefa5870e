//! Sandbox construction.
//!
//! A [`SandboxEnvironment`] is the only execution context analysis code ever
//! runs in. Its class path holds the visible source directory, the pinned
//! table and the artifact under analysis, nothing else; its process
//! environment is rebuilt from scratch rather than inherited.

use crate::resolver::{relative_to, DependencyResolver};
use apidoc_core::{Error, PinnedDependency, ProjectId, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

pub const MANIFEST_FILE_NAME: &str = "sandbox.json";

pub const MANIFEST_SCHEMA_ID: &str = "apidoc/sandbox@1";

const REPOSITORY_DIR: &str = "repository";
const HOME_DIR: &str = "home";

/// One coordinate as it was placed on the class path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
    /// Location relative to the sandbox root, `/`-separated.
    pub path: String,
    pub sha256: String,
    /// Repository URL or local path the jar was copied from.
    pub source: String,
}

/// Audit record written to `sandbox.json`.
///
/// Environment keys are recorded, values never are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxManifest {
    pub schema_id: String,
    /// `name version` of the artifact under analysis.
    pub target: String,
    /// Pinned entries replaced by the target because they share its name.
    #[serde(default)]
    pub superseded: Vec<String>,
    pub dependencies: Vec<ResolvedDependency>,
    pub source_dirs: Vec<String>,
    /// Host keys passed into the sandbox.
    pub passed_keys: Vec<String>,
    /// Host keys present but withheld.
    pub dropped_keys: Vec<String>,
}

/// A constructed, not yet used, isolated execution context.
#[derive(Debug, Clone)]
pub struct SandboxEnvironment {
    root: PathBuf,
    home: PathBuf,
    source_dirs: Vec<PathBuf>,
    classpath: Vec<PathBuf>,
    env: BTreeMap<String, String>,
    manifest: SandboxManifest,
}

impl SandboxEnvironment {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `HOME` of sandboxed processes.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The directories analysis code may see as sources.
    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    pub fn classpath(&self) -> &[PathBuf] {
        &self.classpath
    }

    /// The complete environment a sandboxed process starts with.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn manifest(&self) -> &SandboxManifest {
        &self.manifest
    }

    /// A command that runs `program` inside this sandbox.
    ///
    /// The host environment is cleared, the working directory is the sandbox
    /// root, stdin is closed and the child is killed if the handle is dropped.
    pub fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.env_clear()
            .envs(&self.env)
            .current_dir(&self.root)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

/// Builds [`SandboxEnvironment`]s from an immutable pinned table.
pub struct SandboxBuilder {
    pinned: Arc<[PinnedDependency]>,
    resolver: Arc<dyn DependencyResolver>,
    pass_env: Vec<String>,
    host_env: Option<Vec<(OsString, OsString)>>,
}

impl SandboxBuilder {
    pub fn new(pinned: impl Into<Arc<[PinnedDependency]>>, resolver: Arc<dyn DependencyResolver>) -> Self {
        Self {
            pinned: pinned.into(),
            resolver,
            pass_env: Vec::new(),
            host_env: None,
        }
    }

    /// Host environment keys to pass through, if present.
    pub fn with_pass_env(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.pass_env = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Use `env` instead of the process environment as the host environment.
    pub fn with_host_env<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.host_env = Some(env.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn pinned(&self) -> &[PinnedDependency] {
        &self.pinned
    }

    /// The pinned table with `target` appended, minus any pinned entry that
    /// shares the target's name. Returns the list and the superseded entries.
    pub fn effective_dependencies(
        &self,
        target: &PinnedDependency,
    ) -> Result<(Vec<PinnedDependency>, Vec<PinnedDependency>)> {
        let target_key = target.project()?.normalized();
        let mut effective = Vec::with_capacity(self.pinned.len() + 1);
        let mut superseded = Vec::new();

        for dep in self.pinned.iter() {
            if ProjectId::parse(&dep.name)?.normalized() == target_key {
                superseded.push(dep.clone());
            } else {
                effective.push(dep.clone());
            }
        }
        effective.push(target.clone());
        Ok((effective, superseded))
    }

    /// Resolve every dependency into `sandbox_dir` and assemble the context.
    ///
    /// `source_dir` is the single visible source directory. Any unresolvable
    /// coordinate aborts construction.
    pub async fn build(
        &self,
        target: &PinnedDependency,
        source_dir: &Path,
        sandbox_dir: &Path,
    ) -> Result<SandboxEnvironment> {
        let (effective, superseded) = self.effective_dependencies(target)?;
        // Versions become path components below the repository directory.
        for dep in &effective {
            dep.validate()?;
        }
        for dep in &superseded {
            info!(pinned = %dep, target = %target, "Pinned dependency superseded by target");
        }

        let repository = sandbox_dir.join(REPOSITORY_DIR);
        let home = sandbox_dir.join(HOME_DIR);
        for dir in [&repository, &home] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                Error::sandbox(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        let mut classpath = vec![source_dir.to_path_buf()];
        let mut resolved = Vec::with_capacity(effective.len());
        for dep in &effective {
            let relative = format!("{}/{}", REPOSITORY_DIR, dep.repository_path()?);
            let destination = relative_to(sandbox_dir, &relative);
            let source = self.resolver.fetch(dep, &destination).await?;
            let sha256 = sha256_file(&destination).await?;
            debug!(dependency = %dep, %source, %sha256, "Resolved dependency");

            classpath.push(destination);
            resolved.push(ResolvedDependency {
                name: dep.name.clone(),
                version: dep.version.clone(),
                exclusions: dep.exclusions.clone(),
                path: relative,
                sha256,
                source,
            });
        }

        let (host_env, unrepresentable) = match &self.host_env {
            Some(vars) => split_host_env(vars.iter().cloned()),
            None => split_host_env(std::env::vars_os()),
        };
        let wanted: BTreeSet<&str> = self.pass_env.iter().map(String::as_str).collect();
        let mut env = BTreeMap::new();
        let mut passed_keys = Vec::new();
        let mut dropped_keys = unrepresentable;
        for (key, value) in host_env {
            if wanted.contains(key.as_str()) {
                passed_keys.push(key.clone());
                env.insert(key, value);
            } else {
                dropped_keys.push(key);
            }
        }
        dropped_keys.sort();
        dropped_keys.dedup();

        let joined = std::env::join_paths(&classpath)
            .map_err(|e| Error::sandbox(format!("cannot build class path: {}", e)))?
            .into_string()
            .map_err(|_| Error::sandbox("class path is not valid UTF-8"))?;
        env.insert("CLASSPATH".to_string(), joined);
        env.insert("HOME".to_string(), home.display().to_string());

        let manifest = SandboxManifest {
            schema_id: MANIFEST_SCHEMA_ID.to_string(),
            target: target.to_string(),
            superseded: superseded.iter().map(ToString::to_string).collect(),
            dependencies: resolved,
            source_dirs: vec![source_dir.display().to_string()],
            passed_keys,
            dropped_keys,
        };
        write_manifest(&manifest, &sandbox_dir.join(MANIFEST_FILE_NAME)).await?;

        info!(
            target = %target,
            dependencies = manifest.dependencies.len(),
            passed_env = manifest.passed_keys.len(),
            "Sandbox ready"
        );

        Ok(SandboxEnvironment {
            root: sandbox_dir.to_path_buf(),
            home,
            source_dirs: vec![source_dir.to_path_buf()],
            classpath,
            env,
            manifest,
        })
    }
}

impl std::fmt::Debug for SandboxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxBuilder")
            .field("pinned", &self.pinned)
            .field("pass_env", &self.pass_env)
            .finish_non_exhaustive()
    }
}

/// Splits host variables into those the sandbox can carry and the lossy
/// names of those it cannot (non-UTF-8 key or value). The latter are never
/// passed, but still show up in the audit as dropped.
fn split_host_env(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> (BTreeMap<String, String>, Vec<String>) {
    let mut usable = BTreeMap::new();
    let mut unrepresentable = Vec::new();
    for (key, value) in vars {
        match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => {
                usable.insert(key, value);
            }
            (Ok(key), Err(_)) => unrepresentable.push(key),
            (Err(key), _) => unrepresentable.push(key.to_string_lossy().into_owned()),
        }
    }
    (usable, unrepresentable)
}

async fn sha256_file(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&path)?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok::<_, std::io::Error>(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| Error::sandbox(format!("checksum task failed: {}", e)))?
    .map_err(|e| Error::sandbox(format!("cannot checksum dependency: {}", e)))
}

async fn write_manifest(manifest: &SandboxManifest, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| Error::sandbox(format!("cannot encode sandbox manifest: {}", e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::sandbox(format!("cannot write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::LocalRepositoryResolver;

    fn builder(pinned: Vec<PinnedDependency>) -> SandboxBuilder {
        SandboxBuilder::new(pinned, Arc::new(LocalRepositoryResolver::new("/nonexistent")))
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_host_vars_are_reported_dropped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("PATH"), OsString::from("/usr/bin")),
            (OsString::from_vec(b"BAD\xffKEY".to_vec()), OsString::from("x")),
            (OsString::from("LATIN_VALUE"), OsString::from_vec(b"Jos\xe9".to_vec())),
        ];
        let (usable, unrepresentable) = split_host_env(vars);
        assert_eq!(usable.keys().collect::<Vec<_>>(), vec!["PATH"]);
        assert_eq!(unrepresentable, vec!["BAD\u{FFFD}KEY", "LATIN_VALUE"]);
    }

    #[test]
    fn test_target_supersedes_pinned_entry() {
        let builder = builder(vec![
            PinnedDependency::new("org.clojure/clojure", "1.11.1"),
            PinnedDependency::new("org.clojure/tools.reader", "1.3.6"),
        ]);
        let target = PinnedDependency::new("org.clojure/tools.reader", "1.4.0");

        let (effective, superseded) = builder.effective_dependencies(&target).unwrap();
        let names: Vec<_> = effective.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            names,
            vec!["org.clojure/clojure 1.11.1", "org.clojure/tools.reader 1.4.0"]
        );
        assert_eq!(superseded.len(), 1);
        assert_eq!(superseded[0].version, "1.3.6");
    }

    #[test]
    fn test_supersede_uses_normalized_names() {
        let builder = builder(vec![PinnedDependency::new("manifold/manifold", "0.4.2")]);
        let (effective, superseded) = builder
            .effective_dependencies(&PinnedDependency::new("manifold", "0.4.3"))
            .unwrap();
        assert_eq!(effective.len(), 1);
        assert_eq!(superseded.len(), 1);
    }

    #[test]
    fn test_sha256_of_empty_input() {
        assert_eq!(
            hex::encode(Sha256::digest(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

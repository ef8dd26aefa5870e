#![allow(dead_code)]

use apidoc_cli::Pipeline;
use apidoc_config::OverrideTable;
use apidoc_core::{
    ArtifactRef, Error, NamespaceDoc, PinnedDependency, Platform, PlatformDocTree, Result,
};
use apidoc_fetch::{Acquirer, HttpClient};
use apidoc_sandbox::{
    AnalysisRequest, LocalRepositoryResolver, PlatformAnalyzer, SandboxBuilder,
    SandboxEnvironment,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const PROJECT: &str = "org.example/foo";
pub const VERSION: &str = "1.0.0";

/// Write a zip archive containing `entries` (name, contents).
pub fn build_jar(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn pinned() -> Vec<PinnedDependency> {
    vec![
        PinnedDependency::new("org.clojure/clojure", "1.11.1"),
        PinnedDependency::new("org.clojure/clojurescript", "1.11.60"),
    ]
}

fn publish(repo: &Path, dep: &PinnedDependency, source: &Path) {
    let path = dep
        .repository_path()
        .unwrap()
        .split('/')
        .fold(repo.to_path_buf(), |p, part| p.join(part));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::copy(source, path).unwrap();
}

/// Analyzer double that records every request and returns one namespace
/// per platform.
#[derive(Default)]
pub struct RecordingAnalyzer {
    pub requests: Mutex<Vec<AnalysisRequest>>,
    /// Platforms whose analysis returned a tree, in completion order.
    pub completed: Mutex<Vec<Platform>>,
    pub fail_on: Option<Platform>,
    pub delays: BTreeMap<Platform, Duration>,
    pub blank_names: bool,
}

impl RecordingAnalyzer {
    pub fn failing_on(platform: Platform) -> Self {
        Self {
            fail_on: Some(platform),
            ..Default::default()
        }
    }

    pub fn with_blank_names() -> Self {
        Self {
            blank_names: true,
            ..Default::default()
        }
    }

    /// Hold `platform`'s analysis for `delay` before it answers.
    pub fn delayed(mut self, platform: Platform, delay: Duration) -> Self {
        self.delays.insert(platform, delay);
        self
    }

    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<Platform> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformAnalyzer for RecordingAnalyzer {
    async fn analyze(
        &self,
        sandbox: &SandboxEnvironment,
        request: &AnalysisRequest,
    ) -> Result<PlatformDocTree> {
        self.requests.lock().unwrap().push(request.clone());
        assert_eq!(sandbox.source_dirs(), &[request.source_dir.clone()]);

        if let Some(delay) = self.delays.get(&request.platform) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_on == Some(request.platform) {
            return Err(Error::analysis(request.platform, "could not load foo.core"));
        }
        let name = if self.blank_names {
            String::new()
        } else {
            format!("foo.core.{}", request.platform)
        };
        self.completed.lock().unwrap().push(request.platform);
        Ok(PlatformDocTree {
            namespaces: vec![NamespaceDoc::new(name)],
        })
    }
}

/// Scratch layout for one pipeline test: a local repository holding the
/// pinned jars and the target, a work root and an output root.
pub struct Harness {
    pub scratch: TempDir,
    pub analyzer: Arc<RecordingAnalyzer>,
    pub overrides: OverrideTable,
    pub keep_workdir: bool,
}

impl Harness {
    pub fn new(jar_entries: &[(&str, &str)]) -> Self {
        Self::with_analyzer(jar_entries, RecordingAnalyzer::default())
    }

    pub fn with_analyzer(jar_entries: &[(&str, &str)], analyzer: RecordingAnalyzer) -> Self {
        let scratch = TempDir::new().unwrap();
        for dir in ["repo", "inputs", "work", "out"] {
            std::fs::create_dir_all(scratch.path().join(dir)).unwrap();
        }
        let harness = Self {
            scratch,
            analyzer: Arc::new(analyzer),
            overrides: OverrideTable::default(),
            keep_workdir: false,
        };

        build_jar(&harness.jar_path(), jar_entries);
        std::fs::write(harness.pom_path(), "").unwrap();

        let filler = harness.path("inputs/filler.jar");
        build_jar(&filler, &[("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n")]);
        for dep in pinned() {
            publish(&harness.path("repo"), &dep, &filler);
        }
        publish(
            &harness.path("repo"),
            &PinnedDependency::new(PROJECT, VERSION),
            &harness.jar_path(),
        );
        harness
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.scratch.path().join(relative)
    }

    pub fn jar_path(&self) -> PathBuf {
        self.path("inputs/foo-1.0.0.jar")
    }

    pub fn pom_path(&self) -> PathBuf {
        self.path("inputs/foo-1.0.0.pom")
    }

    pub fn artifact(&self) -> ArtifactRef {
        ArtifactRef::new(
            PROJECT,
            VERSION,
            self.jar_path().to_str().unwrap(),
            self.pom_path().to_str().unwrap(),
        )
        .unwrap()
    }

    pub fn pipeline(&self, output: &str) -> Pipeline {
        let sandbox = SandboxBuilder::new(
            pinned(),
            Arc::new(LocalRepositoryResolver::new(self.path("repo"))),
        )
        .with_pass_env(["PATH"]);

        Pipeline::new(
            Acquirer::new(HttpClient::new().unwrap()),
            sandbox,
            self.analyzer.clone(),
            self.overrides.clone(),
            self.path(output),
        )
        .unwrap()
        .work_root(self.path("work"))
        .keep_workdir(self.keep_workdir)
    }

    /// Every file below `relative`, as sorted `/`-separated relative paths.
    pub fn files_under(&self, relative: &str) -> BTreeSet<String> {
        let root = self.path(relative);
        let mut found = BTreeSet::new();
        let mut stack = vec![root.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(&root).unwrap();
                    found.insert(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        found
    }

    /// Entries directly below `relative`.
    pub fn dir_entries(&self, relative: &str) -> usize {
        std::fs::read_dir(self.path(relative)).unwrap().count()
    }
}

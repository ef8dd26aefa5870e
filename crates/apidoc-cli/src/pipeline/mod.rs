//! The analysis pipeline.
//!
//! One [`Pipeline::run`] takes an [`ArtifactRef`] through acquisition,
//! unpacking, sandbox construction, platform resolution, dispatch, assembly
//! with validation, and persistence, in that order. Any failure aborts the
//! run and is reported as a [`PipelineError`] naming the artifact and stage;
//! nothing is written unless every stage succeeded.

pub mod assemble;
pub mod dispatch;
pub mod metadata;
pub mod persist;
pub mod platforms;
pub mod unpack;
pub mod workdir;

use apidoc_config::{ApidocConfig, OverrideTable};
use apidoc_core::{ArtifactRef, Error, PinnedDependency, Result, SchemaValidator, Stage};
use apidoc_fetch::{Acquirer, HttpClient};
use apidoc_sandbox::{
    PlatformAnalyzer, RemoteRepositoryResolver, SandboxBuilder, SubprocessAnalyzer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn, Instrument};
use workdir::{WorkingDirectory, ARCHIVE_FILE_NAME, METADATA_FILE_NAME};

pub use unpack::unpack_archive;

/// A failed pipeline run.
#[derive(Debug, Error)]
#[error("{stage} failed for {artifact}: {source}")]
pub struct PipelineError {
    /// `group/artifact version`, or the raw project input when it did not parse.
    pub artifact: String,
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    pub fn new(artifact: impl Into<String>, source: Error) -> Self {
        Self {
            artifact: artifact.into(),
            stage: source.stage(),
            source,
        }
    }
}

/// Runs artifacts through the full analysis pipeline.
pub struct Pipeline {
    acquirer: Acquirer,
    sandbox: SandboxBuilder,
    analyzer: Arc<dyn PlatformAnalyzer>,
    overrides: OverrideTable,
    validator: SchemaValidator,
    output_root: PathBuf,
    work_root: Option<PathBuf>,
    keep_workdir: bool,
    max_concurrent_platforms: usize,
}

impl Pipeline {
    pub fn new(
        acquirer: Acquirer,
        sandbox: SandboxBuilder,
        analyzer: Arc<dyn PlatformAnalyzer>,
        overrides: OverrideTable,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            acquirer,
            sandbox,
            analyzer,
            overrides,
            validator: SchemaValidator::new()?,
            output_root: output_root.into(),
            work_root: None,
            keep_workdir: false,
            max_concurrent_platforms: default_concurrency(),
        })
    }

    /// Wire the pipeline from configuration: remote repositories, the
    /// configured analyzer command and the override table.
    pub fn from_config(config: &ApidocConfig, output_root: impl Into<PathBuf>) -> Result<Self> {
        let client = HttpClient::with_timeout(Duration::from_secs(config.settings.http_timeout_secs))
            .map_err(|e| Error::sandbox(format!("cannot create HTTP client: {}", e)))?;
        let resolver = RemoteRepositoryResolver::new(client.clone(), &config.sandbox.repositories)?;
        let sandbox = SandboxBuilder::new(config.sandbox.pinned.clone(), Arc::new(resolver))
            .with_pass_env(config.sandbox.pass_env.iter().cloned());
        let analyzer = SubprocessAnalyzer::new(
            config.analyzer.program.clone(),
            config.analyzer.args.clone(),
        );
        let overrides = OverrideTable::new(&config.overrides)?;

        let mut pipeline = Self::new(
            Acquirer::new(client),
            sandbox,
            Arc::new(analyzer),
            overrides,
            output_root,
        )?
        .keep_workdir(config.settings.keep_workdir);
        if let Some(work_root) = &config.settings.work_dir {
            pipeline = pipeline.work_root(work_root);
        }
        if let Some(limit) = config.settings.max_concurrent_platforms {
            pipeline = pipeline.max_concurrent_platforms(limit);
        }
        Ok(pipeline)
    }

    /// Parent directory for working directories (system temp dir by default).
    pub fn work_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_root = Some(path.into());
        self
    }

    pub fn keep_workdir(mut self, keep: bool) -> Self {
        self.keep_workdir = keep;
        self
    }

    pub fn max_concurrent_platforms(mut self, limit: usize) -> Self {
        self.max_concurrent_platforms = limit.max(1);
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Analyze one artifact and return the path of the persisted record.
    pub async fn run(&self, artifact: &ArtifactRef) -> std::result::Result<PathBuf, PipelineError> {
        let span = tracing::info_span!("analyze", artifact = %artifact);
        self.run_stages(artifact)
            .instrument(span)
            .await
            .map_err(|e| PipelineError::new(artifact.to_string(), e))
    }

    async fn run_stages(&self, artifact: &ArtifactRef) -> Result<PathBuf> {
        let workdir = WorkingDirectory::create(self.work_root.as_deref(), artifact)?;
        let outcome = self.run_in(artifact, &workdir).await;

        // Kept on failure too when asked, so a broken run can be inspected.
        if let Err(e) = workdir.finish(self.keep_workdir) {
            warn!(error = %e, "Failed to remove working directory");
        }
        outcome
    }

    async fn run_in(&self, artifact: &ArtifactRef, workdir: &WorkingDirectory) -> Result<PathBuf> {
        // Acquisition
        let archive = self
            .acquirer
            .acquire(&artifact.archive_location, &workdir.archive_dir(), ARCHIVE_FILE_NAME)
            .await
            .map_err(|e| Error::acquisition(&artifact.archive_location, e))?;
        let descriptor = self
            .acquirer
            .acquire(&artifact.metadata_location, &workdir.archive_dir(), METADATA_FILE_NAME)
            .await
            .map_err(|e| Error::acquisition(&artifact.metadata_location, e))?;
        let pom_str = metadata::read_metadata(&descriptor.path)
            .await
            .map_err(|e| Error::acquisition(&artifact.metadata_location, e))?;
        info!(archive = %archive.path.display(), "Acquired artifact");

        // Unpack
        let contents = workdir.contents_dir();
        unpack::unpack(&archive, &contents).await?;

        // Sandbox
        let target = PinnedDependency::new(artifact.project.to_string(), artifact.version.clone());
        let sandbox = self
            .sandbox
            .build(&target, &contents, &workdir.sandbox_dir())
            .await?;

        // Platforms
        let resolved =
            platforms::resolve_platforms(&self.overrides, &artifact.project, &contents).await?;
        if resolved.platforms.is_empty() {
            warn!("No platform sources found; result will have no documentation");
        }

        // Dispatch
        let codox = dispatch::dispatch(
            self.analyzer.as_ref(),
            &sandbox,
            &resolved.platforms,
            &contents,
            resolved.namespaces.as_ref(),
            self.max_concurrent_platforms,
        )
        .await?;

        // Assemble + validate
        let result = assemble::assemble_validated(
            &self.validator,
            artifact,
            &resolved.platforms,
            codox,
            pom_str,
        )?;

        // Persist
        persist::persist(&result, &self.output_root).await
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("output_root", &self.output_root)
            .field("work_root", &self.work_root)
            .field("keep_workdir", &self.keep_workdir)
            .field("max_concurrent_platforms", &self.max_concurrent_platforms)
            .finish_non_exhaustive()
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

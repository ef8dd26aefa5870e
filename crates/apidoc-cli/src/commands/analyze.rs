use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use apidoc_config::ConfigManager;
use apidoc_core::ArtifactRef;
use clap::Args;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Project identifier, `group/artifact` or `artifact`
    #[arg(long)]
    pub project: String,

    /// Exact version of the artifact
    #[arg(long)]
    pub version: String,

    /// Archive location (local path or http(s) URL)
    #[arg(long)]
    pub jar: String,

    /// Metadata descriptor location (local path or http(s) URL)
    #[arg(long)]
    pub pom: String,

    /// Directory the result is written below (default: a fresh temp dir)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the working directory for inspection
    #[arg(long)]
    pub keep_workdir: bool,
}

pub fn handle_analyze_command(args: AnalyzeArgs, config: Option<PathBuf>) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    let written = runtime.block_on(analyze(args, config))?;
    println!("{}", written.display());
    Ok(())
}

async fn analyze(args: AnalyzeArgs, config: Option<PathBuf>) -> Result<PathBuf> {
    // All four inputs are checked before any I/O.
    let artifact = ArtifactRef::new(&args.project, &args.version, &args.jar, &args.pom)
        .map_err(|e| crate::pipeline::PipelineError::new(args.project.clone(), e))?;

    let manager = ConfigManager::load_or_default(config.as_deref())
        .await
        .context("Failed to load config")?;
    let mut config = manager.into_config();
    if args.keep_workdir {
        config.settings.keep_workdir = true;
    }

    let output_root = match args.output_dir.or_else(|| config.settings.output_dir.clone()) {
        Some(dir) => dir,
        None => tempfile::Builder::new()
            .prefix("apidoc-output-")
            .tempdir()
            .context("Failed to create output directory")?
            .keep(),
    };

    let pipeline = Pipeline::from_config(&config, output_root)
        .context("Failed to set up analysis pipeline")?;
    Ok(pipeline.run(&artifact).await?)
}

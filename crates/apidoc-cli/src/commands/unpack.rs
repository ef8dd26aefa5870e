use crate::pipeline::unpack_archive;
use anyhow::{Context, Result};
use apidoc_fetch::{Acquirer, HttpClient};
use clap::Args;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Archive location (local path or http(s) URL)
    pub archive: String,

    /// Directory to extract into
    pub output_dir: PathBuf,
}

pub fn handle_unpack_command(args: UnpackArgs) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let acquirer = Acquirer::new(HttpClient::new()?);
        let out = unpack_archive(&acquirer, &args.archive, &args.output_dir)
            .await
            .with_context(|| format!("Failed to unpack '{}'", args.archive))?;
        println!("✓ Unpacked into: {}", out.display());
        Ok::<_, anyhow::Error>(())
    })
}

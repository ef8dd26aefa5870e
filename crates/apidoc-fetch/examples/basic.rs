//! Acquire an archive and report where it landed.
//!
//! cargo run -p apidoc-fetch --example basic -- <location> [target-dir]

use apidoc_fetch::{Acquirer, HttpClient};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let location = args
        .next()
        .ok_or("usage: basic <location> [target-dir]")?;
    let target = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    let acquirer = Acquirer::new(HttpClient::new()?);
    let acquired = acquirer.acquire(&location, &target, "artifact.jar").await?;

    println!(
        "{} ({})",
        acquired.path.display(),
        if acquired.downloaded { "downloaded" } else { "local" }
    );
    Ok(())
}

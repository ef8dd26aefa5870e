use anyhow::{Context, Result};
use apidoc_config::ConfigManager;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Initialize config file at ~/.apidoc/config.toml
    Init,

    /// Print the effective configuration as TOML
    Show,

    /// Show config file path
    Path,

    /// Validate config file
    Validate,
}

pub fn handle_config_command(cmd: ConfigCommand, config: Option<PathBuf>) -> Result<()> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        match cmd {
            ConfigCommand::Init => init_config(config.as_deref()).await,
            ConfigCommand::Show => show_config(config.as_deref()).await,
            ConfigCommand::Path => show_config_path(config.as_deref()),
            ConfigCommand::Validate => validate_config(config.as_deref()).await,
        }
    })
}

fn resolve_path(config: Option<&Path>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ConfigManager::config_path()?),
    }
}

async fn init_config(config: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(config)?;

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("To reinitialize, please delete the existing config first.");
        return Ok(());
    }

    ConfigManager::init_at(&config_path).await?;
    println!("✓ Initialized config at: {}", config_path.display());
    Ok(())
}

async fn show_config(config: Option<&Path>) -> Result<()> {
    let manager = ConfigManager::load_or_default(config)
        .await
        .context("Failed to load config")?;
    let toml_str = toml::to_string_pretty(manager.config()).context("Failed to render config")?;
    print!("{}", toml_str);
    Ok(())
}

fn show_config_path(config: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(config)?.display());
    Ok(())
}

async fn validate_config(config: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(config)?;
    let manager = ConfigManager::load_from(&config_path)
        .await
        .context("Config not found or invalid. Run 'apidoc config init' first.")?;
    let overrides = manager.override_table()?;
    let config = manager.config();

    println!("✓ Config is valid");
    println!("  Version: {}", config.version);
    println!("  Repositories: {}", config.sandbox.repositories.len());
    println!("  Pinned dependencies: {}", config.sandbox.pinned.len());
    println!("  Analyzer: {} (from {})", config.analyzer.program, config.analyzer.artifact);
    println!("  Overrides: {}", overrides.len());
    Ok(())
}

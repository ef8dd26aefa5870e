//! Checks run on every loaded configuration before it reaches the pipeline.

use crate::types::{AnalyzerCommand, ApidocConfig, ProjectOverride};
use apidoc_core::{PinnedDependency, ProjectId};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment keys the sandbox sets itself.
const RESERVED_ENV: &[&str] = &["CLASSPATH", "HOME"];

/// Fragments that mark an environment key as credential-bearing.
const SECRET_MARKERS: &[&str] = &["TOKEN", "SECRET", "PASSWORD", "PASSWD", "CREDENTIAL"];

/// Security-related errors
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Invalid repository URL {url}: {reason}")]
    InvalidRepository { url: String, reason: String },

    #[error("Invalid environment variable name: {0:?}")]
    InvalidEnvName(String),

    #[error("Environment variable {0} is managed by the sandbox and cannot be passed through")]
    ReservedEnv(String),

    #[error("Environment variable {0} looks like a credential and cannot be passed into the sandbox")]
    SecretEnv(String),

    #[error("Invalid pinned dependency {name}: {reason}")]
    InvalidPinned { name: String, reason: String },

    #[error("Pinned dependency {0} is listed more than once")]
    DuplicatePinned(String),

    #[error("Invalid override for {project}: {reason}")]
    InvalidOverride { project: String, reason: String },

    #[error("max_concurrent_platforms must be at least 1")]
    ZeroConcurrency,

    #[error("Invalid analyzer command: {0}")]
    InvalidAnalyzer(String),

    #[error("Analyzer artifact {0} is not in [[sandbox.pinned]]; its jar would never reach the class path")]
    AnalyzerNotPinned(String),
}

/// Validate the whole configuration.
pub fn validate_config(config: &ApidocConfig) -> Result<(), SecurityError> {
    if config.settings.max_concurrent_platforms == Some(0) {
        return Err(SecurityError::ZeroConcurrency);
    }
    for repository in &config.sandbox.repositories {
        validate_repository_url(repository)?;
    }
    for key in &config.sandbox.pass_env {
        validate_pass_env(key)?;
    }
    validate_pinned(&config.sandbox.pinned)?;
    validate_analyzer(&config.analyzer, &config.sandbox.pinned)?;
    for entry in &config.overrides {
        validate_override(entry)?;
    }
    Ok(())
}

/// Repositories must be absolute http(s) or file URLs.
pub fn validate_repository_url(repository: &str) -> Result<(), SecurityError> {
    let invalid = |reason: &str| SecurityError::InvalidRepository {
        url: repository.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(repository).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {
            if url.host_str().is_none() {
                return Err(invalid("missing host"));
            }
        }
        "file" => {}
        other => return Err(invalid(&format!("unsupported scheme {}", other))),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("credentials in repository URLs are not allowed"));
    }
    Ok(())
}

/// Validate a pass-through environment key.
///
/// Keys must be non-empty `[A-Za-z0-9_]`, must not be one the sandbox sets
/// itself, and must not look like a credential.
pub fn validate_pass_env(key: &str) -> Result<(), SecurityError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SecurityError::InvalidEnvName(key.to_string()));
    }

    let upper = key.to_ascii_uppercase();
    if RESERVED_ENV.contains(&upper.as_str()) {
        return Err(SecurityError::ReservedEnv(key.to_string()));
    }
    if SECRET_MARKERS.iter().any(|marker| upper.contains(marker)) {
        return Err(SecurityError::SecretEnv(key.to_string()));
    }
    Ok(())
}

/// The analyzer must name a program and a pinned entry that provides it.
pub fn validate_analyzer(
    analyzer: &AnalyzerCommand,
    pinned: &[PinnedDependency],
) -> Result<(), SecurityError> {
    if analyzer.program.trim().is_empty() {
        return Err(SecurityError::InvalidAnalyzer("program is empty".to_string()));
    }
    let wanted = ProjectId::parse(&analyzer.artifact)
        .map_err(|e| SecurityError::InvalidAnalyzer(e.to_string()))?
        .normalized();
    let provided = pinned.iter().any(|dep| {
        dep.project()
            .map(|project| project.normalized() == wanted)
            .unwrap_or(false)
    });
    if !provided {
        return Err(SecurityError::AnalyzerNotPinned(analyzer.artifact.clone()));
    }
    Ok(())
}

/// Each pinned entry must be well-formed and appear once.
pub fn validate_pinned(pinned: &[PinnedDependency]) -> Result<(), SecurityError> {
    let mut seen = BTreeSet::new();
    for dep in pinned {
        dep.validate().map_err(|e| SecurityError::InvalidPinned {
            name: dep.name.clone(),
            reason: e.to_string(),
        })?;
        let key = dep
            .project()
            .map_err(|e| SecurityError::InvalidPinned {
                name: dep.name.clone(),
                reason: e.to_string(),
            })?
            .normalized();
        if !seen.insert(key) {
            return Err(SecurityError::DuplicatePinned(dep.name.clone()));
        }
    }
    Ok(())
}

pub fn validate_override(entry: &ProjectOverride) -> Result<(), SecurityError> {
    let invalid = |reason: &str| SecurityError::InvalidOverride {
        project: entry.project.clone(),
        reason: reason.to_string(),
    };

    apidoc_core::ProjectId::parse(&entry.project).map_err(|e| invalid(&e.to_string()))?;

    if let Some(platforms) = &entry.platforms {
        if platforms.is_empty() {
            return Err(invalid("platforms must not be empty"));
        }
    }
    if let Some(namespaces) = &entry.namespaces {
        if namespaces.is_empty() {
            return Err(invalid("namespaces must not be empty"));
        }
        for ns in namespaces {
            if ns.trim().is_empty() || ns.contains(',') || ns.chars().any(char::is_whitespace) {
                return Err(invalid(&format!("invalid namespace name {:?}", ns)));
            }
        }
    }
    Ok(())
}

/// Set restrictive permissions on config file (Unix only)
#[cfg(unix)]
pub fn set_config_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_config_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

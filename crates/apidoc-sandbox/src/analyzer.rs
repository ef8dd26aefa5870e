//! The per-platform extraction seam.

use crate::environment::SandboxEnvironment;
use apidoc_core::{Error, NamespaceFilter, Platform, PlatformDocTree, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, info};

/// Lines of stderr kept in an analysis error.
const STDERR_EXCERPT_LINES: usize = 20;

/// What one platform's analysis is asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub platform: Platform,
    pub source_dir: PathBuf,
    /// `None` analyzes every discoverable namespace.
    pub namespaces: Option<NamespaceFilter>,
}

impl AnalysisRequest {
    pub fn new(platform: Platform, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            source_dir: source_dir.into(),
            namespaces: None,
        }
    }

    pub fn with_namespaces(mut self, namespaces: Option<NamespaceFilter>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// `--platform <p> --source-dir <dir> [--namespaces a,b]`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--platform".to_string(),
            self.platform.as_str().to_string(),
            "--source-dir".to_string(),
            self.source_dir.display().to_string(),
        ];
        if let Some(filter) = &self.namespaces {
            args.push("--namespaces".to_string());
            args.push(filter.to_arg());
        }
        args
    }
}

/// Produces one platform's documentation tree inside a sandbox.
///
/// Implementations must not reach outside the sandbox they are handed, and
/// must report failures rather than return a partial tree.
#[async_trait]
pub trait PlatformAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        sandbox: &SandboxEnvironment,
        request: &AnalysisRequest,
    ) -> Result<PlatformDocTree>;
}

/// Runs an external program in the sandbox and reads a JSON doc tree from
/// its stdout.
#[derive(Debug, Clone)]
pub struct SubprocessAnalyzer {
    program: String,
    args: Vec<String>,
}

impl SubprocessAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl PlatformAnalyzer for SubprocessAnalyzer {
    async fn analyze(
        &self,
        sandbox: &SandboxEnvironment,
        request: &AnalysisRequest,
    ) -> Result<PlatformDocTree> {
        let platform = request.platform;
        let mut cmd = sandbox.command(&self.program);
        cmd.args(&self.args)
            .args(request.to_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(program = %self.program, args = ?request.to_args(), "Spawning analyzer");
        let output = cmd.output().await.map_err(|e| {
            Error::analysis(platform, format!("failed to spawn {}: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::analysis(
                platform,
                format!("{} exited with {}: {}", self.program, output.status, excerpt(&stderr)),
            ));
        }

        let tree: PlatformDocTree = serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::analysis(platform, format!("unparsable analyzer output: {}", e))
        })?;
        info!(%platform, namespaces = tree.namespaces.len(), "Platform analyzed");
        Ok(tree)
    }
}

/// The last few lines of `stderr`.
fn excerpt(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_EXCERPT_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_args() {
        let request = AnalysisRequest::new(Platform::Cljs, "/work/contents");
        assert_eq!(
            request.to_args(),
            vec!["--platform", "cljs", "--source-dir", "/work/contents"]
        );

        let filtered = request.with_namespaces(Some(NamespaceFilter::new(["a.core", "a.util"])));
        assert_eq!(&filtered.to_args()[4..], &["--namespaces", "a.core,a.util"]);
    }

    #[test]
    fn test_excerpt_keeps_tail() {
        let stderr: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let excerpt = excerpt(&stderr);
        assert!(excerpt.starts_with("line 30"));
        assert!(excerpt.ends_with("line 49"));
        assert_eq!(excerpt.lines().count(), STDERR_EXCERPT_LINES);
    }
}

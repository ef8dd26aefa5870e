use crate::defaults;
use apidoc_core::{NamespaceFilter, PinnedDependency, Platform, PlatformSet, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for apidoc
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApidocConfig {
    /// Schema version for migrations
    pub version: String,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub sandbox: SandboxSettings,

    #[serde(default)]
    pub analyzer: AnalyzerCommand,

    /// Per-project overrides, keyed by project identity
    #[serde(default)]
    pub overrides: Vec<ProjectOverride>,
}

impl Default for ApidocConfig {
    fn default() -> Self {
        Self {
            version: defaults::CONFIG_VERSION.to_string(),
            settings: Settings::default(),
            sandbox: SandboxSettings::default(),
            analyzer: AnalyzerCommand::default(),
            overrides: Vec::new(),
        }
    }
}

/// Pipeline run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Parent of per-run working directories (system temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,

    /// Root the result file is written below (process-scoped temp dir if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Keep the working directory after the run for debugging
    #[serde(default)]
    pub keep_workdir: bool,

    /// Upper bound on concurrently analyzed platforms (available parallelism if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_platforms: Option<usize>,

    /// Overall timeout for a single HTTP transfer
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: None,
            output_dir: None,
            keep_workdir: false,
            max_concurrent_platforms: None,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

/// Sandbox construction settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SandboxSettings {
    /// Repositories searched in order for pinned and target dependencies
    #[serde(default = "defaults::repositories")]
    pub repositories: Vec<String>,

    /// Host environment variables passed into the sandbox
    #[serde(default = "defaults::pass_env")]
    pub pass_env: Vec<String>,

    /// The version-pinned allow-list
    #[serde(default = "defaults::pinned_dependencies")]
    pub pinned: Vec<PinnedDependency>,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            repositories: defaults::repositories(),
            pass_env: defaults::pass_env(),
            pinned: defaults::pinned_dependencies(),
        }
    }
}

/// The external extraction routine's command line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerCommand {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "defaults::analyzer_args")]
    pub args: Vec<String>,

    /// Name of the `[[sandbox.pinned]]` entry that provides the entry point
    #[serde(default = "default_analyzer_artifact")]
    pub artifact: String,
}

impl Default for AnalyzerCommand {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: defaults::analyzer_args(),
            artifact: default_analyzer_artifact(),
        }
    }
}

/// Explicit platform set and/or namespace allow-list for one project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectOverride {
    /// `group/artifact` or bare `artifact`
    pub project: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<Platform>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,
}

/// Override entries indexed by normalized project identity.
///
/// Lookup is a pure function of the identity; `foo` and `foo/foo` hit the
/// same entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: BTreeMap<String, ProjectOverride>,
}

impl OverrideTable {
    /// Builds the table. Later entries for the same identity replace earlier ones.
    pub fn new(overrides: &[ProjectOverride]) -> apidoc_core::Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in overrides {
            let key = ProjectId::parse(&entry.project)?.normalized();
            entries.insert(key, entry.clone());
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, project: &ProjectId) -> Option<&ProjectOverride> {
        self.entries.get(&project.normalized())
    }

    /// Explicit platform set, if the project has one.
    pub fn platforms(&self, project: &ProjectId) -> Option<PlatformSet> {
        self.lookup(project)
            .and_then(|o| o.platforms.as_ref())
            .map(|platforms| platforms.iter().copied().collect())
    }

    /// Explicit namespace allow-list, if the project has one.
    pub fn namespaces(&self, project: &ProjectId) -> Option<NamespaceFilter> {
        self.lookup(project)
            .and_then(|o| o.namespaces.as_ref())
            .map(|namespaces| NamespaceFilter::new(namespaces.iter().cloned()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_program() -> String {
    defaults::DEFAULT_ANALYZER_PROGRAM.to_string()
}

fn default_analyzer_artifact() -> String {
    defaults::DEFAULT_ANALYZER_ARTIFACT.to_string()
}

fn default_http_timeout() -> u64 {
    defaults::DEFAULT_HTTP_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = ApidocConfig {
            overrides: vec![ProjectOverride {
                project: "manifold".to_string(),
                platforms: Some(vec![Platform::Clj]),
                namespaces: None,
            }],
            ..Default::default()
        };

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: ApidocConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ApidocConfig = toml::from_str("version = \"1.0\"\n").unwrap();
        assert_eq!(config, ApidocConfig::default());
        assert_eq!(config.analyzer.program, "java");
        assert!(!config.sandbox.pinned.is_empty());
    }

    #[test]
    fn test_override_section() {
        let config: ApidocConfig = toml::from_str(
            r#"
            version = "1.0"

            [[overrides]]
            project = "org.example/widgets"
            platforms = ["cljs"]
            namespaces = ["widgets.core", "widgets.dom"]
            "#,
        )
        .unwrap();

        let table = OverrideTable::new(&config.overrides).unwrap();
        let project = ProjectId::parse("org.example/widgets").unwrap();
        let platforms = table.platforms(&project).unwrap();
        assert_eq!(platforms.iter().collect::<Vec<_>>(), vec![Platform::Cljs]);
        assert_eq!(
            table.namespaces(&project).unwrap().namespaces(),
            &["widgets.core".to_string(), "widgets.dom".to_string()]
        );
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let result: Result<ApidocConfig, _> = toml::from_str(
            r#"
            version = "1.0"

            [[overrides]]
            project = "foo"
            platforms = ["cljr"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_override_lookup_is_normalized() {
        let table = OverrideTable::new(&[ProjectOverride {
            project: "manifold/manifold".to_string(),
            platforms: Some(vec![Platform::Clj]),
            namespaces: None,
        }])
        .unwrap();

        assert!(table.lookup(&ProjectId::parse("manifold").unwrap()).is_some());
        assert!(table.lookup(&ProjectId::parse("other/manifold").unwrap()).is_none());
        assert!(table.namespaces(&ProjectId::parse("manifold").unwrap()).is_none());
    }

    #[test]
    fn test_namespace_only_override_leaves_platforms_unset() {
        let table = OverrideTable::new(&[ProjectOverride {
            project: "foo/bar".to_string(),
            platforms: None,
            namespaces: Some(vec!["bar.api".to_string()]),
        }])
        .unwrap();
        let project = ProjectId::parse("foo/bar").unwrap();

        assert!(table.platforms(&project).is_none());
        assert!(table.namespaces(&project).is_some());
    }
}

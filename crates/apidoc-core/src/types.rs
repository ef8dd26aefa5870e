//! Core data types for apidoc analysis.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// File name of the persisted analysis record.
pub const RESULT_FILE_NAME: &str = "apidoc.json";

/// Source dialect the extraction routine can process separately.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// JVM dialect.
    Clj,
    /// JavaScript dialect.
    Cljs,
}

impl Platform {
    /// Returns all platforms in resolution order.
    pub fn all() -> &'static [Platform] {
        &[Platform::Clj, Platform::Cljs]
    }

    /// Identifier used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Clj => "clj",
            Platform::Cljs => "cljs",
        }
    }

    /// File extensions whose presence implies this platform.
    ///
    /// `.cljc` files are shared between both dialects.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Platform::Clj => &[".clj", ".cljc"],
            Platform::Cljs => &[".cljs", ".cljc"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "clj" => Ok(Platform::Clj),
            "cljs" => Ok(Platform::Cljs),
            other => Err(Error::precondition(
                "platform",
                format!("unknown platform '{}'", other),
            )),
        }
    }
}

/// Ordered, deduplicated set of platforms to analyze.
///
/// An empty set is valid and yields an empty `codox` map downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformSet(BTreeSet<Platform>);

impl PlatformSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a platform; duplicates are ignored.
    pub fn insert(&mut self, platform: Platform) {
        self.0.insert(platform);
    }

    pub fn contains(&self, platform: Platform) -> bool {
        self.0.contains(&platform)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = Platform> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Platform> for PlatformSet {
    fn from_iter<I: IntoIterator<Item = Platform>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Explicit allow-list of namespaces to analyze.
///
/// Absence of a filter (`Option::None`) means every discoverable namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceFilter(Vec<String>);

impl NamespaceFilter {
    pub fn new(namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(namespaces.into_iter().map(Into::into).collect())
    }

    pub fn namespaces(&self) -> &[String] {
        &self.0
    }

    /// Comma-separated form passed to the extraction routine.
    pub fn to_arg(&self) -> String {
        self.0.join(",")
    }
}

/// Group/artifact pair identifying a published project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId {
    pub group_id: String,
    pub artifact_id: String,
}

impl ProjectId {
    /// Parses `group/artifact`, or a bare `artifact` whose group is the artifact itself.
    pub fn parse(project: &str) -> Result<Self> {
        let project = project.trim();
        if project.is_empty() {
            return Err(Error::precondition("project", "must not be empty"));
        }

        let (group_id, artifact_id) = match project.split_once('/') {
            Some((group, artifact)) => (group, artifact),
            None => (project, project),
        };

        validate_identifier("project", group_id)?;
        validate_identifier("project", artifact_id)?;

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
        })
    }

    /// Identity used as the override table key.
    ///
    /// The group is dropped when it equals the artifact, so `foo/foo` and
    /// `foo` normalize to the same key.
    pub fn normalized(&self) -> String {
        if self.group_id == self.artifact_id {
            self.artifact_id.clone()
        } else {
            format!("{}/{}", self.group_id, self.artifact_id)
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for ProjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Identifiers end up as path components, so they are restricted to a
/// conservative character set.
pub(crate) fn validate_identifier(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::precondition(field, "identifier part must not be empty"));
    }
    if value == "." || value == ".." {
        return Err(Error::precondition(
            field,
            format!("'{}' is not a valid identifier", value),
        ));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')))
    {
        return Err(Error::precondition(
            field,
            format!("'{}' contains invalid character {:?}", value, bad),
        ));
    }
    Ok(())
}

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub project: ProjectId,
    pub version: String,
    /// Remote URI or local path of the packaged archive.
    pub archive_location: String,
    /// Remote URI or local path of the metadata descriptor.
    pub metadata_location: String,
}

impl ArtifactRef {
    /// Builds an artifact reference, rejecting absent inputs before any I/O.
    pub fn new(
        project: &str,
        version: &str,
        archive_location: &str,
        metadata_location: &str,
    ) -> Result<Self> {
        let project = ProjectId::parse(project)?;
        validate_identifier("version", version.trim())?;
        if archive_location.trim().is_empty() {
            return Err(Error::precondition("archive", "location must not be empty"));
        }
        if metadata_location.trim().is_empty() {
            return Err(Error::precondition("metadata", "location must not be empty"));
        }

        Ok(Self {
            project,
            version: version.trim().to_string(),
            archive_location: archive_location.trim().to_string(),
            metadata_location: metadata_location.trim().to_string(),
        })
    }

    /// Prefix used for the run's working directory name.
    pub fn work_dir_prefix(&self) -> String {
        format!(
            "apidoc-{}-{}-{}-",
            self.project.group_id, self.project.artifact_id, self.version
        )
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.project, self.version)
    }
}

/// A single public symbol of a namespace.
///
/// Only `name` is interpreted; every other key the extraction routine emits
/// is carried through unchanged, including explicit nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicVar {
    pub name: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PublicVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Documentation for one namespace.
///
/// `name` and `publics` give the tree its shape. Everything else (`doc`,
/// `author`, `deprecated`, ...) stays raw; the result schema constrains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDoc {
    pub name: String,

    #[serde(default)]
    pub publics: Vec<PublicVar>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NamespaceDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publics: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Attach a raw key, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Raw extraction output for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformDocTree {
    pub namespaces: Vec<NamespaceDoc>,
}

/// The validated and persisted unit.
///
/// `codox` is ordered by platform so serialization is byte-deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisResult {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub codox: BTreeMap<Platform, PlatformDocTree>,
    /// Verbatim metadata descriptor text; never reparsed.
    pub pom_str: String,
}

impl AnalysisResult {
    /// Deterministic location of the record relative to the output root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.group_id)
            .join(&self.artifact_id)
            .join(&self.version)
            .join(RESULT_FILE_NAME)
    }
}

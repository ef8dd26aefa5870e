//! Version-pinned dependency coordinates.

use crate::error::{Error, Result};
use crate::types::{validate_identifier, ProjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the pinned dependency table, or the artifact under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedDependency {
    /// `group/artifact` (or bare `artifact`).
    pub name: String,
    /// Exact version; ranges are not supported.
    pub version: String,
    /// Names whose transitive inclusion this entry forbids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

impl PinnedDependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            exclusions: Vec::new(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: &[&str]) -> Self {
        self.exclusions = exclusions.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Parsed identity of this dependency.
    pub fn project(&self) -> Result<ProjectId> {
        ProjectId::parse(&self.name)
    }

    /// Checks that the name parses and the version is a single path-safe
    /// identifier.
    pub fn validate(&self) -> Result<()> {
        self.project()?;
        if self.version.trim().is_empty() {
            return Err(Error::precondition(
                "version",
                format!("pinned dependency {} has no version", self.name),
            ));
        }
        validate_identifier("version", &self.version)?;
        for exclusion in &self.exclusions {
            ProjectId::parse(exclusion)?;
        }
        Ok(())
    }

    /// Repository-relative path of the jar in Maven layout, `/`-separated.
    ///
    /// `org.clojure/clojure 1.11.1` →
    /// `org/clojure/clojure/1.11.1/clojure-1.11.1.jar`
    pub fn repository_path(&self) -> Result<String> {
        self.validate()?;
        let project = self.project()?;
        Ok(format!(
            "{}/{}/{}/{}-{}.jar",
            project.group_id.replace('.', "/"),
            project.artifact_id,
            self.version,
            project.artifact_id,
            self.version
        ))
    }
}

impl fmt::Display for PinnedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_path() {
        let dep = PinnedDependency::new("org.clojure/clojure", "1.11.1");
        assert_eq!(
            dep.repository_path().unwrap(),
            "org/clojure/clojure/1.11.1/clojure-1.11.1.jar"
        );

        let bare = PinnedDependency::new("manifold", "0.4.3");
        assert_eq!(
            bare.repository_path().unwrap(),
            "manifold/manifold/0.4.3/manifold-0.4.3.jar"
        );
    }

    #[test]
    fn test_validate() {
        assert!(PinnedDependency::new("org.clojure/clojure", "1.11.1")
            .validate()
            .is_ok());
        assert!(PinnedDependency::new("org.clojure/clojure", " ")
            .validate()
            .is_err());
        assert!(PinnedDependency::new("a/b/c", "1.0").validate().is_err());
        assert!(PinnedDependency::new("foo/bar", "1.0")
            .with_exclusions(&["bad name"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_version_cannot_leave_repository() {
        for version in ["../../../x", "1.0/../../etc", "..", "1.0 beta"] {
            let dep = PinnedDependency::new("org.clojure/clojure", version);
            assert!(
                matches!(dep.validate(), Err(Error::Precondition { field: "version", .. })),
                "{version} accepted"
            );
            assert!(dep.repository_path().is_err());
        }
        assert!(PinnedDependency::new("org.clojure/clojure", "1.12.0-alpha5")
            .validate()
            .is_ok());
    }
}

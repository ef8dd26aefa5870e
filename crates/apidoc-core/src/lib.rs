//! apidoc Core - data model, errors and result schema.
//!
//! This crate provides the foundational types shared by every stage of the
//! analysis pipeline:
//!
//! - [`ArtifactRef`] and [`ProjectId`]: the pipeline's immutable input
//! - [`Platform`] and [`PlatformSet`]: source dialects to analyze
//! - [`PlatformDocTree`] and [`AnalysisResult`]: what gets validated and persisted
//! - [`SchemaValidator`]: checks assembled records before they reach disk
//! - [`Error`] and [`Stage`]: the failure taxonomy
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   apidoc-cli    │  (pipeline + binary)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │ apidoc-sandbox  │──▶│  apidoc-fetch   │
//! └────────┬────────┘   └────────┬────────┘
//!          │                     │
//!          ▼                     ▼
//! ┌─────────────────────────────────────────┐
//! │ apidoc-core (this crate)                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use apidoc_core::{ArtifactRef, Platform};
//!
//! let artifact = ArtifactRef::new(
//!     "org.clojure/core.async",
//!     "1.6.681",
//!     "https://repo1.maven.org/maven2/org/clojure/core.async/1.6.681/core.async-1.6.681.jar",
//!     "https://repo1.maven.org/maven2/org/clojure/core.async/1.6.681/core.async-1.6.681.pom",
//! )?;
//! assert_eq!(artifact.project.artifact_id, "core.async");
//! assert_eq!(Platform::Cljs.as_str(), "cljs");
//! # Ok::<(), apidoc_core::Error>(())
//! ```

pub mod dependency;
pub mod error;
pub mod types;
pub mod validation;

pub use dependency::PinnedDependency;
pub use error::{Error, Result, Stage};
pub use types::{
    AnalysisResult, ArtifactRef, NamespaceDoc, NamespaceFilter, Platform, PlatformDocTree,
    PlatformSet, ProjectId, PublicVar, RESULT_FILE_NAME,
};
pub use validation::{validate_path, SchemaValidator, ANALYSIS_RESULT_SCHEMA};

//! Isolated analysis environments for apidoc.
//!
//! - [`SandboxBuilder`] resolves the pinned table plus the artifact under
//!   analysis into a sandbox-local repository and produces a
//!   [`SandboxEnvironment`]
//! - [`DependencyResolver`] implementations fetch single coordinates, either
//!   from remote repositories or a local Maven-layout directory
//! - [`PlatformAnalyzer`] is the seam the external extraction routine sits
//!   behind; [`SubprocessAnalyzer`] runs it as a child process

pub mod analyzer;
pub mod environment;
pub mod resolver;

pub use analyzer::{AnalysisRequest, PlatformAnalyzer, SubprocessAnalyzer};
pub use environment::{
    ResolvedDependency, SandboxBuilder, SandboxEnvironment, SandboxManifest, MANIFEST_FILE_NAME,
};
pub use resolver::{DependencyResolver, LocalRepositoryResolver, RemoteRepositoryResolver};

//! Artifact acquisition for apidoc
//!
//! Fetches a packaged archive and its metadata descriptor from either a
//! remote URI or a local path.
//!
//! # Example
//!
//! ```no_run
//! use apidoc_fetch::{Acquirer, HttpClient};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let acquirer = Acquirer::new(HttpClient::new()?);
//!     let jar = acquirer
//!         .acquire(
//!             "https://repo.clojars.org/manifold/manifold/0.4.3/manifold-0.4.3.jar",
//!             Path::new("/tmp/apidoc-work/archive"),
//!             "artifact.jar",
//!         )
//!         .await?;
//!     println!("archive at {}", jar.path.display());
//!     Ok(())
//! }
//! ```

mod acquire;
mod client;
mod error;
mod types;

pub use acquire::Acquirer;
pub use client::HttpClient;
pub use error::{Error, Result};
pub use types::{AcquiredFile, Location};

//! Root-scoped filesystem abstraction for apidoc.
//!
//! This crate provides a `FileSystem` trait whose operations can never leave
//! the directory they are scoped to, and a native implementation backed by
//! `std::fs` and tokio's blocking pool.
//!
//! # Example
//!
//! ```no_run
//! use apidoc_fs::{FileSystem, NativeFileSystem};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = NativeFileSystem::new("/tmp/apidoc-work")?;
//! let pom = fs.read_to_string(Path::new("archive/artifact.pom")).await?;
//! println!("{}", pom);
//! # Ok(())
//! # }
//! ```

mod file_system;
pub mod native;

pub use file_system::{DiscoveryOptions, FileMetadata, FileSystem};
pub use native::NativeFileSystem;

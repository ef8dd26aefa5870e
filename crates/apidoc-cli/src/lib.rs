//! apidoc CLI library components.
//!
//! The analysis pipeline lives here so it can be driven from tests and other
//! binaries; `main.rs` only parses arguments and sets up logging.

pub mod commands;
pub mod pipeline;

pub use pipeline::{unpack_archive, Pipeline, PipelineError};

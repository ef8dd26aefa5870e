pub mod analyze;
pub mod config;
pub mod unpack;

pub use analyze::{handle_analyze_command, AnalyzeArgs};
pub use config::{handle_config_command, ConfigCommand};
pub use unpack::{handle_unpack_command, UnpackArgs};

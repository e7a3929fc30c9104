//! Shared runtime plumbing for users-store binaries: layered configuration
//! and logging initialization.

pub mod config;
pub mod logging;

pub use config::{default_logging_config, AppConfig, CliArgs, LoggingConfig, Section};
pub use logging::init_logging_from_config;

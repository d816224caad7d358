//! Configuration sources and class-level settings.
//!
//! This module handles:
//! - Naming of environment variables and file sections
//! - Environment access and snapshots
//! - JSON and TOML config file parsing

pub mod env;
pub mod parser;
pub mod types;

pub use env::{EnvSnapshot, EnvSource, EnvValue, MapEnv, StdEnv};
pub use parser::{ConfigFile, FileFormat, parse_config_file, parse_config_str};
pub use types::ConfigSettings;

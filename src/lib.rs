//! confield - typed configuration fields resolved from layered sources.
//!
//! A configuration class declares fields with defaults. Constructing an
//! instance resolves every field, highest precedence last:
//! - the declared default
//! - the class's section of a config file named by an environment variable
//! - a per-field environment variable
//!
//! Each instance owns its values, so assigning to one never affects another.
//!
//! # Example
//!
//! ```no_run
//! use confield::{config_class, ConfigClass};
//!
//! config_class! {
//! 	#[derive(Debug)]
//! 	pub struct SomeConfig {
//! 		pub test_value: i64 = 0,
//! 	}
//! }
//!
//! // CONFIG__SOMECONFIG__TEST_VALUE=13 overrides the default.
//! let conf = SomeConfig::load().unwrap();
//! println!("test_value = {}", conf.test_value);
//! ```

pub mod class;
pub mod config;
pub mod error;
pub mod field;
pub mod resolve;
pub mod value;

pub use class::ConfigClass;
pub use config::{ConfigSettings, EnvSource, EnvValue, MapEnv, StdEnv};
pub use error::{ConfigError, Result};
pub use field::{ConfigField, FieldSpec, Schema};
pub use resolve::{Resolved, ResolvedValues, Source, resolve_schema};
pub use value::{FieldValue, Value, ValueKind};

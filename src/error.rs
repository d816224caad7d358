use crate::value::ValueKind;
use std::path::PathBuf;

/// Library-level structured errors for confield.
///
/// Only explicit misconfiguration surfaces here. Optional sources that are
/// missing or broken are logged and skipped by the resolver instead.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse TOML config file: {path}")]
	TomlParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse JSON config file: {path}")]
	JsonParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Config file is not a mapping of sections: {path}")]
	NotAMapping { path: PathBuf },

	#[error(
		"Invalid value for {class}.{field} from {var}={raw:?}: expected {expected} ({reason})"
	)]
	InvalidEnvValue {
		class: String,
		field: String,
		var: String,
		raw: String,
		expected: ValueKind,
		reason: String,
	},

	#[error("Invalid ignore pattern: {pattern}")]
	InvalidIgnorePattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Field declared more than once: {field}")]
	DuplicateField { field: String },

	#[error("Field was never resolved: {field}")]
	UnresolvedField { field: String },

	#[error("Field {field} holds a {found} value, expected {expected}")]
	TypeMismatch {
		field: String,
		expected: ValueKind,
		found: ValueKind,
	},
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

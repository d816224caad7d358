use crate::error::{ConfigError, Result};
use regex::Regex;

/// Class-level resolution parameters.
///
/// A config class inherits these from its parent unless it declares its own.
/// Because every field is `&'static str`, settings can be built in `const`
/// context with struct update syntax:
///
/// ```
/// use confield::ConfigSettings;
///
/// const LIBRARY: ConfigSettings = ConfigSettings {
/// 	env_prefix: "LIBCFG",
/// 	env_sep: "<->",
/// 	..ConfigSettings::DEFAULT
/// };
///
/// assert_eq!(LIBRARY.file_path_var_name(), "LIBCFG<->FILEPATH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSettings {
	/// Discriminator for pyproject-style files: sections may live under
	/// `[tool.<config_id>]` instead of at the top level.
	pub config_id: &'static str,

	/// Root of every environment variable name.
	pub env_prefix: &'static str,

	/// Token joining the segments of an environment variable name.
	pub env_sep: &'static str,

	/// Name (after the prefix) of the variable holding the config file path.
	pub env_filepath: &'static str,

	/// Regex removed from the class name when deriving the file section key.
	pub ignore_pattern: &'static str,
}

impl ConfigSettings {
	pub const DEFAULT: ConfigSettings = ConfigSettings {
		config_id: "confield",
		env_prefix: "CONFIG",
		env_sep: "__",
		env_filepath: "FILEPATH",
		ignore_pattern: "Config",
	};

	pub const fn with_config_id(mut self, config_id: &'static str) -> Self {
		self.config_id = config_id;
		self
	}

	pub const fn with_env_prefix(mut self, env_prefix: &'static str) -> Self {
		self.env_prefix = env_prefix;
		self
	}

	pub const fn with_env_sep(mut self, env_sep: &'static str) -> Self {
		self.env_sep = env_sep;
		self
	}

	pub const fn with_env_filepath(mut self, env_filepath: &'static str) -> Self {
		self.env_filepath = env_filepath;
		self
	}

	pub const fn with_ignore_pattern(mut self, ignore_pattern: &'static str) -> Self {
		self.ignore_pattern = ignore_pattern;
		self
	}

	/// Environment variable overriding `field` of `class`:
	/// `<PREFIX><SEP><CLASS><SEP><FIELD>`, class and field upper-cased.
	pub fn env_var_name(&self, class_name: &str, field_name: &str) -> String {
		format!(
			"{prefix}{sep}{class}{sep}{field}",
			prefix = self.env_prefix,
			sep = self.env_sep,
			class = class_name.to_uppercase(),
			field = field_name.to_uppercase(),
		)
	}

	/// Environment variable naming the config file: `<PREFIX><SEP><FILEPATH>`.
	pub fn file_path_var_name(&self) -> String {
		format!("{}{}{}", self.env_prefix, self.env_sep, self.env_filepath)
	}

	/// Section key for `class_name` in a config file.
	///
	/// Every match of the ignore pattern is removed and the rest lower-cased.
	/// A class name consisting only of the pattern keeps its full name.
	pub fn section_key(&self, class_name: &str) -> Result<String> {
		if self.ignore_pattern.is_empty() {
			return Ok(class_name.to_lowercase());
		}

		let pattern =
			Regex::new(self.ignore_pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
				pattern: self.ignore_pattern.to_string(),
				source,
			})?;

		let stripped = pattern.replace_all(class_name, "");
		if stripped.is_empty() {
			Ok(class_name.to_lowercase())
		} else {
			Ok(stripped.to_lowercase())
		}
	}
}

impl Default for ConfigSettings {
	fn default() -> Self {
		Self::DEFAULT
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LIBRARY: ConfigSettings = ConfigSettings {
		config_id: "other_id",
		env_prefix: "LIBCFG",
		env_sep: "<->",
		env_filepath: "CFGFILE",
		ignore_pattern: "LibraryConfig",
	};

	#[test]
	fn test_default_env_var_name() {
		let settings = ConfigSettings::default();
		assert_eq!(
			settings.env_var_name("SomeConfig", "test_value"),
			"CONFIG__SOMECONFIG__TEST_VALUE"
		);
		assert_eq!(settings.file_path_var_name(), "CONFIG__FILEPATH");
	}

	#[test]
	fn test_custom_env_var_name() {
		assert_eq!(
			LIBRARY.env_var_name("Secondary", "value"),
			"LIBCFG<->SECONDARY<->VALUE"
		);
		assert_eq!(LIBRARY.file_path_var_name(), "LIBCFG<->CFGFILE");
	}

	#[test]
	fn test_section_key_strips_pattern() {
		assert_eq!(LIBRARY.section_key("LibraryConfigMain").unwrap(), "main");
		assert_eq!(LIBRARY.section_key("Secondary").unwrap(), "secondary");
		assert_eq!(
			ConfigSettings::default().section_key("SomeConfig").unwrap(),
			"some"
		);
	}

	#[test]
	fn test_section_key_pattern_is_regex() {
		let settings = ConfigSettings::DEFAULT.with_ignore_pattern("(Settings|Config)$");
		assert_eq!(settings.section_key("DatabaseSettings").unwrap(), "database");
		assert_eq!(settings.section_key("ConfigLoader").unwrap(), "configloader");
	}

	#[test]
	fn test_section_key_falls_back_to_full_name() {
		let settings = ConfigSettings::default();
		assert_eq!(settings.section_key("Config").unwrap(), "config");

		let no_pattern = settings.with_ignore_pattern("");
		assert_eq!(no_pattern.section_key("SomeConfig").unwrap(), "someconfig");
	}

	#[test]
	fn test_section_key_invalid_pattern() {
		let settings = ConfigSettings::default().with_ignore_pattern("(unclosed");
		match settings.section_key("Anything").unwrap_err() {
			ConfigError::InvalidIgnorePattern { pattern, .. } => {
				assert_eq!(pattern, "(unclosed");
			}
			other => panic!("Expected InvalidIgnorePattern, got {other:?}"),
		}
	}

	#[test]
	fn test_builders_are_const() {
		const CUSTOM: ConfigSettings = ConfigSettings::DEFAULT
			.with_config_id("app")
			.with_env_prefix("APP")
			.with_env_sep("_")
			.with_env_filepath("CONF");
		assert_eq!(CUSTOM.file_path_var_name(), "APP_CONF");
		assert_eq!(CUSTOM.config_id, "app");
	}
}

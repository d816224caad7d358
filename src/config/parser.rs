use crate::error::{ConfigError, Result};
use crate::value::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File format of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
	Toml,
	Json,
}

impl FileFormat {
	/// `.toml` files are TOML; everything else is read as JSON.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("toml") => FileFormat::Toml,
			_ => FileFormat::Json,
		}
	}
}

/// Parsed config file: section name to field name to value.
///
/// Only scalar entries are kept. Arrays, nested tables and nulls can never
/// override a field, so they are dropped at parse time.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
	/// The path this file was loaded from.
	pub path: PathBuf,

	sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ConfigFile {
	/// Look up a field value in a section.
	pub fn get(&self, section: &str, field: &str) -> Option<&Value> {
		self.sections.get(section)?.get(field)
	}

	pub fn has_section(&self, section: &str) -> bool {
		self.sections.contains_key(section)
	}

	pub fn section_names(&self) -> impl Iterator<Item = &str> {
		self.sections.keys().map(String::as_str)
	}
}

/// Parse a config file from the given path.
///
/// `config_id` selects the `tool.<config_id>` table when the file uses a
/// pyproject-style layout.
pub fn parse_config_file(path: &Path, config_id: &str) -> Result<ConfigFile> {
	let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path, config_id)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path, config_id: &str) -> Result<ConfigFile> {
	let sections = match FileFormat::from_path(path) {
		FileFormat::Toml => {
			let table: toml::Table =
				toml::from_str(content).map_err(|source| ConfigError::TomlParseError {
					path: path.to_path_buf(),
					source,
				})?;
			toml_sections(&table, config_id)
		}
		FileFormat::Json => {
			let value: serde_json::Value =
				serde_json::from_str(content).map_err(|source| ConfigError::JsonParseError {
					path: path.to_path_buf(),
					source,
				})?;
			let serde_json::Value::Object(map) = value else {
				return Err(ConfigError::NotAMapping {
					path: path.to_path_buf(),
				});
			};
			json_sections(&map, config_id)
		}
	};

	Ok(ConfigFile {
		path: path.to_path_buf(),
		sections,
	})
}

fn toml_sections(table: &toml::Table, config_id: &str) -> BTreeMap<String, BTreeMap<String, Value>> {
	let root = table
		.get("tool")
		.and_then(|tool| tool.get(config_id))
		.and_then(toml::Value::as_table)
		.unwrap_or(table);

	root.iter()
		.filter_map(|(name, section)| {
			let entries = section
				.as_table()?
				.iter()
				.filter_map(|(field, value)| Some((field.clone(), Value::from_toml(value)?)))
				.collect();
			Some((name.clone(), entries))
		})
		.collect()
}

fn json_sections(
	map: &serde_json::Map<String, serde_json::Value>,
	config_id: &str,
) -> BTreeMap<String, BTreeMap<String, Value>> {
	let root = map
		.get("tool")
		.and_then(|tool| tool.get(config_id))
		.and_then(serde_json::Value::as_object)
		.unwrap_or(map);

	root.iter()
		.filter_map(|(name, section)| {
			let entries = section
				.as_object()?
				.iter()
				.filter_map(|(field, value)| Some((field.clone(), Value::from_json(value)?)))
				.collect();
			Some((name.clone(), entries))
		})
		.collect()
}

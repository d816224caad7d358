//! The resolution engine.
//!
//! For every field of a class, in ascending precedence:
//! 1. the declared default
//! 2. the entry in the class's section of the config file, if a file is named
//! 3. the class/field environment variable
//!
//! Explicit assignment after construction beats all three.

use crate::config::env::{EnvSnapshot, EnvSource};
use crate::config::parser::{ConfigFile, parse_config_file};
use crate::config::types::ConfigSettings;
use crate::error::{ConfigError, Result};
use crate::field::{Schema, type_mismatch};
use crate::value::{FieldValue, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
	Default,
	File,
	Env,
	Assigned,
}

impl fmt::Display for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Source::Default => "default",
			Source::File => "file",
			Source::Env => "env",
			Source::Assigned => "assigned",
		})
	}
}

/// A value together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
	pub value: Value,
	pub source: Source,
}

/// Field name to resolved value, owned by exactly one instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedValues {
	entries: BTreeMap<String, Resolved>,
}

impl ResolvedValues {
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.get(name).map(|r| &r.value)
	}

	pub fn source(&self, name: &str) -> Option<Source> {
		self.entries.get(name).map(|r| r.source)
	}

	/// Read a field as `T`.
	pub fn typed<T: FieldValue>(&self, name: &str) -> Result<T> {
		let value = self.get(name).ok_or_else(|| ConfigError::UnresolvedField {
			field: name.to_string(),
		})?;
		T::from_value(value).ok_or_else(|| type_mismatch::<T>(name, value))
	}

	pub fn insert(&mut self, name: &str, value: Value, source: Source) {
		self.entries
			.insert(name.to_string(), Resolved { value, source });
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Plain `{ field: value }` object for diagnostics.
	pub fn to_json(&self) -> serde_json::Value {
		self.entries
			.iter()
			.map(|(name, resolved)| {
				let value = serde_json::to_value(&resolved.value).unwrap_or(serde_json::Value::Null);
				(name.clone(), value)
			})
			.collect::<serde_json::Map<_, _>>()
			.into()
	}
}

/// Resolve every field of `schema` for the class named `class_name`.
///
/// The environment is read once, and the config file at most once. Broken or
/// missing files are skipped; an environment value that cannot be coerced is
/// an error.
pub fn resolve_schema(
	class_name: &str,
	settings: &ConfigSettings,
	schema: &Schema,
	env: &dyn EnvSource,
) -> Result<ResolvedValues> {
	schema.validate()?;
	let section = settings.section_key(class_name)?;
	let file_var = settings.file_path_var_name();
	let field_vars: Vec<String> = schema
		.names()
		.map(|name| settings.env_var_name(class_name, name))
		.collect();

	let snapshot = EnvSnapshot::capture(
		env,
		std::iter::once(file_var.as_str()).chain(field_vars.iter().map(String::as_str)),
	);
	debug!(
		class = class_name,
		set = snapshot.len(),
		"captured environment"
	);
	let file = load_file(&snapshot, &file_var, settings.config_id);

	if let Some(ref file) = file
		&& !file.has_section(&section)
	{
		debug!(
			class = class_name,
			section = %section,
			available = ?file.section_names().collect::<Vec<_>>(),
			path = %file.path.display(),
			"config file has no section for class"
		);
	}

	let mut values = ResolvedValues::default();

	for (spec, var) in schema.iter().zip(&field_vars) {
		let mut value = spec.default_value().clone();
		let mut source = Source::Default;

		if let Some(ref file) = file
			&& let Some(raw) = file.get(&section, spec.name())
		{
			match spec.conform(raw) {
				Some(conformed) => {
					value = conformed;
					source = Source::File;
				}
				None => warn!(
					class = class_name,
					field = spec.name(),
					expected = %spec.kind(),
					found = %raw.kind(),
					path = %file.path.display(),
					"ignoring config file value of the wrong type"
				),
			}
		}

		if let Some(raw) = snapshot.get(var) {
			let invalid = |raw: String, reason: String| ConfigError::InvalidEnvValue {
				class: class_name.to_string(),
				field: spec.name().to_string(),
				var: var.clone(),
				raw,
				expected: spec.kind(),
				reason,
			};
			value = match raw {
				Ok(raw) => spec
					.coerce(raw)
					.map_err(|reason| invalid(raw.clone(), reason))?,
				Err(bytes) => {
					return Err(invalid(
						bytes.to_string_lossy().into_owned(),
						"not valid unicode".to_string(),
					));
				}
			};
			source = Source::Env;
		}

		debug!(
			class = class_name,
			field = spec.name(),
			%source,
			"resolved config field"
		);
		values.insert(spec.name(), value, source);
	}

	Ok(values)
}

/// Load the file named by `var`, treating any failure as no file.
fn load_file(snapshot: &EnvSnapshot, var: &str, config_id: &str) -> Option<ConfigFile> {
	let path = match snapshot.get(var)? {
		Ok(path) => Path::new(path),
		Err(path) => Path::new(path),
	};
	if path.as_os_str().is_empty() {
		return None;
	}

	match parse_config_file(path, config_id) {
		Ok(file) => Some(file),
		Err(ConfigError::ConfigReadError { ref source, .. })
			if source.kind() == std::io::ErrorKind::NotFound =>
		{
			debug!(var, path = %path.display(), "config file not found");
			None
		}
		Err(err) => {
			warn!(var, path = %path.display(), error = %err, "ignoring unusable config file");
			None
		}
	}
}

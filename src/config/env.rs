use std::collections::HashMap;
use std::ffi::OsString;

/// A variable as read from the environment.
///
/// `Err` carries a value that is set but is not valid unicode.
pub type EnvValue = std::result::Result<String, OsString>;

/// Source of environment variables consulted during resolution.
///
/// Lets tests and embedders resolve against a fixed environment instead of
/// the process one.
pub trait EnvSource {
	/// Get the value of an environment variable by name.
	fn get(&self, name: &str) -> Option<EnvValue>;
}

/// Environment source that reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
	fn get(&self, name: &str) -> Option<EnvValue> {
		std::env::var_os(name).map(OsString::into_string)
	}
}

/// Environment source backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
	vars: HashMap<String, OsString>,
}

impl MapEnv {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an environment from key-value pairs.
	pub fn from_pairs<I, K, V>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<OsString>,
	{
		Self {
			vars: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<OsString>) {
		self.vars.insert(name.into(), value.into());
	}

	pub fn remove(&mut self, name: &str) -> Option<OsString> {
		self.vars.remove(name)
	}
}

impl EnvSource for MapEnv {
	fn get(&self, name: &str) -> Option<EnvValue> {
		self.vars.get(name).cloned().map(OsString::into_string)
	}
}

/// The environment as seen by one resolution.
///
/// Every variable a class can consult is read once up front, so a resolution
/// never observes the environment changing halfway through.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
	vars: HashMap<String, EnvValue>,
}

impl EnvSnapshot {
	/// Read `names` from `env`, keeping only the ones that are set.
	pub fn capture<'a>(env: &dyn EnvSource, names: impl IntoIterator<Item = &'a str>) -> Self {
		let vars = names
			.into_iter()
			.filter_map(|name| env.get(name).map(|value| (name.to_string(), value)))
			.collect();
		Self { vars }
	}

	pub fn get(&self, name: &str) -> Option<&EnvValue> {
		self.vars.get(name)
	}

	/// Number of captured variables that are set.
	pub(crate) fn len(&self) -> usize {
		self.vars.len()
	}
}

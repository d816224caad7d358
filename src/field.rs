//! Field descriptors and class schemas.

use crate::error::{ConfigError, Result};
use crate::resolve::{ResolvedValues, Source};
use crate::value::{FieldValue, Value, ValueKind};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Coercion = Arc<dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync>;

/// A typed configuration slot with a default.
///
/// The descriptor never holds a resolved value. It is a named key into the
/// [`ResolvedValues`] owned by one instance, so a single descriptor can be
/// shared by every instance of a class.
pub struct ConfigField<T: FieldValue> {
	name: &'static str,
	default: T,
	coerce: Coercion,
	_marker: PhantomData<fn() -> T>,
}

impl<T: FieldValue> ConfigField<T> {
	/// Declare a field using the built-in coercion for `T`.
	pub fn new(name: &'static str, default: T) -> Self {
		Self {
			name,
			default,
			coerce: Arc::new(|raw: &str| T::parse_env(raw).map(T::into_value)),
			_marker: PhantomData,
		}
	}

	/// Replace the coercion applied to environment strings.
	pub fn with_coercion<F>(mut self, coerce: F) -> Self
	where
		F: Fn(&str) -> std::result::Result<T, String> + Send + Sync + 'static,
	{
		self.coerce = Arc::new(move |raw: &str| coerce(raw).map(T::into_value));
		self
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn default_value(&self) -> &T {
		&self.default
	}

	/// Read this field from an instance's resolved values.
	pub fn get(&self, values: &ResolvedValues) -> Result<T> {
		values.typed(self.name)
	}

	/// Overwrite this field in an instance's resolved values.
	pub fn set(&self, values: &mut ResolvedValues, value: T) {
		values.insert(self.name, value.into_value(), Source::Assigned);
	}

	/// Type-erased view used by the resolver.
	pub fn spec(&self) -> FieldSpec {
		FieldSpec {
			name: self.name,
			kind: T::KIND,
			default: self.default.clone().into_value(),
			coerce: Arc::clone(&self.coerce),
			conform: conform_value::<T>,
		}
	}
}

impl<T: FieldValue> Clone for ConfigField<T> {
	fn clone(&self) -> Self {
		Self {
			name: self.name,
			default: self.default.clone(),
			coerce: Arc::clone(&self.coerce),
			_marker: PhantomData,
		}
	}
}

impl<T: FieldValue> fmt::Debug for ConfigField<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConfigField")
			.field("name", &self.name)
			.field("default", &self.default)
			.finish_non_exhaustive()
	}
}

/// A field declaration with its type erased.
#[derive(Clone)]
pub struct FieldSpec {
	name: &'static str,
	kind: ValueKind,
	default: Value,
	coerce: Coercion,
	conform: fn(&Value) -> Option<Value>,
}

impl FieldSpec {
	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> ValueKind {
		self.kind
	}

	pub fn default_value(&self) -> &Value {
		&self.default
	}

	/// Convert an environment string with the field's coercion.
	pub fn coerce(&self, raw: &str) -> std::result::Result<Value, String> {
		(self.coerce)(raw)
	}

	/// Fit a file value to this field's type.
	///
	/// Values already of a compatible kind are converted directly; strings go
	/// through the field's coercion. Anything else does not fit.
	pub fn conform(&self, value: &Value) -> Option<Value> {
		if let Some(conformed) = (self.conform)(value) {
			return Some(conformed);
		}
		match value {
			Value::Str(raw) => self.coerce(raw).ok(),
			_ => None,
		}
	}
}

impl fmt::Debug for FieldSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldSpec")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("default", &self.default)
			.finish_non_exhaustive()
	}
}

/// The ordered set of fields declared by a config class.
///
/// Inherited fields come first. Every name is declared once: a class that
/// redeclares an inherited field would get two storage slots for one value,
/// so the duplicate is recorded and rejected by [`Schema::validate`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
	fields: Vec<FieldSpec>,
	duplicates: Vec<&'static str>,
}

impl Schema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a field. A name that is already declared keeps its first
	/// declaration and is reported by [`Schema::validate`].
	pub fn field<T: FieldValue>(mut self, field: ConfigField<T>) -> Self {
		self.insert(field.spec());
		self
	}

	/// Add every field of `parent`, keeping its order.
	pub fn extend(mut self, parent: Schema) -> Self {
		self.duplicates.extend(parent.duplicates);
		for spec in parent.fields {
			self.insert(spec);
		}
		self
	}

	fn insert(&mut self, spec: FieldSpec) {
		if self.fields.iter().any(|f| f.name == spec.name) {
			self.duplicates.push(spec.name);
		} else {
			self.fields.push(spec);
		}
	}

	/// Check that no field is declared twice.
	pub fn validate(&self) -> Result<()> {
		match self.duplicates.first() {
			Some(name) => Err(ConfigError::DuplicateField {
				field: name.to_string(),
			}),
			None => Ok(()),
		}
	}

	pub fn get(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
		self.fields.iter()
	}

	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().map(|f| f.name)
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

fn conform_value<T: FieldValue>(value: &Value) -> Option<Value> {
	T::from_value(value).map(T::into_value)
}

/// Error for a field whose stored value has the wrong kind.
pub(crate) fn type_mismatch<T: FieldValue>(name: &str, found: &Value) -> ConfigError {
	ConfigError::TypeMismatch {
		field: name.to_string(),
		expected: T::KIND,
		found: found.kind(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_spec_carries_default() {
		let field = ConfigField::new("value", 3_i64);
		let spec = field.spec();
		assert_eq!(spec.name(), "value");
		assert_eq!(spec.kind(), ValueKind::Int);
		assert_eq!(spec.default_value(), &Value::Int(3));
		assert_eq!(field.default_value(), &3);
	}

	#[test]
	fn test_builtin_coercion() {
		let spec = ConfigField::new("value", 3_i64).spec();
		assert_eq!(spec.coerce("4").unwrap(), Value::Int(4));
		assert!(spec.coerce("four").is_err());

		let spec = ConfigField::new("name", String::from("x")).spec();
		assert_eq!(spec.coerce("4").unwrap(), Value::Str("4".to_string()));
	}

	#[test]
	fn test_custom_coercion() {
		let field = ConfigField::new("timeout_ms", 1000_u32).with_coercion(|raw| {
			let secs = raw
				.strip_suffix('s')
				.ok_or_else(|| "expected seconds like 5s".to_string())?;
			secs.parse::<u32>()
				.map(|s| s * 1000)
				.map_err(|e| e.to_string())
		});
		let spec = field.spec();
		assert_eq!(spec.coerce("5s").unwrap(), Value::Int(5000));
		assert!(spec.coerce("5000").is_err());
	}

	#[test]
	fn test_conform_file_values() {
		let int_spec = ConfigField::new("n", 0_i64).spec();
		assert_eq!(int_spec.conform(&Value::Int(5)), Some(Value::Int(5)));
		assert_eq!(
			int_spec.conform(&Value::Str("6".to_string())),
			Some(Value::Int(6))
		);
		assert_eq!(int_spec.conform(&Value::Bool(true)), None);
		assert_eq!(int_spec.conform(&Value::Float(1.5)), None);

		let float_spec = ConfigField::new("ratio", 0.5_f64).spec();
		assert_eq!(float_spec.conform(&Value::Int(2)), Some(Value::Float(2.0)));

		let port_spec = ConfigField::new("port", 80_u16).spec();
		assert_eq!(port_spec.conform(&Value::Int(70000)), None);
	}

	#[test]
	fn test_get_and_set_on_values() {
		let field = ConfigField::new("cf", 0_i64);
		let mut values = ResolvedValues::default();

		assert!(matches!(
			field.get(&values),
			Err(ConfigError::UnresolvedField { .. })
		));

		field.set(&mut values, 1);
		assert_eq!(field.get(&values).unwrap(), 1);
		assert_eq!(values.source("cf"), Some(Source::Assigned));
		assert_eq!(field.default_value(), &0);
	}

	#[test]
	fn test_get_wrong_kind() {
		let as_int = ConfigField::new("cf", 0_i64);
		let as_str = ConfigField::new("cf", String::new());
		let mut values = ResolvedValues::default();
		as_str.set(&mut values, "text".to_string());

		match as_int.get(&values).unwrap_err() {
			ConfigError::TypeMismatch {
				field,
				expected,
				found,
			} => {
				assert_eq!(field, "cf");
				assert_eq!(expected, ValueKind::Int);
				assert_eq!(found, ValueKind::Str);
			}
			other => panic!("Expected TypeMismatch, got {other:?}"),
		}
	}

	#[test]
	fn test_schema_keeps_parent_order() {
		let parent = Schema::new()
			.field(ConfigField::new("a", 1_i64))
			.field(ConfigField::new("b", 2_i64));
		let child = Schema::new()
			.extend(parent)
			.field(ConfigField::new("c", 3_i64));

		assert_eq!(child.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
		assert_eq!(child.len(), 3);
		assert!(child.validate().is_ok());
	}

	#[test]
	fn test_schema_rejects_redeclared_field() {
		let parent = Schema::new().field(ConfigField::new("port", 80_i64));
		let child = Schema::new()
			.extend(parent)
			.field(ConfigField::new("port", "90".to_string()));

		// The first declaration stays in place.
		assert_eq!(child.len(), 1);
		assert_eq!(child.get("port").unwrap().default_value(), &Value::Int(80));
		match child.validate().unwrap_err() {
			ConfigError::DuplicateField { field } => assert_eq!(field, "port"),
			other => panic!("Expected DuplicateField, got {other:?}"),
		}

		// Duplicates in a parent are carried into its children.
		let grandchild = Schema::new().extend(child);
		assert!(matches!(
			grandchild.validate(),
			Err(ConfigError::DuplicateField { .. })
		));
	}

	#[test]
	fn test_descriptor_is_shareable() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<ConfigField<String>>();
		assert_send_sync::<FieldSpec>();
		assert_send_sync::<Schema>();
	}
}

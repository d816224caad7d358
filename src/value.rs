use serde::Serialize;
use std::fmt;

/// A resolved configuration value.
///
/// Every source is converted into this representation before it competes for
/// a field, so the resolver only ever compares like with like.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
}

/// The kind of a [`Value`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	Bool,
	Int,
	Float,
	Str,
}

impl ValueKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ValueKind::Bool => "boolean",
			ValueKind::Int => "integer",
			ValueKind::Float => "float",
			ValueKind::Str => "string",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Value {
	pub fn kind(&self) -> ValueKind {
		match self {
			Value::Bool(_) => ValueKind::Bool,
			Value::Int(_) => ValueKind::Int,
			Value::Float(_) => ValueKind::Float,
			Value::Str(_) => ValueKind::Str,
		}
	}

	/// Convert a scalar JSON value. Arrays, objects and null have no counterpart.
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
			serde_json::Value::Number(n) => n
				.as_i64()
				.map(Value::Int)
				.or_else(|| n.as_f64().map(Value::Float)),
			serde_json::Value::String(s) => Some(Value::Str(s.clone())),
			_ => None,
		}
	}

	/// Convert a scalar TOML value. Datetimes are kept as their string form.
	pub fn from_toml(value: &toml::Value) -> Option<Self> {
		match value {
			toml::Value::Boolean(b) => Some(Value::Bool(*b)),
			toml::Value::Integer(i) => Some(Value::Int(*i)),
			toml::Value::Float(f) => Some(Value::Float(*f)),
			toml::Value::String(s) => Some(Value::Str(s.clone())),
			toml::Value::Datetime(dt) => Some(Value::Str(dt.to_string())),
			toml::Value::Array(_) | toml::Value::Table(_) => None,
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Bool(b) => write!(f, "{b}"),
			Value::Int(i) => write!(f, "{i}"),
			Value::Float(x) => write!(f, "{x}"),
			Value::Str(s) => f.write_str(s),
		}
	}
}

/// A Rust type that can be stored in a configuration field.
///
/// `parse_env` is the built-in coercion applied to environment strings when a
/// field does not declare its own.
pub trait FieldValue: Clone + fmt::Debug + Send + Sync + 'static {
	const KIND: ValueKind;

	fn into_value(self) -> Value;

	fn from_value(value: &Value) -> Option<Self>;

	fn parse_env(raw: &str) -> std::result::Result<Self, String>;
}

macro_rules! impl_int_field_value {
	($($ty:ty),*) => {
		$(
			impl FieldValue for $ty {
				const KIND: ValueKind = ValueKind::Int;

				fn into_value(self) -> Value {
					Value::Int(i64::from(self))
				}

				fn from_value(value: &Value) -> Option<Self> {
					match value {
						Value::Int(i) => <$ty>::try_from(*i).ok(),
						_ => None,
					}
				}

				fn parse_env(raw: &str) -> std::result::Result<Self, String> {
					raw.trim().parse::<$ty>().map_err(|e| e.to_string())
				}
			}
		)*
	};
}

impl_int_field_value!(i32, i64, u16, u32);

impl FieldValue for f64 {
	const KIND: ValueKind = ValueKind::Float;

	fn into_value(self) -> Value {
		Value::Float(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Float(f) => Some(*f),
			Value::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	fn parse_env(raw: &str) -> std::result::Result<Self, String> {
		raw.trim().parse::<f64>().map_err(|e| e.to_string())
	}
}

impl FieldValue for f32 {
	const KIND: ValueKind = ValueKind::Float;

	fn into_value(self) -> Value {
		Value::Float(f64::from(self))
	}

	fn from_value(value: &Value) -> Option<Self> {
		f64::from_value(value).and_then(narrow_f32)
	}

	fn parse_env(raw: &str) -> std::result::Result<Self, String> {
		let wide = f64::parse_env(raw)?;
		narrow_f32(wide).ok_or_else(|| format!("{wide} is out of range for f32"))
	}
}

/// Narrow to `f32`, refusing finite values that would become infinite.
fn narrow_f32(f: f64) -> Option<f32> {
	if f.is_finite() && f.abs() > f64::from(f32::MAX) {
		None
	} else {
		Some(f as f32)
	}
}

impl FieldValue for bool {
	const KIND: ValueKind = ValueKind::Bool;

	fn into_value(self) -> Value {
		Value::Bool(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	fn parse_env(raw: &str) -> std::result::Result<Self, String> {
		match raw.trim().to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Ok(true),
			"false" | "0" | "no" | "off" => Ok(false),
			other => Err(format!("not a boolean: {other:?}")),
		}
	}
}

impl FieldValue for String {
	const KIND: ValueKind = ValueKind::Str;

	fn into_value(self) -> Value {
		Value::Str(self)
	}

	fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Str(s) => Some(s.clone()),
			_ => None,
		}
	}

	fn parse_env(raw: &str) -> std::result::Result<Self, String> {
		Ok(raw.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_env_integers() {
		assert_eq!(i64::parse_env("13").unwrap(), 13);
		assert_eq!(i64::parse_env(" -7 ").unwrap(), -7);
		assert!(i64::parse_env("thirteen").is_err());
		assert!(u16::parse_env("70000").is_err());
		assert!(u32::parse_env("-1").is_err());
	}

	#[test]
	fn test_parse_env_bool() {
		for raw in ["true", "TRUE", "1", "yes", "On"] {
			assert!(bool::parse_env(raw).unwrap(), "{raw}");
		}
		for raw in ["false", "0", "No", "off"] {
			assert!(!bool::parse_env(raw).unwrap(), "{raw}");
		}
		assert!(bool::parse_env("maybe").is_err());
		assert!(bool::parse_env("").is_err());
	}

	#[test]
	fn test_parse_env_string_is_verbatim() {
		assert_eq!(String::parse_env("  spaced  ").unwrap(), "  spaced  ");
	}

	#[test]
	fn test_from_value_range_checks() {
		assert_eq!(u16::from_value(&Value::Int(8080)), Some(8080));
		assert_eq!(u16::from_value(&Value::Int(-1)), None);
		assert_eq!(i32::from_value(&Value::Int(i64::MAX)), None);
		assert_eq!(i64::from_value(&Value::Str("5".into())), None);
	}

	#[test]
	fn test_float_accepts_integers() {
		assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
		assert_eq!(f64::from_value(&Value::Float(0.5)), Some(0.5));
		assert_eq!(f64::from_value(&Value::Bool(true)), None);
	}

	#[test]
	fn test_f32_range_checks() {
		assert_eq!(f32::from_value(&Value::Float(1.5)), Some(1.5));
		assert_eq!(f32::from_value(&Value::Float(1e300)), None);
		assert_eq!(f32::from_value(&Value::Float(-1e300)), None);
		assert_eq!(f32::parse_env("0.25").unwrap(), 0.25);
		assert!(f32::parse_env("1e300").is_err());
		// Explicit infinity is a value, not an overflow.
		assert_eq!(f32::parse_env("inf").unwrap(), f32::INFINITY);
	}

	#[test]
	fn test_parse_env_empty_numbers() {
		assert!(i64::parse_env("").is_err());
		assert!(u16::parse_env("   ").is_err());
		assert!(f64::parse_env("").is_err());
	}

	#[test]
	fn test_from_json_scalars() {
		assert_eq!(
			Value::from_json(&serde_json::json!(5)),
			Some(Value::Int(5))
		);
		assert_eq!(
			Value::from_json(&serde_json::json!(1.5)),
			Some(Value::Float(1.5))
		);
		assert_eq!(
			Value::from_json(&serde_json::json!("x")),
			Some(Value::Str("x".into()))
		);
		assert_eq!(Value::from_json(&serde_json::json!([1, 2])), None);
		assert_eq!(Value::from_json(&serde_json::Value::Null), None);
	}

	#[test]
	fn test_from_toml_scalars() {
		let table: toml::Table = toml::from_str("a = 1\nb = true\nc = [1]").unwrap();
		assert_eq!(Value::from_toml(&table["a"]), Some(Value::Int(1)));
		assert_eq!(Value::from_toml(&table["b"]), Some(Value::Bool(true)));
		assert_eq!(Value::from_toml(&table["c"]), None);
	}

	#[test]
	fn test_display() {
		assert_eq!(Value::Int(4).to_string(), "4");
		assert_eq!(Value::Str("main".into()).to_string(), "main");
		assert_eq!(ValueKind::Int.to_string(), "integer");
	}
}

use crate::config::env::{EnvSource, StdEnv};
use crate::config::types::ConfigSettings;
use crate::error::Result;
use crate::field::Schema;
use crate::resolve::{ResolvedValues, resolve_schema};

/// A configuration class: a set of declared fields plus the settings that
/// say where their overrides live.
///
/// Usually implemented through [`config_class!`](crate::config_class).
/// Every call to [`load`](ConfigClass::load) re-reads the environment and the
/// config file and builds a fresh, independent instance.
pub trait ConfigClass: Sized {
	/// Name used to derive environment variable names and the file section.
	const CLASS_NAME: &'static str;

	fn settings() -> ConfigSettings {
		ConfigSettings::DEFAULT
	}

	/// All declared fields, inherited ones included.
	fn schema() -> Schema;

	/// Build an instance from resolved values.
	fn from_values(values: &ResolvedValues) -> Result<Self>;

	/// Resolve this class's fields without building an instance.
	fn resolve(env: &dyn EnvSource) -> Result<ResolvedValues> {
		resolve_schema(Self::CLASS_NAME, &Self::settings(), &Self::schema(), env)
	}

	/// Construct an instance against the given environment.
	fn load_from(env: &dyn EnvSource) -> Result<Self> {
		Self::from_values(&Self::resolve(env)?)
	}

	/// Construct an instance against the process environment.
	fn load() -> Result<Self> {
		Self::load_from(&StdEnv)
	}
}

/// Declare a configuration class.
///
/// Each field is written `name: Type = default`, optionally followed by
/// `; coerce = <fn(&str) -> Result<Type, String>>` to replace the built-in
/// environment coercion. A class may name a parent after a colon: it then
/// embeds the parent as `base` (reachable through `Deref`), inherits the
/// parent's fields, and uses the parent's settings unless it declares
/// `settings = <ConfigSettings>;` itself. Redeclaring an inherited field is
/// rejected with [`ConfigError::DuplicateField`](crate::ConfigError) when the
/// class is loaded.
///
/// ```
/// use confield::{config_class, ConfigClass, ConfigSettings, MapEnv};
///
/// config_class! {
/// 	pub struct LibraryConfigBase {}
/// 	settings = ConfigSettings {
/// 		env_prefix: "LIBCFG",
/// 		env_sep: "<->",
/// 		..ConfigSettings::DEFAULT
/// 	};
/// }
///
/// config_class! {
/// 	pub struct Secondary: LibraryConfigBase {
/// 		pub value: i64 = 3,
/// 	}
/// }
///
/// let env = MapEnv::from_pairs([("LIBCFG<->SECONDARY<->VALUE", "4")]);
/// let secondary = Secondary::load_from(&env).unwrap();
/// assert_eq!(secondary.value, 4);
/// ```
#[macro_export]
macro_rules! config_class {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident $(: $parent:ty)? {
			$(
				$(#[$fmeta:meta])*
				$fvis:vis $field:ident : $ty:ty = $default:expr $(; coerce = $coerce:expr)?
			),* $(,)?
		}
		$(settings = $settings:expr;)?
	) => {
		$(#[$meta])*
		$vis struct $name {
			$(pub base: $parent,)?
			$(
				$(#[$fmeta])*
				$fvis $field: $ty,
			)*
		}

		impl $name {
			/// Construct an instance against the process environment.
			#[allow(dead_code)]
			$vis fn new() -> $crate::Result<Self> {
				<Self as $crate::ConfigClass>::load()
			}
		}

		impl $crate::ConfigClass for $name {
			const CLASS_NAME: &'static str = stringify!($name);

			fn settings() -> $crate::ConfigSettings {
				$crate::config_class!(@settings [$($settings)?] [$($parent)?])
			}

			fn schema() -> $crate::Schema {
				let schema = $crate::config_class!(@schema [$($parent)?]);
				schema
					$(.field($crate::config_class!(@field $field, $ty, $default $(, $coerce)?)))*
			}

			fn from_values(values: &$crate::ResolvedValues) -> $crate::Result<Self> {
				Ok(Self {
					$(base: <$parent as $crate::ConfigClass>::from_values(values)?,)?
					$($field: values.typed::<$ty>(stringify!($field))?,)*
				})
			}
		}

		$(
			impl ::std::ops::Deref for $name {
				type Target = $parent;

				fn deref(&self) -> &$parent {
					&self.base
				}
			}

			impl ::std::ops::DerefMut for $name {
				fn deref_mut(&mut self) -> &mut $parent {
					&mut self.base
				}
			}
		)?
	};

	(@settings [] []) => {
		$crate::ConfigSettings::DEFAULT
	};
	(@settings [] [$parent:ty]) => {
		<$parent as $crate::ConfigClass>::settings()
	};
	(@settings [$settings:expr] [$($parent:ty)?]) => {
		$settings
	};

	(@schema []) => {
		$crate::Schema::new()
	};
	(@schema [$parent:ty]) => {
		$crate::Schema::new().extend(<$parent as $crate::ConfigClass>::schema())
	};

	(@field $field:ident, $ty:ty, $default:expr) => {
		$crate::ConfigField::<$ty>::new(stringify!($field), $default)
	};
	(@field $field:ident, $ty:ty, $default:expr, $coerce:expr) => {
		$crate::ConfigField::<$ty>::new(stringify!($field), $default).with_coercion($coerce)
	};
}

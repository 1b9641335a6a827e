/* src/config/mod.rs */

//!
//! Engine configuration.
//!
//! Every field has a default matching the stock host, so an empty document is
//! a valid configuration. Loading runs validation when the `validate` feature
//! is enabled.

mod error;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};

#[cfg(feature = "validate")]
use validator::Validate;

use crate::accessor::AnnouncePolicy;
use crate::detect::{FLAGS_METHOD_MARKERS, RAW_MARKERS, TYPED_MARKERS};
use crate::engine::{Preset, builtin_presets};
use crate::store::DEFAULT_STORAGE_KEY;

/// Global holding the typed flag getter on the stock host.
pub const DEFAULT_TYPED_GLOBAL: &str = "default_kevlar_base";

/// Global holding the raw flag dump function on the stock host.
pub const DEFAULT_RAW_GLOBAL: &str = "_yt_player";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
#[serde(default)]
pub struct EngineConfig {
	/// Storage key of the persisted override record.
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub storage_key: String,

	#[cfg_attr(feature = "validate", validate(nested))]
	pub typed: TypedConfig,

	#[cfg_attr(feature = "validate", validate(nested))]
	pub raw: RawConfig,

	/// Named shortcuts for well-known typed flags.
	pub presets: Vec<Preset>,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			storage_key: DEFAULT_STORAGE_KEY.to_string(),
			typed: TypedConfig::default(),
			raw: RawConfig::default(),
			presets: builtin_presets(),
		}
	}
}

/// Typed accessor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
#[serde(default)]
pub struct TypedConfig {
	/// Watched global.
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub global: String,

	/// Source markers of the getter; all must be present.
	#[cfg_attr(
		feature = "validate",
		validate(length(min = 1), custom(function = "validate_markers"))
	)]
	pub markers: Vec<String>,

	/// Field that identifies the sibling object holding the full flag table.
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub table_field: String,

	pub announce: AnnouncePolicy,
}

impl Default for TypedConfig {
	fn default() -> Self {
		Self {
			global: DEFAULT_TYPED_GLOBAL.to_string(),
			markers: to_strings(TYPED_MARKERS),
			table_field: "EXPERIMENT_FLAGS".to_string(),
			announce: AnnouncePolicy::OnInit,
		}
	}
}

/// Raw accessor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
#[serde(default)]
pub struct RawConfig {
	/// Watched global.
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub global: String,

	/// Source markers of the dump function; all must be present.
	#[cfg_attr(
		feature = "validate",
		validate(length(min = 1), custom(function = "validate_markers"))
	)]
	pub markers: Vec<String>,

	/// Field of the host object holding the flags table.
	#[cfg_attr(feature = "validate", validate(length(min = 1)))]
	pub flags_field: String,

	/// Source markers of the per-flag lookup method on the host prototype.
	#[cfg_attr(
		feature = "validate",
		validate(length(min = 1), custom(function = "validate_markers"))
	)]
	pub method_markers: Vec<String>,

	pub announce: AnnouncePolicy,
}

impl Default for RawConfig {
	fn default() -> Self {
		Self {
			global: DEFAULT_RAW_GLOBAL.to_string(),
			markers: to_strings(RAW_MARKERS),
			flags_field: "flags".to_string(),
			method_markers: to_strings(FLAGS_METHOD_MARKERS),
			announce: AnnouncePolicy::EveryCall,
		}
	}
}

/// Rejects empty markers: they would match every function.
#[cfg(feature = "validate")]
fn validate_markers(markers: &[String]) -> Result<(), validator::ValidationError> {
	if markers.iter().any(String::is_empty) {
		return Err(validator::ValidationError::new("empty_marker"));
	}
	Ok(())
}

fn to_strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| s.to_string()).collect()
}

impl EngineConfig {
	/// Parses and validates a JSON document.
	pub fn from_json(input: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.validate_config()?;
		Ok(config)
	}

	/// Parses and validates a TOML document.
	#[cfg(feature = "toml")]
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.validate_config()?;
		Ok(config)
	}
}

/// Internal trait for optional validation.
#[cfg(feature = "validate")]
pub trait ValidateConfig: validator::Validate {
	fn validate_config(&self) -> Result<(), ConfigError> {
		self.validate().map_err(ConfigError::Validation)
	}
}

#[cfg(feature = "validate")]
impl<T: validator::Validate> ValidateConfig for T {}

#[cfg(not(feature = "validate"))]
pub trait ValidateConfig {
	fn validate_config(&self) -> Result<(), ConfigError> {
		Ok(())
	}
}

#[cfg(not(feature = "validate"))]
impl<T> ValidateConfig for T {}

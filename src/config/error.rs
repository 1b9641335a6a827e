/* src/config/error.rs */

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The document could not be parsed.
	#[error("parse error: {0}")]
	Parse(String),

	/// Validation error from validator crate.
	#[cfg(feature = "validate")]
	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),
}

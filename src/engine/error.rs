/* src/engine/error.rs */

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Errors that can occur in the override engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Store error: {0}")]
	Store(#[from] StoreError),

	#[error("Config error: {0}")]
	Config(#[from] ConfigError),

	#[error("Unknown preset: {0}")]
	UnknownPreset(String),

	#[error("Builder error: {0}")]
	Builder(String),
}

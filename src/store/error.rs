/* src/store/error.rs */

/// Errors raised while persisting overrides.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// IO error from the storage backend.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// The record could not be serialized.
	#[error("serialization error: {0}")]
	Serialize(#[from] serde_json::Error),

	/// The backend refused a write that would exceed its capacity.
	#[error("quota exceeded: {needed} bytes needed, {quota} allowed")]
	QuotaExceeded { needed: usize, quota: usize },

	/// Storage key escaped the file storage root.
	#[cfg(feature = "fs")]
	#[error("sandbox violation: {key}")]
	SandboxViolation { key: String },
}

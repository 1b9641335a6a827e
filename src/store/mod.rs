/* src/store/mod.rs */

//!
//! Persisted override set.
//!
//! Overrides are kept as one JSON object under a fixed storage key. Reads are
//! infallible: a missing or malformed blob reads as an empty record. Writes
//! fail instead when the backend cannot be read.

mod error;
#[cfg(feature = "fs")]
mod file;
mod memory;
mod value;

pub use error::StoreError;
#[cfg(feature = "fs")]
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use value::FlagValue;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Weak;

use crate::host::HostValue;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "patched_experiment_flags";

/// Flag name to override value.
pub type OverrideRecord = BTreeMap<String, FlagValue>;

/// Synchronous key/blob persistence.
pub trait Storage {
	/// Reads the blob stored under `key`, `None` if nothing is stored.
	fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

	/// Replaces the blob stored under `key`. Returns once the write is durable.
	fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Read access to the current override record.
pub trait OverrideSource {
	fn overrides(&self) -> OverrideRecord;
}

/// Live flag state that follows every override written through the store.
pub trait LiveTarget {
	fn apply_override(&self, name: &str, value: &HostValue);
}

/// Persisted override store.
pub struct OverrideStore<S> {
	storage: S,
	key: String,
	live: RefCell<Vec<Weak<dyn LiveTarget>>>,
}

impl<S: Storage> OverrideStore<S> {
	/// Creates a store under [`DEFAULT_STORAGE_KEY`].
	pub fn new(storage: S) -> Self {
		Self::with_key(storage, DEFAULT_STORAGE_KEY)
	}

	pub fn with_key(storage: S, key: impl Into<String>) -> Self {
		Self {
			storage,
			key: key.into(),
			live: RefCell::new(Vec::new()),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Returns the persisted record. Never fails.
	pub fn get(&self) -> OverrideRecord {
		self.load().unwrap_or_else(|e| {
			tracing::warn!(key = %self.key, "failed to read overrides: {e}");
			OverrideRecord::new()
		})
	}

	/// Reads the record for a write. A storage error is returned instead of
	/// being read as empty, so a write never clobbers entries it could not see.
	fn load(&self) -> Result<OverrideRecord, StoreError> {
		let Some(bytes) = self.storage.read(&self.key)? else {
			return Ok(OverrideRecord::new());
		};

		let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_slice(&bytes) {
			Ok(raw) => raw,
			Err(e) => {
				tracing::warn!(key = %self.key, "ignoring malformed overrides: {e}");
				return Ok(OverrideRecord::new());
			}
		};

		Ok(raw
			.into_iter()
			.filter_map(|(name, value)| match FlagValue::from_json(value) {
				Some(value) => Some((name, value)),
				None => {
					tracing::debug!(flag = %name, "skipping non-scalar override");
					None
				}
			})
			.collect())
	}

	/// Persists `name = value` and applies it to every attached live target.
	///
	/// Values with no persisted form (`undefined`, `null`, non-finite numbers,
	/// objects) remove `name` from the record, but live targets still receive
	/// the value as given.
	pub fn set(&self, name: &str, value: HostValue) -> Result<(), StoreError> {
		let mut record = self.load()?;
		match FlagValue::from_host(&value) {
			Some(flag) => {
				record.insert(name.to_string(), flag);
			}
			None => {
				record.remove(name);
			}
		}
		self.persist(&record)?;

		self.apply_live(name, &value);
		Ok(())
	}

	/// Removes `name` from the persisted record only. Live state keeps
	/// whatever value it currently holds.
	pub fn remove(&self, name: &str) -> Result<Option<FlagValue>, StoreError> {
		let mut record = self.load()?;
		let removed = record.remove(name);
		if removed.is_some() {
			self.persist(&record)?;
		}
		Ok(removed)
	}

	/// Drops every persisted override.
	pub fn clear(&self) -> Result<(), StoreError> {
		self.persist(&OverrideRecord::new())
	}

	/// Registers live state to be updated on every [`set`](Self::set).
	pub fn attach(&self, target: Weak<dyn LiveTarget>) {
		let mut live = self.live.borrow_mut();
		live.retain(|t| t.strong_count() > 0);
		live.push(target);
	}

	fn persist(&self, record: &OverrideRecord) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec(record)?;
		self.storage.write(&self.key, &bytes)
	}

	fn apply_live(&self, name: &str, value: &HostValue) {
		// Targets may call back into the store, so the list is released first.
		let targets: Vec<_> = self.live.borrow().iter().filter_map(Weak::upgrade).collect();
		for target in targets {
			target.apply_override(name, value);
		}
	}
}

impl<S: Storage> OverrideSource for OverrideStore<S> {
	fn overrides(&self) -> OverrideRecord {
		self.get()
	}
}

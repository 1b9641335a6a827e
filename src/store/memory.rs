/* src/store/memory.rs */

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{Storage, StoreError};

/// In-memory storage, useful for tests and embedded hosts.
///
/// Clones share the same backing map, which lets a test hand one clone to an
/// engine and inspect or reuse the data through another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
	data: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
	quota: Option<usize>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a storage that rejects blobs larger than `quota` bytes.
	pub fn with_quota(quota: usize) -> Self {
		Self {
			quota: Some(quota),
			..Self::default()
		}
	}

	/// Inserts raw data, bypassing the quota.
	pub fn insert(&self, key: &str, value: Vec<u8>) {
		self.data.borrow_mut().insert(key.to_string(), value);
	}

	pub fn contents(&self, key: &str) -> Option<Vec<u8>> {
		self.data.borrow().get(key).cloned()
	}
}

impl Storage for MemoryStorage {
	fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
		Ok(self.contents(key))
	}

	fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
		if let Some(quota) = self.quota
			&& bytes.len() > quota
		{
			return Err(StoreError::QuotaExceeded {
				needed: bytes.len(),
				quota,
			});
		}
		self.insert(key, bytes.to_vec());
		Ok(())
	}
}

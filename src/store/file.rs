/* src/store/file.rs */

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use super::{Storage, StoreError};

/// File storage: each key is kept in `<root>/<key>.json`.
pub struct FileStorage {
	root: PathBuf,
}

impl FileStorage {
	/// Create a new FileStorage rooted at the given path.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolves the file for `key`, rejecting keys that leave the root.
	fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
		let relative = Path::new(key);
		let escapes = relative
			.components()
			.any(|c| !matches!(c, Component::Normal(_)));
		if key.is_empty() || escapes {
			return Err(StoreError::SandboxViolation {
				key: key.to_string(),
			});
		}
		Ok(self.root.join(format!("{key}.json")))
	}

	/// Checks that `path`, once symlinks are resolved, stays under the root.
	/// A file that does not exist yet is judged by its parent directory.
	fn confine(&self, key: &str, path: &Path) -> Result<(), StoreError> {
		let root = fs::canonicalize(&self.root)?;
		let target = match fs::canonicalize(path) {
			Ok(target) => target,
			Err(e) if e.kind() == ErrorKind::NotFound => match path.parent() {
				Some(parent) => fs::canonicalize(parent)?,
				None => return Err(StoreError::Io(e)),
			},
			Err(e) => return Err(StoreError::Io(e)),
		};
		if target.starts_with(&root) {
			Ok(())
		} else {
			Err(StoreError::SandboxViolation {
				key: key.to_string(),
			})
		}
	}
}

impl Storage for FileStorage {
	fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
		let path = self.resolve(key)?;
		match self.confine(key, &path) {
			Ok(()) => (),
			Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e),
		}
		match fs::read(&path) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StoreError::Io(e)),
		}
	}

	fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
		let path = self.resolve(key)?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		self.confine(key, &path)?;

		// Write-then-rename so a crash never leaves a torn record behind.
		let tmp = path.with_extension("json.tmp");
		let result = write_file(&tmp, bytes).and_then(|()| fs::rename(&tmp, &path));
		if let Err(e) = result {
			let _ = fs::remove_file(&tmp);
			return Err(StoreError::Io(e));
		}
		Ok(())
	}
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
	let mut file = fs::File::create(path)?;
	file.write_all(bytes)?;
	file.sync_all()
}

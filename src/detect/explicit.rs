/* src/detect/explicit.rs */

use std::collections::HashSet;

use super::Detector;
use crate::host::HostValue;

/// Matches functions registered by member name.
///
/// For hosts (or test harnesses) that publish accessors under stable names,
/// this replaces source heuristics entirely.
#[derive(Debug, Clone, Default)]
pub struct ExplicitDetector {
	keys: HashSet<String>,
}

impl ExplicitDetector {
	pub fn new<I, S>(keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			keys: keys.into_iter().map(Into::into).collect(),
		}
	}

	pub fn register(&mut self, key: impl Into<String>) {
		self.keys.insert(key.into());
	}
}

impl Detector for ExplicitDetector {
	fn matches(&self, key: &str, candidate: &HostValue) -> bool {
		candidate.as_function().is_some() && self.keys.contains(key)
	}
}

/* src/detect/pattern.rs */

use fancy_regex::Regex;

use super::Detector;
use crate::host::HostValue;

/// Matches functions whose source matches a regular expression.
#[derive(Debug, Clone)]
pub struct PatternDetector {
	regex: Regex,
}

impl PatternDetector {
	pub fn new(pattern: &str) -> Result<Self, fancy_regex::Error> {
		Ok(Self {
			regex: Regex::new(pattern)?,
		})
	}
}

impl Detector for PatternDetector {
	fn matches(&self, _key: &str, candidate: &HostValue) -> bool {
		candidate.as_function().is_some_and(|func| {
			// A backtracking limit hit counts as a miss.
			self.regex.is_match(func.source()).unwrap_or(false)
		})
	}
}

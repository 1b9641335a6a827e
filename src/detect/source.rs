/* src/detect/source.rs */

use super::{Detector, FLAGS_METHOD_MARKERS, RAW_MARKERS, TYPED_MARKERS};
use crate::host::HostValue;

/// Matches functions whose source contains every marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDetector {
	markers: Vec<String>,
}

impl SourceDetector {
	/// Empty markers are dropped, since every source contains them. A
	/// detector left without markers never matches.
	pub fn new<I, S>(markers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			markers: markers
				.into_iter()
				.map(Into::into)
				.filter(|m: &String| !m.is_empty())
				.collect(),
		}
	}

	pub fn typed_flags() -> Self {
		Self::new(TYPED_MARKERS.iter().copied())
	}

	pub fn raw_flags() -> Self {
		Self::new(RAW_MARKERS.iter().copied())
	}

	pub fn flags_method() -> Self {
		Self::new(FLAGS_METHOD_MARKERS.iter().copied())
	}

	pub fn markers(&self) -> &[String] {
		&self.markers
	}
}

impl Detector for SourceDetector {
	fn matches(&self, _key: &str, candidate: &HostValue) -> bool {
		let Some(func) = candidate.as_function() else {
			return false;
		};
		!self.markers.is_empty() && self.markers.iter().all(|m| func.source().contains(m.as_str()))
	}
}

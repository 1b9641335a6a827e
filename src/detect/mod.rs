/* src/detect/mod.rs */

//!
//! Accessor detection.
//!
//! Hosts publish their flag accessors under unstable names, so the engine
//! recognizes them by shape instead. A [`Detector`] is a pure predicate over
//! one member of a host object. Detection is heuristic: a miss is harmless
//! (the watcher stays unbound), a false match would patch the wrong function,
//! so implementations should prefer misses.

mod explicit;
#[cfg(feature = "regex")]
mod pattern;
mod source;

pub use explicit::ExplicitDetector;
#[cfg(feature = "regex")]
pub use pattern::PatternDetector;
pub use source::SourceDetector;

use crate::host::HostValue;

/// Markers identifying the typed flag getter: a string type guard in front of
/// a string-keyed lookup.
pub const TYPED_MARKERS: &[&str] = &["return typeof", "===\"string\"&&"];

/// Markers identifying the raw flag dump function.
pub const RAW_MARKERS: &[&str] = &[";JSON.stringify"];

/// Markers identifying the raw family's per-flag lookup method.
pub const FLAGS_METHOD_MARKERS: &[&str] = &["this.flags"];

/// Decides whether a member of a host object is the accessor being looked for.
pub trait Detector {
	fn matches(&self, key: &str, candidate: &HostValue) -> bool;
}

impl<F> Detector for F
where
	F: Fn(&str, &HostValue) -> bool,
{
	fn matches(&self, key: &str, candidate: &HostValue) -> bool {
		self(key, candidate)
	}
}

/* src/watcher/mod.rs */

//!
//! Target watchers.
//!
//! One [`TargetWatcher`] per watched global. It finds the accessor on the
//! object behind the global and swaps in the instrumented wrapper, either
//! right away or on the global's first assignment.

mod target;

pub use target::TargetWatcher;

use std::fmt;
use std::rc::Rc;

use crate::accessor::Accessor;
use crate::detect::Detector;

/// What one watcher looks for and what it installs.
#[derive(Clone)]
pub struct WatcherBinding {
	/// Name of the watched global.
	pub global: String,
	/// Recognizes the accessor among the global's members.
	pub detector: Rc<dyn Detector>,
	/// Backs the wrapper installed in place of the accessor.
	pub accessor: Rc<dyn Accessor>,
}

impl fmt::Debug for WatcherBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WatcherBinding")
			.field("global", &self.global)
			.field("kind", &self.accessor.kind())
			.finish_non_exhaustive()
	}
}

/// Binding state of a watcher. `Bound` is final.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WatchState {
	#[default]
	Unbound,
	/// The accessor was replaced.
	Bound {
		/// Member of the global's object that now holds the wrapper.
		member: String,
	},
}

impl WatchState {
	pub fn is_bound(&self) -> bool {
		matches!(self, Self::Bound { .. })
	}
}

/* src/notify.rs */

//!
//! De-duplicated discovery notifications.
//!
//! Each registry owns one [`DiscoveryNotifier`]. A flag name is reported to
//! listeners the first time that registry sees it and never again; the set of
//! reported names only grows.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::accessor::AccessorKind;

/// Default event channel capacity.
#[cfg(feature = "events")]
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// A newly observed flag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Discovery {
	/// Name of the watched global the registry belongs to.
	pub global: String,
	/// Accessor family the name was seen through.
	pub kind: AccessorKind,
	/// The flag name.
	pub name: String,
}

/// Callback invoked once per discovered name.
pub type DiscoveryListener = Rc<dyn Fn(&Discovery)>;

pub struct DiscoveryNotifier {
	global: String,
	kind: AccessorKind,
	seen: RefCell<IndexSet<String>>,
	listeners: RefCell<Vec<DiscoveryListener>>,
	#[cfg(feature = "events")]
	events: Option<tokio::sync::broadcast::Sender<Discovery>>,
}

impl DiscoveryNotifier {
	pub fn new(global: impl Into<String>, kind: AccessorKind) -> Self {
		Self {
			global: global.into(),
			kind,
			seen: RefCell::new(IndexSet::new()),
			listeners: RefCell::new(Vec::new()),
			#[cfg(feature = "events")]
			events: None,
		}
	}

	/// Also publishes every discovery on `events`.
	///
	/// Note: events may be dropped if subscribers fall behind and the channel
	/// fills up. Listeners never miss a discovery.
	#[cfg(feature = "events")]
	pub fn with_events(mut self, events: tokio::sync::broadcast::Sender<Discovery>) -> Self {
		self.events = Some(events);
		self
	}

	pub fn global(&self) -> &str {
		&self.global
	}

	pub fn kind(&self) -> AccessorKind {
		self.kind
	}

	pub fn subscribe(&self, listener: DiscoveryListener) {
		self.listeners.borrow_mut().push(listener);
	}

	/// Reports `name` unless it was reported before. Returns true if it was new.
	pub fn announce(&self, name: &str) -> bool {
		if !self.seen.borrow_mut().insert(name.to_string()) {
			return false;
		}

		let discovery = Discovery {
			global: self.global.clone(),
			kind: self.kind,
			name: name.to_string(),
		};
		tracing::trace!(global = %self.global, flag = %name, "flag discovered");

		// Listeners may re-enter the engine, so no borrow is held while they run.
		let listeners = self.listeners.borrow().clone();
		for listener in listeners {
			listener(&discovery);
		}

		#[cfg(feature = "events")]
		if let Some(events) = &self.events {
			let _ = events.send(discovery);
		}

		true
	}

	pub fn is_discovered(&self, name: &str) -> bool {
		self.seen.borrow().contains(name)
	}

	/// Discovered names in discovery order.
	pub fn discovered(&self) -> Vec<String> {
		self.seen.borrow().iter().cloned().collect()
	}
}

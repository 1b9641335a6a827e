/* src/watcher/target.rs */

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{WatchState, WatcherBinding};
use crate::accessor::wrapper;
use crate::host::{HostEnvironment, HostObject, HostValue};

/// Watches one global and patches its accessor exactly once.
pub struct TargetWatcher {
	binding: WatcherBinding,
	state: Rc<RefCell<WatchState>>,
	armed: Cell<bool>,
}

impl TargetWatcher {
	pub fn new(binding: WatcherBinding) -> Self {
		Self {
			binding,
			state: Rc::new(RefCell::new(WatchState::Unbound)),
			armed: Cell::new(false),
		}
	}

	pub fn binding(&self) -> &WatcherBinding {
		&self.binding
	}

	pub fn state(&self) -> WatchState {
		self.state.borrow().clone()
	}

	/// Starts watching. Arming twice is a no-op.
	///
	/// - If the global is already defined, its members are scanned once; a
	///   miss leaves the watcher unbound for good.
	/// - Otherwise a hook waits for the global's first assignment. The
	///   assigned object is scanned, and if the accessor is not there yet an
	///   assignment trap patches the first qualifying member assignment.
	pub fn arm(&self, host: &HostEnvironment) {
		if self.armed.replace(true) {
			return;
		}
		let global = &self.binding.global;

		if host.is_defined(global) {
			match host.get(global) {
				Some(HostValue::Object(object)) => {
					if !scan(&object, &self.binding, &self.state) {
						tracing::debug!(global = %global, "no accessor found on defined global");
					}
				}
				_ => tracing::debug!(global = %global, "defined global is not an object"),
			}
			return;
		}

		tracing::debug!(global = %global, "global not defined yet, waiting for assignment");
		let binding = self.binding.clone();
		let state = Rc::clone(&self.state);
		host.on_first_assign(
			global.clone(),
			Box::new(move |value: HostValue| {
				if let HostValue::Object(object) = &value
					&& !scan(object, &binding, &state)
				{
					install_trap(object, binding, state);
				}
				value
			}),
		);
	}
}

/// Replaces the first member accepted by the detector. Returns true on a hit.
fn scan(object: &HostObject, binding: &WatcherBinding, state: &RefCell<WatchState>) -> bool {
	let Some(member) = object
		.entries()
		.into_iter()
		.find(|(key, value)| binding.detector.matches(key, value))
		.map(|(key, _)| key)
	else {
		return false;
	};

	object.define(member.clone(), wrapper(Rc::clone(&binding.accessor)));
	bind(binding, state, member);
	true
}

fn install_trap(object: &HostObject, binding: WatcherBinding, state: Rc<RefCell<WatchState>>) {
	object.set_trap(Rc::new(move |key: &str, value: &HostValue| {
		if state.borrow().is_bound() || !binding.detector.matches(key, value) {
			return None;
		}
		bind(&binding, &state, key.to_string());
		Some(HostValue::from(wrapper(Rc::clone(&binding.accessor))))
	}));
}

fn bind(binding: &WatcherBinding, state: &RefCell<WatchState>, member: String) {
	tracing::debug!(
		global = %binding.global,
		kind = %binding.accessor.kind(),
		member = %member,
		"accessor replaced"
	);
	*state.borrow_mut() = WatchState::Bound { member };
}

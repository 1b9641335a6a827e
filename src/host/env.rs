/* src/host/env.rs */

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;

use super::HostValue;

/// Runs on the first assignment of a global name.
///
/// Receives the assigned value and returns the value the global is finalized to.
pub type AssignHook = Box<dyn FnOnce(HostValue) -> HostValue>;

/// Process-wide namespace of named global slots.
#[derive(Default)]
pub struct HostEnvironment {
	slots: RefCell<IndexMap<String, HostValue>>,
	hooks: RefCell<HashMap<String, Vec<AssignHook>>>,
}

impl HostEnvironment {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<HostValue> {
		self.slots.borrow().get(name).cloned()
	}

	/// True if `name` currently holds a truthy value.
	pub fn is_defined(&self, name: &str) -> bool {
		self.slots
			.borrow()
			.get(name)
			.is_some_and(HostValue::is_truthy)
	}

	/// Assigns a global. Pending first-assignment hooks for `name` run first,
	/// in registration order, and are then discarded.
	pub fn set(&self, name: impl Into<String>, value: impl Into<HostValue>) {
		let name = name.into();
		let mut value = value.into();

		let hooks = self.hooks.borrow_mut().remove(&name);
		for hook in hooks.into_iter().flatten() {
			value = hook(value);
		}

		self.slots.borrow_mut().insert(name, value);
	}

	/// Registers a hook for the next assignment of `name`.
	pub fn on_first_assign(&self, name: impl Into<String>, hook: AssignHook) {
		self.hooks
			.borrow_mut()
			.entry(name.into())
			.or_default()
			.push(hook);
	}

	/// Number of hooks still waiting for an assignment of `name`.
	pub fn pending_hooks(&self, name: &str) -> usize {
		self.hooks.borrow().get(name).map_or(0, Vec::len)
	}

	pub fn remove(&self, name: &str) -> Option<HostValue> {
		self.slots.borrow_mut().shift_remove(name)
	}

	pub fn names(&self) -> Vec<String> {
		self.slots.borrow().keys().cloned().collect()
	}
}

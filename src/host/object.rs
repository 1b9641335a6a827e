/* src/host/object.rs */

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::HostValue;

/// Intercepts member assignments on a [`HostObject`].
///
/// Receives the member key and the value being assigned. Returning `Some`
/// stores the returned value instead; `None` lets the assignment through.
pub type AssignTrap = Rc<dyn Fn(&str, &HostValue) -> Option<HostValue>>;

#[derive(Default)]
struct ObjectData {
	members: IndexMap<String, HostValue>,
	proto: Option<HostObject>,
	trap: Option<AssignTrap>,
}

/// Shared handle to a host object.
///
/// Members enumerate in insertion order. Cloning the handle aliases the same
/// object, so mutations are visible to the host and to every other holder.
#[derive(Clone, Default)]
pub struct HostObject(Rc<RefCell<ObjectData>>);

/// Non-owning handle to a [`HostObject`].
#[derive(Clone, Default)]
pub struct WeakObject(Weak<RefCell<ObjectData>>);

impl WeakObject {
	pub fn upgrade(&self) -> Option<HostObject> {
		self.0.upgrade().map(HostObject)
	}
}

impl HostObject {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty object whose prototype is `proto`.
	pub fn with_proto(proto: HostObject) -> Self {
		let object = Self::new();
		object.set_proto(Some(proto));
		object
	}

	/// Builds an object from `(key, value)` pairs, bypassing any trap.
	pub fn from_members<I, K, V>(members: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<HostValue>,
	{
		let object = Self::new();
		for (key, value) in members {
			object.define(key, value);
		}
		object
	}

	/// Reads an own member, `undefined` if absent.
	pub fn get(&self, key: &str) -> HostValue {
		self.0.borrow().members.get(key).cloned().unwrap_or_default()
	}

	pub fn get_own(&self, key: &str) -> Option<HostValue> {
		self.0.borrow().members.get(key).cloned()
	}

	/// Reads a member, walking the prototype chain.
	pub fn lookup(&self, key: &str) -> HostValue {
		let mut current = Some(self.clone());
		while let Some(object) = current {
			if let Some(value) = object.get_own(key) {
				return value;
			}
			current = object.proto();
		}
		HostValue::Undefined
	}

	pub fn has_own(&self, key: &str) -> bool {
		self.0.borrow().members.contains_key(key)
	}

	/// Own member names in enumeration order.
	pub fn keys(&self) -> Vec<String> {
		self.0.borrow().members.keys().cloned().collect()
	}

	pub fn values(&self) -> Vec<HostValue> {
		self.0.borrow().members.values().cloned().collect()
	}

	pub fn entries(&self) -> Vec<(String, HostValue)> {
		self.0
			.borrow()
			.members
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.0.borrow().members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.borrow().members.is_empty()
	}

	pub fn proto(&self) -> Option<HostObject> {
		self.0.borrow().proto.clone()
	}

	pub fn set_proto(&self, proto: Option<HostObject>) {
		self.0.borrow_mut().proto = proto;
	}

	/// Assigns a member, routing the value through the assignment trap if one
	/// is installed. Returns the value actually stored.
	pub fn set(&self, key: impl Into<String>, value: impl Into<HostValue>) -> HostValue {
		let key = key.into();
		let value = value.into();

		// The trap may read this object, so no borrow is held while it runs.
		let trap = self.0.borrow().trap.clone();
		let value = match trap.and_then(|trap| trap(key.as_str(), &value)) {
			Some(replacement) => replacement,
			None => value,
		};

		self.0.borrow_mut().members.insert(key, value.clone());
		value
	}

	/// Assigns a member without consulting the trap.
	pub fn define(&self, key: impl Into<String>, value: impl Into<HostValue>) {
		self.0.borrow_mut().members.insert(key.into(), value.into());
	}

	pub fn remove(&self, key: &str) -> Option<HostValue> {
		self.0.borrow_mut().members.shift_remove(key)
	}

	/// Installs the assignment trap, replacing any previous one.
	pub fn set_trap(&self, trap: AssignTrap) {
		self.0.borrow_mut().trap = Some(trap);
	}

	pub fn clear_trap(&self) {
		self.0.borrow_mut().trap = None;
	}

	pub fn has_trap(&self) -> bool {
		self.0.borrow().trap.is_some()
	}

	/// Calls the function found at `key` (prototype chain included).
	///
	/// Returns `undefined` if the member is not callable.
	pub fn call_method(&self, key: &str, args: &[HostValue]) -> HostValue {
		match self.lookup(key) {
			HostValue::Function(func) => func.call(args),
			_ => HostValue::Undefined,
		}
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub fn downgrade(&self) -> WeakObject {
		WeakObject(Rc::downgrade(&self.0))
	}
}

impl fmt::Debug for HostObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Objects may reference each other; only member names are printed.
		f.debug_struct("HostObject")
			.field("keys", &self.keys())
			.field("trapped", &self.has_trap())
			.finish()
	}
}

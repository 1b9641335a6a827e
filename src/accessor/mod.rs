/* src/accessor/mod.rs */

//!
//! Instrumented flag accessors.
//!
//! An accessor replaces one host getter one-to-one. On first use it binds a
//! registry (the host's own flag table) and merges the persisted overrides
//! into it; on every call it reports unseen names and answers from the
//! registry. Host call sites keep working unchanged.

mod raw;
mod typed;

pub use raw::RawAccessor;
pub use typed::TypedAccessor;

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::{HostFunction, HostObject, HostValue};
use crate::notify::DiscoveryNotifier;
use crate::store::LiveTarget;

/// The two accessor families a host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
	/// Typed getter: `get(name) -> value`, values kept as-is.
	Typed,
	/// Raw getter: `get(host, name) -> value`, values coerced.
	Raw,
}

impl fmt::Display for AccessorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Typed => f.write_str("typed"),
			Self::Raw => f.write_str("raw"),
		}
	}
}

/// When an accessor re-announces the names already in its registry.
///
/// Announcements are de-duplicated either way; `EveryCall` additionally picks
/// up names the host wrote into the table after the registry was bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncePolicy {
	/// Announce the table once, when the registry is bound.
	#[default]
	OnInit,
	/// Re-walk the table on every call.
	EveryCall,
}

/// Common interface of the instrumented accessors.
pub trait Accessor: LiveTarget {
	fn kind(&self) -> AccessorKind;

	/// Answers one host call. Never fails: unknown names yield `undefined`.
	fn resolve(&self, args: &[HostValue]) -> HostValue;

	/// The bound registry, `None` until the first successful call.
	fn table(&self) -> Option<HostObject>;

	fn notifier(&self) -> &DiscoveryNotifier;
}

/// Builds the host function that replaces the original accessor.
pub fn wrapper(accessor: Rc<dyn Accessor>) -> HostFunction {
	let source = format!("function(){{/* flagtap {} accessor */}}", accessor.kind());
	HostFunction::new(source, move |args| accessor.resolve(args))
}

pub(crate) fn flag_name(arg: Option<&HostValue>) -> String {
	arg.map_or_else(|| "undefined".to_string(), HostValue::as_key)
}

/// Default-initializes a falsy entry and reports it.
pub(crate) fn touch(table: &HostObject, name: &str, notifier: &DiscoveryNotifier) {
	if !table.get(name).is_truthy() {
		table.set(name, HostValue::Undefined);
		notifier.announce(name);
	}
}

pub(crate) fn announce_all(table: &HostObject, notifier: &DiscoveryNotifier) {
	for name in table.keys() {
		notifier.announce(&name);
	}
}

pub(crate) fn read(table: &HostObject, name: &str) -> HostValue {
	match table.get(name) {
		HostValue::Null => HostValue::Undefined,
		value => value,
	}
}

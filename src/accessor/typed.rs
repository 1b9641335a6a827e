/* src/accessor/typed.rs */

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{Accessor, AccessorKind, AnnouncePolicy, announce_all, flag_name, read, touch};
use crate::host::{HostEnvironment, HostObject, HostValue};
use crate::notify::DiscoveryNotifier;
use crate::store::{LiveTarget, OverrideSource};

/// Accessor for the typed flag getter, `get(name) -> value`.
///
/// The registry is the host's full flag table, found on a sibling object of
/// the getter that exposes `table_field`.
pub struct TypedAccessor {
	host: Weak<HostEnvironment>,
	global: String,
	table_field: String,
	overrides: Rc<dyn OverrideSource>,
	notifier: Rc<DiscoveryNotifier>,
	announce: AnnouncePolicy,
	table: RefCell<Option<HostObject>>,
}

impl TypedAccessor {
	pub fn new(
		host: &Rc<HostEnvironment>,
		global: impl Into<String>,
		table_field: impl Into<String>,
		overrides: Rc<dyn OverrideSource>,
		notifier: Rc<DiscoveryNotifier>,
	) -> Self {
		Self {
			host: Rc::downgrade(host),
			global: global.into(),
			table_field: table_field.into(),
			overrides,
			notifier,
			announce: AnnouncePolicy::OnInit,
			table: RefCell::new(None),
		}
	}

	pub fn with_announce(mut self, announce: AnnouncePolicy) -> Self {
		self.announce = announce;
		self
	}

	/// Binds the registry on first use. Binding happens at most once; if the
	/// flag table is not reachable yet, a later call tries again.
	fn bind(&self) -> Option<HostObject> {
		let existing = self.table.borrow().clone();
		if existing.is_some() {
			return existing;
		}

		let Some(table) = self.locate() else {
			tracing::debug!(global = %self.global, field = %self.table_field, "flag table not reachable yet");
			return None;
		};
		// Set before merging so re-entrant calls see the bound registry.
		*self.table.borrow_mut() = Some(table.clone());

		for (name, value) in self.overrides.overrides() {
			table.set(name, value.to_host());
		}

		tracing::debug!(global = %self.global, flags = table.len(), "typed flag registry bound");
		announce_all(&table, &self.notifier);
		Some(table)
	}

	fn locate(&self) -> Option<HostObject> {
		let host = self.host.upgrade()?;
		let root = host.get(&self.global)?;
		root.as_object()?
			.values()
			.into_iter()
			.find_map(|sibling| match sibling.as_object()?.get(&self.table_field) {
				HostValue::Object(table) => Some(table),
				_ => None,
			})
	}
}

impl Accessor for TypedAccessor {
	fn kind(&self) -> AccessorKind {
		AccessorKind::Typed
	}

	fn resolve(&self, args: &[HostValue]) -> HostValue {
		let name = flag_name(args.first());
		let Some(table) = self.bind() else {
			return HostValue::Undefined;
		};

		if self.announce == AnnouncePolicy::EveryCall {
			announce_all(&table, &self.notifier);
		}
		touch(&table, &name, &self.notifier);
		read(&table, &name)
	}

	fn table(&self) -> Option<HostObject> {
		self.table.borrow().clone()
	}

	fn notifier(&self) -> &DiscoveryNotifier {
		&self.notifier
	}
}

impl LiveTarget for TypedAccessor {
	fn apply_override(&self, name: &str, value: &HostValue) {
		if let Some(table) = self.table() {
			table.set(name, value.clone());
		}
	}
}

/* src/accessor/raw.rs */

use std::cell::RefCell;
use std::rc::Rc;

use super::{Accessor, AccessorKind, AnnouncePolicy, announce_all, flag_name, read, touch};
use crate::coerce::coerce_raw;
use crate::detect::Detector;
use crate::host::{HostFunction, HostObject, HostValue};
use crate::notify::DiscoveryNotifier;
use crate::store::{LiveTarget, OverrideSource};

/// Accessor for the raw flag getter, `get(host, name) -> value`.
///
/// The registry is the `flags_field` table of the host object passed as the
/// first argument. Values are coerced on the way in and out.
pub struct RawAccessor {
	flags_field: String,
	lookup_detector: Rc<dyn Detector>,
	overrides: Rc<dyn OverrideSource>,
	notifier: Rc<DiscoveryNotifier>,
	announce: AnnouncePolicy,
	table: RefCell<Option<HostObject>>,
}

impl RawAccessor {
	/// `lookup_detector` finds the host's per-flag lookup method on the
	/// prototype of the host object; it is patched when the registry binds.
	pub fn new(
		flags_field: impl Into<String>,
		lookup_detector: Rc<dyn Detector>,
		overrides: Rc<dyn OverrideSource>,
		notifier: Rc<DiscoveryNotifier>,
	) -> Self {
		Self {
			flags_field: flags_field.into(),
			lookup_detector,
			overrides,
			notifier,
			announce: AnnouncePolicy::EveryCall,
			table: RefCell::new(None),
		}
	}

	pub fn with_announce(mut self, announce: AnnouncePolicy) -> Self {
		self.announce = announce;
		self
	}

	fn bind(&self, host: Option<&HostObject>) -> Option<HostObject> {
		let existing = self.table.borrow().clone();
		if existing.is_some() {
			return existing;
		}

		let host = host?;
		let HostValue::Object(table) = host.get(&self.flags_field) else {
			tracing::debug!(field = %self.flags_field, "host object has no flags table");
			return None;
		};
		*self.table.borrow_mut() = Some(table.clone());

		for (name, value) in self.overrides.overrides() {
			table.set(name, coerce_raw(&value.to_host()));
		}

		tracing::debug!(flags = table.len(), "raw flag registry bound");
		self.patch_lookup(host, &table);
		Some(table)
	}

	/// Replaces the host's own per-flag lookup so internal call paths that
	/// bypass the dump function also report and default flags.
	fn patch_lookup(&self, host: &HostObject, table: &HostObject) {
		let Some(proto) = host.proto() else {
			tracing::debug!("host object has no prototype, lookup left unpatched");
			return;
		};
		let Some(key) = proto
			.entries()
			.into_iter()
			.find(|(key, value)| self.lookup_detector.matches(key, value))
			.map(|(key, _)| key)
		else {
			tracing::debug!("no flag lookup method on prototype");
			return;
		};

		let table = table.clone();
		let notifier = Rc::clone(&self.notifier);
		let lookup = HostFunction::new("function(){/* flagtap raw lookup */}", move |args| {
			let name = flag_name(args.first());
			touch(&table, &name, &notifier);
			read(&table, &name)
		});

		tracing::debug!(member = %key, "raw flag lookup patched");
		host.set(key, lookup);
	}
}

impl Accessor for RawAccessor {
	fn kind(&self) -> AccessorKind {
		AccessorKind::Raw
	}

	fn resolve(&self, args: &[HostValue]) -> HostValue {
		let name = flag_name(args.get(1));
		let Some(table) = self.bind(args.first().and_then(HostValue::as_object)) else {
			return HostValue::Undefined;
		};

		if self.announce == AnnouncePolicy::EveryCall {
			announce_all(&table, &self.notifier);
		}
		touch(&table, &name, &self.notifier);
		coerce_raw(&read(&table, &name))
	}

	fn table(&self) -> Option<HostObject> {
		self.table.borrow().clone()
	}

	fn notifier(&self) -> &DiscoveryNotifier {
		&self.notifier
	}
}

impl LiveTarget for RawAccessor {
	fn apply_override(&self, name: &str, value: &HostValue) {
		if let Some(table) = self.table() {
			table.set(name, coerce_raw(value));
		}
	}
}

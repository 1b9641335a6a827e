/* tests/common/mod.rs */

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use flagtap::{Discovery, Engine, HostEnvironment, HostFunction, HostObject, HostValue, MemoryStorage};

pub const TYPED_GETTER_SRC: &str = r#"function(a){return typeof a==="string"&&a in b?b[a]:void 0}"#;
pub const RAW_DUMP_SRC: &str = "function(a,b){var c=a.flags[b];return c;JSON.stringify(a.flags)}";
pub const RAW_LOOKUP_SRC: &str = "function(a){return this.flags[a]}";
pub const UNRELATED_SRC: &str = "function(a,b){return a+b}";

pub fn unrelated() -> HostValue {
	HostFunction::new(UNRELATED_SRC, |_| HostValue::Undefined).into()
}

/// Builds a typed-host global: `{ sum, config: { EXPERIMENT_FLAGS }, getFlag }`.
/// Returns the global object and its flag table.
pub fn typed_global(flags: &[(&str, HostValue)]) -> (HostObject, HostObject) {
	let table = HostObject::from_members(flags.iter().cloned());
	let options = HostObject::from_members([("EXPERIMENT_FLAGS", HostValue::from(table.clone()))]);
	let root = HostObject::from_members([
		("sum", unrelated()),
		("config", HostValue::from(options)),
		("getFlag", typed_getter(&table)),
	]);
	(root, table)
}

pub fn typed_getter(table: &HostObject) -> HostValue {
	let table = table.clone();
	HostFunction::new(TYPED_GETTER_SRC, move |args| {
		table.get(&args.first().map(HostValue::as_key).unwrap_or_default())
	})
	.into()
}

/// Builds the object the raw accessor receives as its first argument.
pub fn raw_experiments(flags: &[(&str, HostValue)]) -> HostObject {
	let table = HostObject::from_members(flags.iter().cloned());
	let lookup_table = table.clone();
	let proto = HostObject::from_members([(
		"getFlag",
		HostValue::from(HostFunction::new(RAW_LOOKUP_SRC, move |args| {
			lookup_table.get(&args.first().map(HostValue::as_key).unwrap_or_default())
		})),
	)]);
	let experiments = HostObject::with_proto(proto);
	experiments.define("flags", table);
	experiments
}

pub fn raw_dump() -> HostValue {
	HostFunction::new(RAW_DUMP_SRC, |args| {
		let name = args.get(1).map(HostValue::as_key).unwrap_or_default();
		match args.first() {
			Some(HostValue::Object(host)) => host.get("flags").as_object().map(|t| t.get(&name)).into(),
			_ => HostValue::Undefined,
		}
	})
	.into()
}

pub type Seen = Rc<RefCell<Vec<Discovery>>>;

pub fn engine(host: &Rc<HostEnvironment>, storage: MemoryStorage) -> (Engine<MemoryStorage>, Seen) {
	let seen: Seen = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&seen);
	let engine = Engine::builder()
		.host(Rc::clone(host))
		.storage(storage)
		.on_discovered(move |d| sink.borrow_mut().push(d.clone()))
		.build()
		.unwrap();
	(engine, seen)
}

pub fn stored(json: &str) -> MemoryStorage {
	let storage = MemoryStorage::new();
	storage.insert(flagtap::store::DEFAULT_STORAGE_KEY, json.as_bytes().to_vec());
	storage
}

pub fn count(seen: &Seen, name: &str) -> usize {
	seen.borrow().iter().filter(|d| d.name == name).count()
}

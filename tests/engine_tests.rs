/* tests/engine_tests.rs */

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use flagtap::detect::ExplicitDetector;
use flagtap::watcher::WatchState;
use flagtap::{AccessorKind, EngineError, FlagValue, HostEnvironment, HostObject, HostValue, MemoryStorage};

fn bound(member: &str) -> WatchState {
	WatchState::Bound {
		member: member.to_string(),
	}
}

#[test]
fn test_typed_override_precedence() {
	let host = Rc::new(HostEnvironment::new());
	let (root, table) = typed_global(&[("f", false.into()), ("g", true.into())]);
	host.set("default_kevlar_base", root.clone());

	let (engine, _) = engine(&host, stored(r#"{"f": true}"#));
	engine.start();
	assert_eq!(engine.state(AccessorKind::Typed), bound("getFlag"));

	assert_eq!(root.call_method("getFlag", &["f".into()]), HostValue::Bool(true));
	assert_eq!(engine.flag(AccessorKind::Typed, "f"), Some(HostValue::Bool(true)));
	// The registry is the host's own table.
	assert_eq!(table.get("f"), HostValue::Bool(true));
	assert!(engine.registry(AccessorKind::Typed).unwrap().ptr_eq(&table));
}

#[test]
fn test_typed_discovery_is_idempotent() {
	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[("f", true.into())]);
	host.set("default_kevlar_base", root.clone());

	let (engine, seen) = engine(&host, MemoryStorage::new());
	engine.start();

	assert_eq!(root.call_method("getFlag", &["unseen".into()]), HostValue::Undefined);
	assert_eq!(root.call_method("getFlag", &["unseen".into()]), HostValue::Undefined);

	assert_eq!(count(&seen, "unseen"), 1);
	assert_eq!(count(&seen, "f"), 1);
	assert_eq!(engine.discovered(AccessorKind::Typed), vec!["f", "unseen"]);
	assert!(seen.borrow().iter().all(|d| d.global == "default_kevlar_base"));
}

#[test]
fn test_typed_falsy_flag_is_reset_to_undefined() {
	let host = Rc::new(HostEnvironment::new());
	let (root, table) = typed_global(&[("off", false.into()), ("zero", 0.into())]);
	host.set("default_kevlar_base", root.clone());

	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();

	assert_eq!(root.call_method("getFlag", &["off".into()]), HostValue::Undefined);
	assert_eq!(table.get_own("off"), Some(HostValue::Undefined));
	assert_eq!(root.call_method("getFlag", &["zero".into()]), HostValue::Undefined);
}

#[test]
fn test_typed_flag_table_missing_returns_undefined_and_retries() {
	let host = Rc::new(HostEnvironment::new());
	let root = HostObject::from_members([("getFlag", typed_getter(&HostObject::new()))]);
	host.set("default_kevlar_base", root.clone());

	let (engine, seen) = engine(&host, MemoryStorage::new());
	engine.start();

	assert_eq!(root.call_method("getFlag", &["a".into()]), HostValue::Undefined);
	assert!(engine.registry(AccessorKind::Typed).is_none());
	assert!(seen.borrow().is_empty());

	let table = HostObject::from_members([("a", HostValue::from(true))]);
	root.define("config", HostObject::from_members([("EXPERIMENT_FLAGS", table)]));

	assert_eq!(root.call_method("getFlag", &["a".into()]), HostValue::Bool(true));
	assert_eq!(count(&seen, "a"), 1);
}

#[test]
fn test_late_raw_global_is_patched_on_assignment() {
	let host = Rc::new(HostEnvironment::new());
	let (engine, seen) = engine(&host, MemoryStorage::new());
	engine.start();

	assert_eq!(engine.state(AccessorKind::Raw), WatchState::Unbound);
	assert_eq!(host.pending_hooks("_yt_player"), 1);

	let player = HostObject::new();
	host.set("_yt_player", player.clone());
	assert!(player.has_trap());
	assert_eq!(host.pending_hooks("_yt_player"), 0);

	player.set("sum", unrelated());
	assert_eq!(engine.state(AccessorKind::Raw), WatchState::Unbound);

	player.set("m", raw_dump());
	assert_eq!(engine.state(AccessorKind::Raw), bound("m"));

	let installed = player.get("m");
	assert!(installed.as_function().unwrap().source().contains("flagtap raw accessor"));

	let global = host.get("_yt_player").unwrap();
	let experiments = raw_experiments(&[("x", true.into())]);
	let value = global
		.as_object()
		.unwrap()
		.call_method("m", &[experiments.into(), "x".into()]);
	assert_eq!(value, HostValue::String("true".to_string()));
	assert_eq!(count(&seen, "x"), 1);
}

#[test]
fn test_binding_is_permanent() {
	let host = Rc::new(HostEnvironment::new());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();

	let player = HostObject::new();
	host.set("_yt_player", player.clone());
	player.set("m", raw_dump());
	assert_eq!(engine.state(AccessorKind::Raw), bound("m"));

	// A second qualifying assignment on the same object passes through.
	player.set("other", raw_dump());
	assert_eq!(player.get("other").as_function().unwrap().source(), RAW_DUMP_SRC);

	// Reassigning the global does not trigger another scan.
	let replacement = HostObject::from_members([("m", raw_dump())]);
	host.set("_yt_player", replacement.clone());
	assert!(!replacement.has_trap());
	assert_eq!(replacement.get("m").as_function().unwrap().source(), RAW_DUMP_SRC);
	assert_eq!(engine.state(AccessorKind::Raw), bound("m"));
}

#[test]
fn test_late_global_with_accessor_already_present() {
	let host = Rc::new(HostEnvironment::new());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();

	let (root, _) = typed_global(&[("f", true.into())]);
	host.set("default_kevlar_base", root.clone());

	assert_eq!(engine.state(AccessorKind::Typed), bound("getFlag"));
	assert!(!root.has_trap());
	assert_eq!(root.call_method("getFlag", &["f".into()]), HostValue::Bool(true));
}

#[test]
fn test_defined_global_without_accessor_stays_unbound() {
	let host = Rc::new(HostEnvironment::new());
	let root = HostObject::from_members([("sum", unrelated())]);
	host.set("default_kevlar_base", root.clone());

	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();
	assert_eq!(engine.state(AccessorKind::Typed), WatchState::Unbound);

	// One-shot scan: a later member assignment is not observed.
	let table = HostObject::new();
	root.set("getFlag", typed_getter(&table));
	assert_eq!(engine.state(AccessorKind::Typed), WatchState::Unbound);
	assert_eq!(root.get("getFlag").as_function().unwrap().source(), TYPED_GETTER_SRC);
}

#[cfg(not(feature = "validate"))]
#[test]
fn test_empty_markers_do_not_patch_unrelated_members() {
	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[("a", HostValue::Bool(true))]);
	host.set("default_kevlar_base", root.clone());

	let mut config = flagtap::EngineConfig::default();
	config.typed.markers = vec![String::new()];
	let engine = flagtap::Engine::builder()
		.config(config)
		.host(Rc::clone(&host))
		.storage(MemoryStorage::new())
		.build()
		.unwrap();
	engine.start();

	assert_eq!(engine.state(AccessorKind::Typed), WatchState::Unbound);
	assert_eq!(root.get("sum").as_function().unwrap().source(), UNRELATED_SRC);
	assert_eq!(root.get("getFlag").as_function().unwrap().source(), TYPED_GETTER_SRC);
}

#[test]
fn test_start_twice_is_noop() {
	let host = Rc::new(HostEnvironment::new());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();
	engine.start();

	assert_eq!(host.pending_hooks("default_kevlar_base"), 1);
	assert_eq!(host.pending_hooks("_yt_player"), 1);
}

#[test]
fn test_raw_merges_coerced_overrides_and_patches_lookup() {
	let host = Rc::new(HostEnvironment::new());
	let player = HostObject::from_members([("m", raw_dump())]);
	host.set("_yt_player", player.clone());

	let (engine, seen) = engine(&host, stored(r#"{"a": true, "n": "7", "s": "abc"}"#));
	engine.start();

	let experiments = raw_experiments(&[("host_flag", "1".into())]);
	let value = player.call_method("m", &[experiments.clone().into(), "n".into()]);
	assert_eq!(value, HostValue::Number(7.0));

	let flags = experiments.get("flags");
	let flags = flags.as_object().unwrap();
	assert_eq!(flags.get("a"), HostValue::String("true".to_string()));
	assert_eq!(flags.get("s"), HostValue::String("abc".to_string()));

	// Stored values read through the dump are coerced once more.
	assert_eq!(
		player.call_method("m", &[experiments.clone().into(), "host_flag".into()]),
		HostValue::Number(1.0)
	);

	// The per-flag lookup on the prototype is shadowed on the instance.
	assert!(experiments.has_own("getFlag"));
	assert_eq!(experiments.call_method("getFlag", &["fresh".into()]), HostValue::Undefined);
	assert_eq!(count(&seen, "fresh"), 1);
	assert_eq!(experiments.call_method("getFlag", &["host_flag".into()]), HostValue::from("1"));
}

#[test]
fn test_raw_reannounces_while_typed_does_not() {
	let host = Rc::new(HostEnvironment::new());
	let (root, table) = typed_global(&[("f", true.into())]);
	host.set("default_kevlar_base", root.clone());
	let player = HostObject::from_members([("m", raw_dump())]);
	host.set("_yt_player", player.clone());

	let (engine, seen) = engine(&host, MemoryStorage::new());
	engine.start();

	let experiments = raw_experiments(&[]);
	player.call_method("m", &[experiments.clone().into(), "a".into()]);
	root.call_method("getFlag", &["f".into()]);

	// Host writes straight into both tables after binding.
	experiments.get("flags").as_object().unwrap().set("late_raw", "1");
	table.set("late_typed", true);

	player.call_method("m", &[experiments.into(), "a".into()]);
	root.call_method("getFlag", &["f".into()]);

	assert_eq!(count(&seen, "late_raw"), 1);
	assert_eq!(count(&seen, "late_typed"), 0);
}

#[test]
fn test_set_override_updates_live_registries() {
	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[]);
	host.set("default_kevlar_base", root.clone());
	let player = HostObject::from_members([("m", raw_dump())]);
	host.set("_yt_player", player.clone());

	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();
	root.call_method("getFlag", &["x".into()]);
	player.call_method("m", &[raw_experiments(&[]).into(), "x".into()]);

	engine.set_override("shared", true, AccessorKind::Typed).unwrap();
	assert_eq!(engine.flag(AccessorKind::Typed, "shared"), Some(HostValue::Bool(true)));
	assert_eq!(engine.flag(AccessorKind::Raw, "shared"), Some(HostValue::from("true")));

	engine.set_override("level", "42", AccessorKind::Raw).unwrap();
	assert_eq!(engine.flag(AccessorKind::Typed, "level"), Some(HostValue::from("42")));
	assert_eq!(engine.flag(AccessorKind::Raw, "level"), Some(HostValue::Number(42.0)));

	let overrides = engine.overrides();
	assert_eq!(overrides.get("shared"), Some(&FlagValue::Bool(true)));
	assert_eq!(overrides.get("level"), Some(&FlagValue::from("42")));
}

#[test]
fn test_set_override_before_binding_only_persists() {
	let host = Rc::new(HostEnvironment::new());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();

	engine.set_override("early", 3, AccessorKind::Typed).unwrap();
	assert!(engine.registry(AccessorKind::Typed).is_none());

	let (root, _) = typed_global(&[]);
	host.set("default_kevlar_base", root.clone());
	assert_eq!(root.call_method("getFlag", &["early".into()]), HostValue::Number(3.0));
}

#[test]
fn test_overrides_survive_reload() {
	let storage = MemoryStorage::new();
	{
		let host = Rc::new(HostEnvironment::new());
		let (engine, _) = engine(&host, storage.clone());
		engine.start();
		engine.set_override("f", true, AccessorKind::Typed).unwrap();
	}

	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[("f", false.into())]);
	host.set("default_kevlar_base", root.clone());
	let (engine, _) = engine(&host, storage);
	engine.start();

	assert_eq!(root.call_method("getFlag", &["f".into()]), HostValue::Bool(true));
}

#[test]
fn test_clear_override_keeps_live_value() {
	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[]);
	host.set("default_kevlar_base", root.clone());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();
	root.call_method("getFlag", &["x".into()]);

	engine.set_override("f", true, AccessorKind::Typed).unwrap();
	assert_eq!(engine.clear_override("f").unwrap(), Some(FlagValue::Bool(true)));
	assert!(engine.overrides().is_empty());
	assert_eq!(engine.flag(AccessorKind::Typed, "f"), Some(HostValue::Bool(true)));
	assert_eq!(engine.clear_override("f").unwrap(), None);
}

#[test]
fn test_presets() {
	let host = Rc::new(HostEnvironment::new());
	let (root, _) = typed_global(&[]);
	host.set("default_kevlar_base", root.clone());
	let (engine, _) = engine(&host, MemoryStorage::new());
	engine.start();
	root.call_method("getFlag", &["x".into()]);

	assert_eq!(engine.presets().len(), 2);
	assert_eq!(engine.preset_enabled("New Icons"), Some(false));
	assert_eq!(engine.preset_enabled("Missing"), None);

	engine.set_preset("New Icons", true).unwrap();
	assert_eq!(engine.preset_enabled("New Icons"), Some(true));
	assert_eq!(
		engine.flag(AccessorKind::Typed, "enable_web_delhi_icons"),
		Some(HostValue::Bool(true))
	);

	engine.set_preset("New Icons", false).unwrap();
	assert_eq!(engine.preset_enabled("New Icons"), Some(false));

	match engine.set_preset("Missing", true) {
		Err(EngineError::UnknownPreset(label)) => assert_eq!(label, "Missing"),
		other => panic!("Expected UnknownPreset, got {other:?}"),
	}
}

#[test]
fn test_explicit_detector() {
	let host = Rc::new(HostEnvironment::new());
	let table = HostObject::from_members([("f", HostValue::from(true))]);
	let root = HostObject::from_members([
		("config", HostValue::from(HostObject::from_members([("EXPERIMENT_FLAGS", table)]))),
		("lookup", unrelated()),
	]);
	host.set("default_kevlar_base", root.clone());

	let engine = flagtap::Engine::builder()
		.host(Rc::clone(&host))
		.storage(MemoryStorage::new())
		.typed_detector(ExplicitDetector::new(["lookup"]))
		.build()
		.unwrap();
	engine.start();

	assert_eq!(engine.state(AccessorKind::Typed), bound("lookup"));
	assert_eq!(root.call_method("lookup", &["f".into()]), HostValue::Bool(true));
}

#[test]
fn test_registry_binds_once_under_reentrant_calls() {
	let host = Rc::new(HostEnvironment::new());
	let (root, table) = typed_global(&[("a", true.into()), ("b", true.into())]);
	host.set("default_kevlar_base", root.clone());

	let nested: Rc<RefCell<Vec<HostValue>>> = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&nested);
	let reentry = root.clone();
	let engine = flagtap::Engine::builder()
		.host(Rc::clone(&host))
		.storage(stored(r#"{"o": 5}"#))
		.on_discovered(move |d| {
			let value = reentry.call_method("getFlag", &[d.name.as_str().into()]);
			sink.borrow_mut().push(value);
		})
		.build()
		.unwrap();
	engine.start();

	root.call_method("getFlag", &["a".into()]);

	assert!(engine.registry(AccessorKind::Typed).unwrap().ptr_eq(&table));
	assert_eq!(engine.discovered(AccessorKind::Typed), vec!["a", "b", "o"]);
	assert_eq!(nested.borrow().as_slice(), &[
		HostValue::Bool(true),
		HostValue::Bool(true),
		HostValue::Number(5.0),
	]);

	// Break the listener -> host -> wrapper cycle.
	root.remove("getFlag");
}

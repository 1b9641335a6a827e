/* src/engine/mod.rs */

//!
//! The override engine: wires the store, both accessors and their watchers
//! onto one host environment.

mod error;
mod preset;

pub use error::EngineError;
pub use preset::{Preset, builtin_presets};

use std::rc::Rc;

use crate::accessor::{Accessor, AccessorKind, RawAccessor, TypedAccessor};
use crate::config::{EngineConfig, ValidateConfig};
use crate::detect::{Detector, SourceDetector};
use crate::host::{HostEnvironment, HostObject, HostValue};
use crate::notify::{Discovery, DiscoveryListener, DiscoveryNotifier};
use crate::store::{FlagValue, LiveTarget, OverrideRecord, OverrideSource, OverrideStore, Storage};
use crate::watcher::{TargetWatcher, WatchState, WatcherBinding};

#[cfg(feature = "events")]
use crate::notify::DEFAULT_EVENT_CAPACITY;

/// Overrides host feature flags at runtime and keeps them persisted.
pub struct Engine<S> {
	config: EngineConfig,
	host: Rc<HostEnvironment>,
	store: Rc<OverrideStore<S>>,
	typed: Rc<TypedAccessor>,
	raw: Rc<RawAccessor>,
	typed_watcher: TargetWatcher,
	raw_watcher: TargetWatcher,
	#[cfg(feature = "events")]
	events: tokio::sync::broadcast::Sender<Discovery>,
}

/// Builder for [`Engine`].
pub struct EngineBuilder<S> {
	config: Option<EngineConfig>,
	storage: Option<S>,
	host: Option<Rc<HostEnvironment>>,
	typed_detector: Option<Rc<dyn Detector>>,
	raw_detector: Option<Rc<dyn Detector>>,
	listeners: Vec<DiscoveryListener>,
	#[cfg(feature = "events")]
	event_capacity: usize,
}

impl<S> EngineBuilder<S>
where
	S: Storage + 'static,
{
	pub fn new() -> Self {
		Self {
			config: None,
			storage: None,
			host: None,
			typed_detector: None,
			raw_detector: None,
			listeners: Vec::new(),
			#[cfg(feature = "events")]
			event_capacity: DEFAULT_EVENT_CAPACITY,
		}
	}

	pub fn config(mut self, config: EngineConfig) -> Self {
		self.config = Some(config);
		self
	}

	pub fn storage(mut self, storage: S) -> Self {
		self.storage = Some(storage);
		self
	}

	pub fn host(mut self, host: Rc<HostEnvironment>) -> Self {
		self.host = Some(host);
		self
	}

	/// Replaces the configured source markers for the typed getter.
	pub fn typed_detector(mut self, detector: impl Detector + 'static) -> Self {
		self.typed_detector = Some(Rc::new(detector));
		self
	}

	/// Replaces the configured source markers for the raw dump function.
	pub fn raw_detector(mut self, detector: impl Detector + 'static) -> Self {
		self.raw_detector = Some(Rc::new(detector));
		self
	}

	/// Registers a callback for newly discovered flag names.
	pub fn on_discovered(mut self, listener: impl Fn(&Discovery) + 'static) -> Self {
		self.listeners.push(Rc::new(listener));
		self
	}

	/// Sets the discovery event channel capacity.
	#[cfg(feature = "events")]
	pub fn event_capacity(mut self, capacity: usize) -> Self {
		self.event_capacity = capacity;
		self
	}

	pub fn build(self) -> Result<Engine<S>, EngineError> {
		let config = self.config.unwrap_or_default();
		config.validate_config()?;
		let storage = self
			.storage
			.ok_or_else(|| EngineError::Builder("storage is required".to_string()))?;
		let host = self
			.host
			.ok_or_else(|| EngineError::Builder("host is required".to_string()))?;

		let store = Rc::new(OverrideStore::with_key(storage, config.storage_key.clone()));
		let overrides: Rc<dyn OverrideSource> = store.clone();

		#[cfg(feature = "events")]
		let events = tokio::sync::broadcast::channel(self.event_capacity).0;

		let notifier = |global: &str, kind| {
			let notifier = DiscoveryNotifier::new(global, kind);
			#[cfg(feature = "events")]
			let notifier = notifier.with_events(events.clone());
			for listener in &self.listeners {
				notifier.subscribe(Rc::clone(listener));
			}
			Rc::new(notifier)
		};

		let typed = Rc::new(
			TypedAccessor::new(
				&host,
				&config.typed.global,
				&config.typed.table_field,
				Rc::clone(&overrides),
				notifier(&config.typed.global, AccessorKind::Typed),
			)
			.with_announce(config.typed.announce),
		);
		let raw = Rc::new(
			RawAccessor::new(
				&config.raw.flags_field,
				Rc::new(SourceDetector::new(config.raw.method_markers.clone())),
				overrides,
				notifier(&config.raw.global, AccessorKind::Raw),
			)
			.with_announce(config.raw.announce),
		);

		let typed_live: Rc<dyn LiveTarget> = typed.clone();
		let raw_live: Rc<dyn LiveTarget> = raw.clone();
		store.attach(Rc::downgrade(&typed_live));
		store.attach(Rc::downgrade(&raw_live));

		let typed_watcher = TargetWatcher::new(WatcherBinding {
			global: config.typed.global.clone(),
			detector: self
				.typed_detector
				.unwrap_or_else(|| Rc::new(SourceDetector::new(config.typed.markers.clone()))),
			accessor: typed.clone(),
		});
		let raw_watcher = TargetWatcher::new(WatcherBinding {
			global: config.raw.global.clone(),
			detector: self
				.raw_detector
				.unwrap_or_else(|| Rc::new(SourceDetector::new(config.raw.markers.clone()))),
			accessor: raw.clone(),
		});

		Ok(Engine {
			config,
			host,
			store,
			typed,
			raw,
			typed_watcher,
			raw_watcher,
			#[cfg(feature = "events")]
			events,
		})
	}
}

impl<S> Default for EngineBuilder<S>
where
	S: Storage + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<S> Engine<S>
where
	S: Storage + 'static,
{
	pub fn builder() -> EngineBuilder<S> {
		EngineBuilder::new()
	}

	/// Arms both watchers on the host. Calling it again has no effect.
	pub fn start(&self) {
		self.typed_watcher.arm(&self.host);
		self.raw_watcher.arm(&self.host);
	}

	/// Persists an override and applies it to both live registries.
	///
	/// `origin` is the accessor family the caller was editing. The value is
	/// written to both registries regardless, coerced for the raw one.
	pub fn set_override(
		&self,
		name: &str,
		value: impl Into<HostValue>,
		origin: AccessorKind,
	) -> Result<(), EngineError> {
		let value = value.into();
		tracing::debug!(flag = %name, origin = %origin, value = ?value, "setting override");
		self.store.set(name, value)?;
		Ok(())
	}

	/// Forgets a persisted override. Live registries are left as they are
	/// until the next session.
	pub fn clear_override(&self, name: &str) -> Result<Option<FlagValue>, EngineError> {
		Ok(self.store.remove(name)?)
	}

	/// Returns the persisted override record.
	pub fn overrides(&self) -> OverrideRecord {
		self.store.get()
	}

	pub fn state(&self, kind: AccessorKind) -> WatchState {
		match kind {
			AccessorKind::Typed => self.typed_watcher.state(),
			AccessorKind::Raw => self.raw_watcher.state(),
		}
	}

	pub fn accessor(&self, kind: AccessorKind) -> Rc<dyn Accessor> {
		match kind {
			AccessorKind::Typed => self.typed.clone(),
			AccessorKind::Raw => self.raw.clone(),
		}
	}

	/// Flag names reported so far for `kind`, in discovery order.
	pub fn discovered(&self, kind: AccessorKind) -> Vec<String> {
		self.accessor(kind).notifier().discovered()
	}

	/// The live registry for `kind`, once bound.
	pub fn registry(&self, kind: AccessorKind) -> Option<HostObject> {
		self.accessor(kind).table()
	}

	/// Current live value of `name`, `None` if unbound or unknown.
	pub fn flag(&self, kind: AccessorKind, name: &str) -> Option<HostValue> {
		self.registry(kind).and_then(|table| table.get_own(name))
	}

	pub fn presets(&self) -> &[Preset] {
		&self.config.presets
	}

	/// Whether the preset's flag is persisted as truthy. `None` for unknown labels.
	pub fn preset_enabled(&self, label: &str) -> Option<bool> {
		let preset = self.preset(label)?;
		Some(
			self.store
				.get()
				.get(&preset.flag)
				.is_some_and(FlagValue::is_truthy),
		)
	}

	pub fn set_preset(&self, label: &str, enabled: bool) -> Result<(), EngineError> {
		let flag = self
			.preset(label)
			.ok_or_else(|| EngineError::UnknownPreset(label.to_string()))?
			.flag
			.clone();
		self.set_override(&flag, enabled, AccessorKind::Typed)
	}

	fn preset(&self, label: &str) -> Option<&Preset> {
		self.config.presets.iter().find(|p| p.label == label)
	}

	pub fn store(&self) -> &OverrideStore<S> {
		&self.store
	}

	pub fn host(&self) -> &Rc<HostEnvironment> {
		&self.host
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Subscribes to discovery events from both registries.
	#[cfg(feature = "events")]
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Discovery> {
		self.events.subscribe()
	}
}

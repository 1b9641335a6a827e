/* src/lib.rs */

//!
//! Runtime feature-flag overrides for an introspectable host.
//!
//! A host application reads its feature flags through internal accessor
//! functions it never documents. This crate finds those accessors on the
//! host's globals, replaces them once with instrumented wrappers, merges a
//! persisted override set into the host's live flag tables, and reports each
//! flag name it sees exactly once.
//!
//! - **host**: The host model: globals, objects, functions with source text.
//! - **store**: Persisted override record (`OverrideStore`).
//! - **coerce**: Value normalization for the raw accessor family.
//! - **detect**: Accessor recognition (`Detector`).
//! - **accessor**: The instrumented wrappers (`TypedAccessor`, `RawAccessor`).
//! - **watcher**: One-shot binding of a wrapper onto a global (`TargetWatcher`).
//! - **notify**: De-duplicated discovery notifications.
//! - **engine**: Unified interface integrating the above (`Engine`).
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `fs`: File-backed override storage (`FileStorage`).
//! - `events`: Broadcast channel of discovery events.
//! - `regex`: Regular-expression detector (`PatternDetector`).
//! - `toml`: TOML configuration loading.
//! - `validate`: Configuration validation.
//!
//! ## Basic Usage
//!
//! ```ignore
//! let host = Rc::new(HostEnvironment::new());
//! let engine = Engine::builder()
//!     .host(host.clone())
//!     .storage(MemoryStorage::new())
//!     .on_discovered(|d| println!("{} {}", d.kind, d.name))
//!     .build()?;
//! engine.start();
//! engine.set_override("my_flag", true, AccessorKind::Typed)?;
//! ```

pub mod accessor;
pub mod coerce;
pub mod config;
pub mod detect;
pub mod engine;
pub mod host;
pub mod notify;
pub mod store;
pub mod watcher;

pub use accessor::{Accessor, AccessorKind, AnnouncePolicy};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, EngineError};
pub use host::{HostEnvironment, HostFunction, HostObject, HostValue};
pub use notify::Discovery;
pub use store::{FlagValue, MemoryStorage, OverrideRecord, OverrideStore, StoreError};

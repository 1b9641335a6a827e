/* src/host/mod.rs */

//!
//! A small model of an introspectable host runtime.
//!
//! Flag accessors live inside objects that the host publishes on a shared
//! namespace. The engine never depends on how a concrete host stores them:
//! it only needs named global slots with an observable first assignment
//! ([`HostEnvironment`]), objects whose member assignments can be trapped
//! ([`HostObject`]), and functions that expose their source text
//! ([`HostFunction`]).

mod env;
mod function;
mod object;
mod value;

pub use env::{AssignHook, HostEnvironment};
pub use function::HostFunction;
pub use object::{AssignTrap, HostObject, WeakObject};
pub use value::HostValue;

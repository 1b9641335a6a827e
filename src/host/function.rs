/* src/host/function.rs */

use std::fmt;
use std::rc::Rc;

use super::HostValue;

type Body = dyn Fn(&[HostValue]) -> HostValue;

/// A callable host function together with its source text.
///
/// Detectors classify functions by their source alone, so the source is kept
/// verbatim and never normalized.
#[derive(Clone)]
pub struct HostFunction {
	source: Rc<str>,
	body: Rc<Body>,
}

impl HostFunction {
	pub fn new<F>(source: impl Into<Rc<str>>, body: F) -> Self
	where
		F: Fn(&[HostValue]) -> HostValue + 'static,
	{
		Self {
			source: source.into(),
			body: Rc::new(body),
		}
	}

	/// Source text of the function.
	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn call(&self, args: &[HostValue]) -> HostValue {
		(self.body)(args)
	}

	/// Returns true if both handles refer to the same function.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.body, &other.body)
	}
}

impl fmt::Debug for HostFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("HostFunction").field(&self.source).finish()
	}
}

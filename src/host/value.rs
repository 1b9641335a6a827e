/* src/host/value.rs */

use std::fmt;

use super::{HostFunction, HostObject};

/// A value as the host runtime sees it.
#[derive(Clone, Default)]
pub enum HostValue {
	#[default]
	Undefined,
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	Object(HostObject),
	Function(HostFunction),
}

impl HostValue {
	/// Host truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are falsy.
	pub fn is_truthy(&self) -> bool {
		match self {
			Self::Undefined | Self::Null => false,
			Self::Bool(b) => *b,
			Self::Number(n) => *n != 0.0 && !n.is_nan(),
			Self::String(s) => !s.is_empty(),
			Self::Object(_) | Self::Function(_) => true,
		}
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Self::Undefined)
	}

	/// True for `undefined` and `null`.
	pub fn is_nullish(&self) -> bool {
		matches!(self, Self::Undefined | Self::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			Self::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&HostObject> {
		match self {
			Self::Object(o) => Some(o),
			_ => None,
		}
	}

	pub fn as_function(&self) -> Option<&HostFunction> {
		match self {
			Self::Function(f) => Some(f),
			_ => None,
		}
	}

	/// Returns the property-key form of this value.
	///
	/// Accessors are called with arbitrary arguments; whatever they receive is
	/// turned into a member name the same way the host would.
	pub fn as_key(&self) -> String {
		match self {
			Self::Undefined => "undefined".to_string(),
			Self::Null => "null".to_string(),
			Self::Bool(b) => b.to_string(),
			Self::Number(n) => number_to_string(*n),
			Self::String(s) => s.clone(),
			Self::Object(_) => "[object Object]".to_string(),
			Self::Function(f) => f.source().to_string(),
		}
	}
}

pub(crate) fn number_to_string(n: f64) -> String {
	if n.is_nan() {
		"NaN".to_string()
	} else if n.is_infinite() {
		if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
	} else if n == 0.0 {
		"0".to_string()
	} else if n.abs() >= 1e21 || n.abs() < 1e-6 {
		// Exponent form: `1e+21`, `1.5e-7`.
		let formatted = format!("{n:e}");
		match formatted.split_once('e') {
			Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
			_ => formatted,
		}
	} else {
		n.to_string()
	}
}

impl PartialEq for HostValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
			(Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl fmt::Debug for HostValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Undefined => f.write_str("undefined"),
			Self::Null => f.write_str("null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Number(n) => f.write_str(&number_to_string(*n)),
			Self::String(s) => write!(f, "{s:?}"),
			Self::Object(o) => fmt::Debug::fmt(o, f),
			Self::Function(func) => fmt::Debug::fmt(func, f),
		}
	}
}

impl From<bool> for HostValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for HostValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<i32> for HostValue {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<&str> for HostValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for HostValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<HostObject> for HostValue {
	fn from(value: HostObject) -> Self {
		Self::Object(value)
	}
}

impl From<HostFunction> for HostValue {
	fn from(value: HostFunction) -> Self {
		Self::Function(value)
	}
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Undefined, Into::into)
	}
}

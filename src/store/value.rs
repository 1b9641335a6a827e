/* src/store/value.rs */

use serde::{Deserialize, Serialize};

use crate::host::HostValue;

/// A persisted override value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
	Bool(bool),
	Number(serde_json::Number),
	String(String),
}

impl FlagValue {
	/// Converts a JSON value. Only scalars other than `null` are accepted.
	pub fn from_json(value: serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Bool(b) => Some(Self::Bool(b)),
			serde_json::Value::Number(n) => Some(Self::Number(n)),
			serde_json::Value::String(s) => Some(Self::String(s)),
			_ => None,
		}
	}

	/// Converts a host value into its persisted form, if it has one.
	pub fn from_host(value: &HostValue) -> Option<Self> {
		match value {
			HostValue::Bool(b) => Some(Self::Bool(*b)),
			HostValue::Number(n) => number(*n).map(Self::Number),
			HostValue::String(s) => Some(Self::String(s.clone())),
			_ => None,
		}
	}

	pub fn to_host(&self) -> HostValue {
		match self {
			Self::Bool(b) => HostValue::Bool(*b),
			Self::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
			Self::String(s) => HostValue::String(s.clone()),
		}
	}

	pub fn is_truthy(&self) -> bool {
		self.to_host().is_truthy()
	}
}

impl From<bool> for FlagValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for FlagValue {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}

impl From<&str> for FlagValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for FlagValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

// Integral values are stored without a fraction so the blob reads `42`, not `42.0`.
fn number(n: f64) -> Option<serde_json::Number> {
	if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
		Some(serde_json::Number::from(n as i64))
	} else {
		serde_json::Number::from_f64(n)
	}
}

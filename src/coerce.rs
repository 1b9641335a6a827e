/* src/coerce.rs */

//!
//! Value coercion for the raw accessor family.
//!
//! The raw family stores booleans as the strings `"true"`/`"false"` and
//! numbers as integers. Every value entering or leaving a raw registry goes
//! through [`coerce_raw`]: live host reads, merged overrides and UI writes.

use crate::host::HostValue;

/// Normalizes `value` into the raw family's representation.
///
/// - booleans become `"true"` / `"false"`;
/// - anything that converts to a number is integer-parsed;
/// - everything else is returned unchanged.
pub fn coerce_raw(value: &HostValue) -> HostValue {
	match value {
		HostValue::Bool(b) => HostValue::String(b.to_string()),
		other if to_number(other).is_nan() => other.clone(),
		other => HostValue::Number(parse_int(&other.as_key())),
	}
}

/// Numeric conversion with host semantics. `NaN` means "not a number".
pub fn to_number(value: &HostValue) -> f64 {
	match value {
		HostValue::Undefined => f64::NAN,
		HostValue::Null => 0.0,
		HostValue::Bool(b) => f64::from(u8::from(*b)),
		HostValue::Number(n) => *n,
		HostValue::String(s) => string_to_number(s),
		HostValue::Object(_) | HostValue::Function(_) => f64::NAN,
	}
}

fn string_to_number(s: &str) -> f64 {
	let s = s.trim();
	if s.is_empty() {
		return 0.0;
	}

	match s.get(..2) {
		Some("0x" | "0X") => radix_to_number(&s[2..], 16),
		Some("0o" | "0O") => radix_to_number(&s[2..], 8),
		Some("0b" | "0B") => radix_to_number(&s[2..], 2),
		_ => match s {
			"Infinity" | "+Infinity" => f64::INFINITY,
			"-Infinity" => f64::NEG_INFINITY,
			// Rust also accepts "inf" and "nan"; the host does not.
			_ if s
				.bytes()
				.all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) =>
			{
				s.parse().unwrap_or(f64::NAN)
			}
			_ => f64::NAN,
		},
	}
}

fn radix_to_number(digits: &str, radix: u32) -> f64 {
	if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
		return f64::NAN;
	}
	accumulate(digits, radix)
}

/// Integer-parses the leading digits of `s`, `NaN` if there are none.
fn parse_int(s: &str) -> f64 {
	let s = s.trim_start();
	let (sign, rest) = match s.as_bytes().first() {
		Some(b'-') => (-1.0, &s[1..]),
		Some(b'+') => (1.0, &s[1..]),
		_ => (1.0, s),
	};
	let (radix, digits) = match rest.get(..2) {
		Some("0x" | "0X") => (16, &rest[2..]),
		_ => (10, rest),
	};

	let end = digits
		.find(|c: char| !c.is_digit(radix))
		.unwrap_or(digits.len());
	if end == 0 {
		return f64::NAN;
	}
	sign * accumulate(&digits[..end], radix)
}

fn accumulate(digits: &str, radix: u32) -> f64 {
	digits
		.chars()
		.filter_map(|c| c.to_digit(radix))
		.fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}

use std::borrow::Cow;
use std::io::Write;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter};
use serde_json::{Number, Value};

use super::BValue;

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number, exact even beyond 64 bits
/// - `ByteString(bytes)` => JSON string; bytes that are not UTF-8 become `\xNN`
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => integer_to_json(*i),
		BValue::ByteString(bytes) => Value::String(backslash_replace(bytes).into_owned()),
		BValue::List(list_items) => Value::Array(list_items.iter().map(bvalue_to_json).collect()),
		BValue::Dict(map) => {
			let mut json_map = serde_json::Map::new();
			for (k, v) in map {
				json_map.insert(k.clone(), bvalue_to_json(v));
			}
			Value::Object(json_map)
		}
	}
}

fn integer_to_json(i: i128) -> Value {
	if let Ok(small) = i64::try_from(i) {
		return Value::Number(Number::from(small));
	}
	if let Ok(unsigned) = u64::try_from(i) {
		return Value::Number(Number::from(unsigned));
	}
	// arbitrary_precision keeps the digits verbatim
	let digits = i.to_string();
	serde_json::from_str::<Value>(&digits).unwrap_or(Value::String(digits))
}

/// Decodes `bytes` as UTF-8, replacing every byte of an invalid sequence with `\xNN`.
pub fn backslash_replace(bytes: &[u8]) -> Cow<'_, str> {
	if let Ok(s) = std::str::from_utf8(bytes) {
		return Cow::Borrowed(s);
	}

	let mut out = String::with_capacity(bytes.len() * 2);
	let mut rest = bytes;
	while !rest.is_empty() {
		match std::str::from_utf8(rest) {
			Ok(s) => {
				out.push_str(s);
				break;
			}
			Err(e) => {
				let (valid, after) = rest.split_at(e.valid_up_to());
				out.push_str(std::str::from_utf8(valid).unwrap_or_default());
				let bad_len = e.error_len().unwrap_or(after.len());
				for b in &after[..bad_len] {
					out.push_str(&format!("\\x{:02x}", b));
				}
				rest = &after[bad_len..];
			}
		}
	}
	Cow::Owned(out)
}

/// Serializes `value` to `writer`.
///
/// With `indent` set, objects and arrays are spread over lines indented by
/// that many spaces (zero still breaks lines). With `ensure_ascii`, every
/// non-ASCII character is written as a `\uXXXX` escape.
pub fn write_json<W: Write>(
	value: &Value,
	indent: Option<usize>,
	ensure_ascii: bool,
	mut writer: W,
) -> std::io::Result<()> {
	let mut buf = Vec::new();
	match indent {
		Some(width) => {
			let spaces = vec![b' '; width];
			let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&spaces));
			value.serialize(&mut ser)?;
		}
		None => {
			let mut ser = serde_json::Serializer::with_formatter(&mut buf, CompactFormatter);
			value.serialize(&mut ser)?;
		}
	}

	// serde_json only ever writes UTF-8
	let text = String::from_utf8_lossy(&buf);
	let text = if ensure_ascii { escape_non_ascii(&text) } else { text.into_owned() };
	writer.write_all(text.as_bytes())
}

// Non-ASCII can only occur inside JSON strings, so escaping in place is safe.
fn escape_non_ascii(json: &str) -> String {
	let mut out = String::with_capacity(json.len());
	let mut units = [0u16; 2];
	for c in json.chars() {
		if c.is_ascii() {
			out.push(c);
			continue;
		}
		for unit in c.encode_utf16(&mut units) {
			out.push_str(&format!("\\u{:04x}", unit));
		}
	}
	out
}

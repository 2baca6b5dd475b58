use std::collections::HashMap;
use super::error::BencodeError;
use crate::bencode::bvalue::BValue;

/// Nesting limit applied by [`DecodeOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

// smallest bencodes are `0:`, `le` and `de`
const MIN_VALUE_LEN: usize = 2;

/// Knobs for the decoder. The defaults keep duplicate dict keys
/// (last one wins) and allow 64 levels of nested lists/dicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	pub max_depth: usize,
	pub reject_duplicate_keys: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			reject_duplicate_keys: false,
		}
	}
}

/// Decodes the value starting at `input[0]`.
///
/// Returns the value and the number of leading bytes it occupied; anything
/// after that is left for the caller.
pub fn decode_bencode(input: &[u8]) -> Result<(BValue, usize), BencodeError> {
	decode_bencode_with(input, &DecodeOptions::default())
}

pub fn decode_bencode_with(input: &[u8], options: &DecodeOptions) -> Result<(BValue, usize), BencodeError> {
	let decoder = Decoder { input, options };
	let (value, end) = decoder.decode_value(0, 0)?;
	Ok((value, end))
}

struct Decoder<'a> {
	input: &'a [u8],
	options: &'a DecodeOptions,
}

impl<'a> Decoder<'a> {
	/// Decodes the value at `pos`, returning it with the position just past it.
	fn decode_value(&self, pos: usize, depth: usize) -> Result<(BValue, usize), BencodeError> {
		let available = self.input.len().saturating_sub(pos);
		if available < MIN_VALUE_LEN {
			return Err(BencodeError::TruncatedInput { offset: pos, available });
		}

		match self.input[pos] {
			b'i' => self.decode_integer(pos),
			b'l' => self.decode_list(pos, depth),
			b'd' => self.decode_dict(pos, depth),
			c if c.is_ascii_digit() => self.decode_string(pos),
			c => Err(BencodeError::InvalidLeadingToken {
				offset: pos,
				found: c as char,
			}),
		}
	}

	/// Decodes `i<digits>e`.
	fn decode_integer(&self, pos: usize) -> Result<(BValue, usize), BencodeError> {
		let start = pos + 1;
		let end = self.input[start..]
			.iter()
			.position(|&b| b == b'e')
			.map(|i| start + i)
			.ok_or(BencodeError::MissingTerminator { offset: pos, context: "integer" })?;

		let payload = &self.input[start..end];
		let malformed = || BencodeError::MalformedInteger {
			offset: pos,
			found: String::from_utf8_lossy(payload).into_owned(),
		};

		let digits = payload.strip_prefix(b"-").unwrap_or(payload);
		if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
			return Err(malformed());
		}
		// Leading zeros and "-0" have no canonical form
		if digits[0] == b'0' && (digits.len() > 1 || digits.len() != payload.len()) {
			return Err(malformed());
		}

		// all ASCII by now, so the conversion cannot fail
		let num_str = std::str::from_utf8(payload).map_err(|_| malformed())?;
		let parsed = num_str.parse::<i128>().map_err(|_| malformed())?;

		// add 1 to account for 'e'
		Ok((BValue::Integer(parsed), end + 1))
	}

	/// Decodes a string of the form `<length>:<bytes>`.
	fn decode_string(&self, pos: usize) -> Result<(BValue, usize), BencodeError> {
		let (bytes, end) = self.decode_raw_string(pos)?;
		Ok((BValue::ByteString(bytes.to_vec()), end))
	}

	fn decode_raw_string(&self, pos: usize) -> Result<(&'a [u8], usize), BencodeError> {
		let input = self.input;
		let digits_len = input[pos..]
			.iter()
			.take_while(|b| b.is_ascii_digit())
			.count();
		let colon_index = pos + digits_len;

		if digits_len == 0 {
			return Err(BencodeError::MalformedLength {
				offset: pos,
				reason: "expected at least one digit".to_string(),
			});
		}
		match input.get(colon_index) {
			Some(b':') => {}
			Some(&other) => {
				return Err(BencodeError::MalformedLength {
					offset: pos,
					reason: format!("expected ':' after the length, found {:?}", other as char),
				})
			}
			None => {
				return Err(BencodeError::MalformedLength {
					offset: pos,
					reason: "missing ':' after the length".to_string(),
				})
			}
		}

		let str_length = std::str::from_utf8(&input[pos..colon_index]).map_err(|e| {
			BencodeError::MalformedLength { offset: pos, reason: e.to_string() }
		})?;
		let length = str_length.parse::<usize>().map_err(|e| BencodeError::MalformedLength {
			offset: pos,
			reason: format!("invalid string length {}: {}", str_length, e),
		})?;

		let start_data = colon_index + 1;
		let available = input.len() - start_data;
		if length > available {
			return Err(BencodeError::LengthMismatch {
				offset: pos,
				expected: length,
				available,
			});
		}

		let end_data = start_data + length;
		Ok((&input[start_data..end_data], end_data))
	}

	/// Decodes a list of the form `l<items>e`.
	fn decode_list(&self, pos: usize, depth: usize) -> Result<(BValue, usize), BencodeError> {
		self.check_depth(pos, depth)?;

		let mut idx = pos + 1; // skip 'l'
		let mut items = Vec::new();

		while idx < self.input.len() && self.input[idx] != b'e' {
			let (val, next) = self.decode_value(idx, depth + 1)?;
			idx = next;
			items.push(val);
		}

		// If we've run out of input, the list is unclosed
		if idx >= self.input.len() {
			return Err(BencodeError::MissingTerminator { offset: pos, context: "list" });
		}

		// add 1 to account for 'e'
		Ok((BValue::List(items), idx + 1))
	}

	/// Decodes a dict of the form `d<key><value>...e`.
	fn decode_dict(&self, pos: usize, depth: usize) -> Result<(BValue, usize), BencodeError> {
		self.check_depth(pos, depth)?;

		let mut idx = pos + 1; // Skip the initial 'd'
		let mut map = HashMap::new();

		while idx < self.input.len() && self.input[idx] != b'e' {
			let key_offset = idx;
			let (key_bytes, next) = self.decode_raw_string(idx)?;
			idx = next;

			let key = String::from_utf8(key_bytes.to_vec()).map_err(|_| {
				BencodeError::InvalidMapKeyEncoding {
					offset: key_offset,
					key: key_bytes.to_vec(),
				}
			})?;

			let (value, next) = self.decode_value(idx, depth + 1)?;
			idx = next;

			if self.options.reject_duplicate_keys && map.contains_key(&key) {
				return Err(BencodeError::DuplicateKey { offset: key_offset, key });
			}
			map.insert(key, value);
		}

		// If we've run out of input, it's an unclosed dictionary
		if idx >= self.input.len() {
			return Err(BencodeError::MissingTerminator { offset: pos, context: "dictionary" });
		}

		Ok((BValue::Dict(map), idx + 1))
	}

	fn check_depth(&self, pos: usize, depth: usize) -> Result<(), BencodeError> {
		if depth >= self.options.max_depth {
			return Err(BencodeError::NestingTooDeep {
				offset: pos,
				max_depth: self.options.max_depth,
			});
		}
		Ok(())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn bytes(s: &str) -> BValue {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	#[test]
	fn test_decode_integer() {
		let input = b"i42e";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::Integer(42));
	}

	#[test]
	fn test_decode_negative_integer() {
		let input = b"i-13e";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::Integer(-13));
	}

	#[test]
	fn test_decode_integer_zero() {
		let (value, consumed) = decode_bencode(b"i0e").unwrap();
		assert_eq!(consumed, 3);
		assert_eq!(value, BValue::Integer(0));
	}

	#[test]
	fn test_decode_integer_wider_than_i64() {
		let (value, _) = decode_bencode(b"i-170141183460469231731687303715884105728e").unwrap();
		assert_eq!(value, BValue::Integer(i128::MIN));
	}

	#[test]
	fn test_decode_integer_out_of_range() {
		let err = decode_bencode(b"i170141183460469231731687303715884105728e").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedInteger { offset: 0, .. }));
	}

	#[test]
	fn test_decode_integer_stops_at_first_e() {
		let (value, consumed) = decode_bencode(b"i7e3:abc").unwrap();
		assert_eq!(value, BValue::Integer(7));
		assert_eq!(consumed, 3);
	}

	#[test]
	fn test_decode_string() {
		let input = b"5:hello";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, bytes("hello"));
	}

	#[test]
	fn test_decode_empty_string() {
		let (value, consumed) = decode_bencode(b"0:").unwrap();
		assert_eq!(consumed, 2);
		assert_eq!(value, bytes(""));
	}

	#[test]
	fn test_decode_string_with_binary_payload() {
		let (value, consumed) = decode_bencode(b"3:\xff\x00e").unwrap();
		assert_eq!(consumed, 5);
		assert_eq!(value, BValue::ByteString(vec![0xff, 0x00, b'e']));
	}

	#[test]
	fn test_decode_list() {
		// l4:spami42ee => ["spam", 42]
		let input = b"l4:spami42ee";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::List(vec![bytes("spam"), BValue::Integer(42)]));
	}

	#[test]
	fn test_decode_nested_list() {
		// l4:spaml3:eggi3eee => ["spam", ["egg", 3]]
		let input = b"l4:spaml3:eggi3eee";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(
			value,
			BValue::List(vec![
				bytes("spam"),
				BValue::List(vec![bytes("egg"), BValue::Integer(3)]),
			])
		);
	}

	#[test]
	fn test_decode_dict() {
		// d3:bar4:spam3:fooi42ee => {"bar":"spam", "foo":42}
		let input = b"d3:bar4:spam3:fooi42ee";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		let mut expected_map = HashMap::new();
		expected_map.insert("bar".to_string(), bytes("spam"));
		expected_map.insert("foo".to_string(), BValue::Integer(42));
		assert_eq!(value, BValue::Dict(expected_map));
	}

	#[test]
	fn test_decode_empty_containers() {
		assert_eq!(decode_bencode(b"de").unwrap(), (BValue::Dict(HashMap::new()), 2));
		assert_eq!(decode_bencode(b"le").unwrap(), (BValue::List(vec![]), 2));
	}

	#[test]
	fn test_decode_dict_with_nested_list() {
		// => {"foo": ["spam", 1], "bar": "eggs"}
		let input = b"d3:fool4:spami1ee3:bar4:eggse";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());

		let mut expected_map = HashMap::new();
		expected_map.insert(
			"foo".to_string(),
			BValue::List(vec![bytes("spam"), BValue::Integer(1)]),
		);
		expected_map.insert("bar".to_string(), bytes("eggs"));
		assert_eq!(value, BValue::Dict(expected_map));
	}

	#[test]
	fn test_decode_reports_consumed_prefix_only() {
		let input = b"l1:ae4:tail";
		let (value, consumed) = decode_bencode(input).unwrap();
		assert_eq!(value, BValue::List(vec![bytes("a")]));
		assert_eq!(&input[consumed..], b"4:tail");
	}

	#[test]
	fn test_duplicate_keys_last_write_wins() {
		let (value, _) = decode_bencode(b"d1:ai1e1:ai2ee").unwrap();
		assert_eq!(value.get("a"), Some(&BValue::Integer(2)));
		assert_eq!(value.as_dict().unwrap().len(), 1);
	}

	#[test]
	fn test_duplicate_keys_rejected_when_asked() {
		let options = DecodeOptions { reject_duplicate_keys: true, ..Default::default() };
		let err = decode_bencode_with(b"d1:ai1e1:ai2ee", &options).unwrap_err();
		assert_eq!(err, BencodeError::DuplicateKey { offset: 7, key: "a".to_string() });
	}

	//
	// Malformed Inputs: Test expected failures
	//

	#[test]
	fn test_decode_too_short() {
		assert_eq!(
			decode_bencode(b"").unwrap_err(),
			BencodeError::TruncatedInput { offset: 0, available: 0 }
		);
		assert_eq!(
			decode_bencode(b"5").unwrap_err(),
			BencodeError::TruncatedInput { offset: 0, available: 1 }
		);
	}

	#[test]
	fn test_decode_invalid_leading_token() {
		assert_eq!(
			decode_bencode(b"x42").unwrap_err(),
			BencodeError::InvalidLeadingToken { offset: 0, found: 'x' }
		);
	}

	#[test]
	fn test_decode_integer_missing_e() {
		assert_eq!(
			decode_bencode(b"i42").unwrap_err(),
			BencodeError::MissingTerminator { offset: 0, context: "integer" }
		);
	}

	#[test]
	fn test_decode_non_canonical_integers() {
		for input in [&b"i0123e"[..], b"i-0e", b"i-01e", b"i+1e", b"ie", b"i-e", b"i1.5e", b"i 1e"] {
			let err = decode_bencode(input).unwrap_err();
			assert!(
				matches!(err, BencodeError::MalformedInteger { .. }),
				"{:?} gave {:?}",
				String::from_utf8_lossy(input),
				err
			);
		}
	}

	#[test]
	fn test_decode_string_missing_colon() {
		let err = decode_bencode(b"5hello").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedLength { offset: 0, .. }));
		let err = decode_bencode(b"12").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedLength { offset: 0, .. }));
	}

	#[test]
	fn test_decode_string_too_short() {
		assert_eq!(
			decode_bencode(b"3:ab").unwrap_err(),
			BencodeError::LengthMismatch { offset: 0, expected: 3, available: 2 }
		);
	}

	#[test]
	fn test_decode_string_length_overflow() {
		let err = decode_bencode(b"99999999999999999999999999:a").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedLength { .. }));
	}

	#[test]
	fn test_decode_list_unclosed() {
		assert_eq!(
			decode_bencode(b"l4:spam").unwrap_err(),
			BencodeError::MissingTerminator { offset: 0, context: "list" }
		);
	}

	#[test]
	fn test_decode_dict_unclosed() {
		assert_eq!(
			decode_bencode(b"d3:foo4:spam").unwrap_err(),
			BencodeError::MissingTerminator { offset: 0, context: "dictionary" }
		);
	}

	#[test]
	fn test_decode_dict_key_not_string() {
		let err = decode_bencode(b"di42e4:spame").unwrap_err();
		assert!(matches!(err, BencodeError::MalformedLength { offset: 1, .. }));
	}

	#[test]
	fn test_decode_dict_key_not_utf8() {
		let err = decode_bencode(b"d2:\xc3\x28i1ee").unwrap_err();
		assert_eq!(
			err,
			BencodeError::InvalidMapKeyEncoding { offset: 1, key: vec![0xc3, 0x28] }
		);
	}

	#[test]
	fn test_decode_dict_missing_value() {
		let err = decode_bencode(b"d3:fooe").unwrap_err();
		assert_eq!(err, BencodeError::TruncatedInput { offset: 6, available: 1 });
	}

	#[test]
	fn test_nesting_limit() {
		let options = DecodeOptions { max_depth: 3, ..Default::default() };
		assert!(decode_bencode_with(b"llleee", &options).is_ok());
		assert_eq!(
			decode_bencode_with(b"lllleeee", &options).unwrap_err(),
			BencodeError::NestingTooDeep { offset: 3, max_depth: 3 }
		);
	}

	#[test]
	fn test_default_nesting_limit_stops_deep_input() {
		let mut input = vec![b'l'; 10_000];
		input.extend(std::iter::repeat(b'e').take(10_000));
		let err = decode_bencode(&input).unwrap_err();
		assert!(matches!(err, BencodeError::NestingTooDeep { max_depth: DEFAULT_MAX_DEPTH, .. }));
	}
}

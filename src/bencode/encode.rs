use super::BValue;

/// Encode a `BValue` back into a bencoded `Vec<u8>`.
///
/// Dict entries are written in ascending order of their raw key bytes, so
/// the output is canonical no matter how the map was built.
pub fn encode_bvalue(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	encode_into(value, &mut out);
	out
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: &BValue, out: &mut Vec<u8>) {
	match value {
		BValue::Integer(i) => {
			out.push(b'i');
			out.extend_from_slice(i.to_string().as_bytes());
			out.push(b'e');
		}
		BValue::ByteString(bytes) => encode_bytes(bytes, out),
		BValue::List(items) => {
			out.push(b'l');
			for item in items {
				encode_into(item, out);
			}
			out.push(b'e');
		}
		BValue::Dict(dict) => {
			out.push(b'd');
			// str ordering is byte-wise, which is what canonical form needs
			let mut entries: Vec<(&String, &BValue)> = dict.iter().collect();
			entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
			for (key, val) in entries {
				encode_bytes(key.as_bytes(), out);
				encode_into(val, out);
			}
			out.push(b'e');
		}
	}
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes for any string
	Integer(i128),
	List(Vec<BValue>),
	Dict(HashMap<String, BValue>) // keys are always UTF-8 in .torrent
}

impl BValue {
	/// Creates a byte string value from a UTF-8 string.
	pub fn string(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	pub fn as_integer(&self) -> Option<i128> {
		match self {
			BValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(b) => Some(b),
			_ => None,
		}
	}

	/// Returns the value as a UTF-8 string, if it is a byte string holding valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(l) => Some(l),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&HashMap<String, BValue>> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	/// Looks up `key` if this value is a dictionary.
	pub fn get(&self, key: &str) -> Option<&BValue> {
		self.as_dict()?.get(key)
	}

	/// Short name of the variant, used in diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			BValue::ByteString(_) => "byte string",
			BValue::Integer(_) => "integer",
			BValue::List(_) => "list",
			BValue::Dict(_) => "dictionary",
		}
	}
}

impl From<i128> for BValue {
	fn from(i: i128) -> Self {
		BValue::Integer(i)
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::string(s)
	}
}

impl From<Vec<u8>> for BValue {
	fn from(b: Vec<u8>) -> Self {
		BValue::ByteString(b)
	}
}

impl From<Vec<BValue>> for BValue {
	fn from(l: Vec<BValue>) -> Self {
		BValue::List(l)
	}
}

impl From<HashMap<String, BValue>> for BValue {
	fn from(d: HashMap<String, BValue>) -> Self {
		BValue::Dict(d)
	}
}

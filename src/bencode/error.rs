use thiserror::Error;

/// Failures raised while decoding bencode. Every variant carries the absolute
/// offset of the token that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
	#[error("Unexpected end of input at offset {offset}: {available} byte(s) left, a value needs at least 2")]
	TruncatedInput { offset: usize, available: usize },

	#[error("Invalid leading token {found:?} at offset {offset}: expected 'i', 'l', 'd' or a digit")]
	InvalidLeadingToken { offset: usize, found: char },

	#[error("Malformed string length at offset {offset}: {reason}")]
	MalformedLength { offset: usize, reason: String },

	#[error("String at offset {offset} declares {expected} byte(s) but only {available} remain")]
	LengthMismatch { offset: usize, expected: usize, available: usize },

	#[error("Missing 'e' terminating the {context} that starts at offset {offset}")]
	MissingTerminator { offset: usize, context: &'static str },

	#[error("Malformed integer at offset {offset}: {found:?}")]
	MalformedInteger { offset: usize, found: String },

	#[error("Dict key at offset {offset} is not valid UTF-8 (hex {})", hex::encode(.key))]
	InvalidMapKeyEncoding { offset: usize, key: Vec<u8> },

	#[error("Duplicate dict key {key:?} at offset {offset}")]
	DuplicateKey { offset: usize, key: String },

	#[error("Nesting deeper than {max_depth} levels at offset {offset}")]
	NestingTooDeep { offset: usize, max_depth: usize },
}

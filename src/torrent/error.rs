use thiserror::Error;

use crate::bencode::BencodeError;

/// Why a metainfo document was rejected. The first failing check wins;
/// no partial result is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("Bencode error: {0}")]
	Decode(#[from] BencodeError),

	#[error("Root of a metainfo document must be a dictionary, found {found}")]
	NotADocument { found: &'static str },

	#[error("Missing tracker entries: neither 'announce-list' nor 'announce' is present")]
	MissingTrackers,

	#[error("Invalid tracker entry{}: {reason}", describe_tracker_slot(.tier, .position))]
	InvalidTrackerEntry {
		tier: Option<usize>,
		position: Option<usize>,
		reason: String,
	},

	#[error("Missing 'info' dictionary")]
	MissingInfo,

	#[error("'info' must be a dictionary, found {found}")]
	InfoNotADictionary { found: &'static str },

	#[error("'info' has both 'length' and 'files' entries")]
	ConflictingContentFields,

	#[error("'length' must be a positive integer, found {found}")]
	InvalidLength { found: String },

	#[error("'files' must be a list, found {found}")]
	InvalidFileList { found: &'static str },

	#[error("Invalid file {file}{} in 'files': {reason}", describe_segment(.segment))]
	InvalidFileEntry {
		file: usize,
		segment: Option<usize>,
		reason: String,
	},

	#[error("'piece length' must be a positive integer, found {found}")]
	InvalidPieceLength { found: String },

	#[error("'pieces' must be a byte string, found {found}")]
	InvalidPieces { found: &'static str },

	#[error("'pieces' is {len} bytes long, which is not a multiple of {chunk_size}")]
	MisalignedChecksumBuffer { len: usize, chunk_size: usize },

	#[error("Invalid 'name': {reason}")]
	InvalidName { reason: String },
}

fn describe_tracker_slot(tier: &Option<usize>, position: &Option<usize>) -> String {
	match (*tier, *position) {
		(Some(t), Some(p)) => format!(" (tier {}, position {})", t, p),
		(Some(t), None) => format!(" (tier {})", t),
		_ => String::new(),
	}
}

fn describe_segment(segment: &Option<usize>) -> String {
	segment
		.map(|s| format!(", path segment {}", s))
		.unwrap_or_default()
}

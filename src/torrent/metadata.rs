use std::collections::{HashMap, HashSet};
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;

use crate::bencode::{decode_bencode_with, BValue, DecodeOptions};
use crate::torrent::error::ValidationError;
use crate::torrent::file_tree::{build_tree, preview_tree, FileTree};
use crate::torrent::infohash::{calculate_info_hash, InfoHash};
use crate::torrent::pieces::{iterate_pieces, PieceIter, CHUNK_SIZE};

/// Tracker URLs grouped by tier: outer order is priority, inner order is fallback.
pub type TrackerTiers = Vec<Vec<Url>>;

/// A file of a multi-file description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub path: Vec<String>, // non-empty, UTF-8 segments
    pub size: u64,
}

impl Content {
    /// The path segments joined with `/`.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLayout {
    /// One file of the given size.
    SingleFile(u64),
    /// A directory of files.
    MultiFile(Vec<Content>),
}

/// A validated metainfo (.torrent) document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaInfo {
    pub trackers: TrackerTiers,
    pub name: Option<String>,      // Name of the file or folder
    pub content: ContentLayout,
    pub piece_length: u64,         // Size of each piece
    pub pieces: Vec<u8>,           // concatenated SHA-1 piece hashes
    pub info_hash: InfoHash,
}

/// Parses and validates a metainfo document held entirely in memory.
pub fn load_document(source: &[u8]) -> Result<MetaInfo, ValidationError> {
    load_document_with(source, &DecodeOptions::default())
}

/// Same as [`load_document`], decoding with the given options.
///
/// Bytes after the root dictionary are ignored.
pub fn load_document_with(source: &[u8], options: &DecodeOptions) -> Result<MetaInfo, ValidationError> {
    match source.first() {
        None => return Err(ValidationError::NotADocument { found: "empty input" }),
        Some(b'd') => {}
        Some(&other) => return Err(ValidationError::NotADocument { found: leading_kind(other) }),
    }
    let (root, _consumed) = decode_bencode_with(source, options)?;
    MetaInfo::from_bvalue(&root)
}

impl MetaInfo {
    /// Creates a `MetaInfo` from a decoded document.
    ///
    /// Checks run in a fixed order (trackers, info, name, content, piece
    /// length, pieces) and the first failure is returned.
    pub fn from_bvalue(value: &BValue) -> Result<Self, ValidationError> {
        let root_dict = match value {
            BValue::Dict(m) => m,
            other => return Err(ValidationError::NotADocument { found: other.kind() }),
        };

        let trackers = resolve_trackers(root_dict)?;

        let info = root_dict.get("info").ok_or(ValidationError::MissingInfo)?;
        let info_dict = match info {
            BValue::Dict(m) => m,
            other => return Err(ValidationError::InfoNotADictionary { found: other.kind() }),
        };

        let name = parse_name(info_dict)?;
        let content = parse_content(info_dict)?;

        let piece_length = match info_dict.get("piece length") {
            Some(v) => positive_integer(v).ok_or_else(|| ValidationError::InvalidPieceLength { found: describe(v) })?,
            None => return Err(ValidationError::InvalidPieceLength { found: "nothing".to_string() }),
        };

        let pieces = match info_dict.get("pieces") {
            Some(BValue::ByteString(b)) => b,
            Some(other) => return Err(ValidationError::InvalidPieces { found: other.kind() }),
            None => return Err(ValidationError::InvalidPieces { found: "nothing" }),
        };
        if pieces.len() % CHUNK_SIZE != 0 {
            return Err(ValidationError::MisalignedChecksumBuffer {
                len: pieces.len(),
                chunk_size: CHUNK_SIZE,
            });
        }

        let info_hash = calculate_info_hash(info);

        Ok(MetaInfo {
            trackers,
            name,
            content,
            piece_length,
            pieces: pieces.clone(),
            info_hash,
        })
    }

    /// Total size of the described content in bytes.
    pub fn total_length(&self) -> u64 {
        match &self.content {
            ContentLayout::SingleFile(size) => *size,
            ContentLayout::MultiFile(files) => files.iter().fold(0u64, |acc, f| acc.saturating_add(f.size)),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len() / CHUNK_SIZE
    }

    /// Piece checksums in order, or last-to-first when `reverse`.
    pub fn piece_hashes(&self, reverse: bool) -> PieceIter<'_> {
        iterate_pieces(&self.pieces, CHUNK_SIZE, reverse)
    }

    /// Directory hierarchy of a multi-file description.
    pub fn file_tree(&self) -> Option<FileTree> {
        match &self.content {
            ContentLayout::SingleFile(_) => None,
            ContentLayout::MultiFile(files) => Some(build_tree(files)),
        }
    }
}

impl fmt::Display for MetaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "trackers:")?;
        for tier in &self.trackers {
            let urls: Vec<&str> = tier.iter().map(Url::as_str).collect();
            writeln!(f, "\t{}", urls.join("  "))?;
        }

        let name = self.name.as_deref().unwrap_or(".");
        writeln!(f, "content:")?;
        match &self.content {
            ContentLayout::SingleFile(size) => writeln!(f, "\t{} ({})", name, size)?,
            ContentLayout::MultiFile(files) => {
                writeln!(f, "\t{}/", name)?;
                for line in preview_tree(&build_tree(files), "\t") {
                    writeln!(f, "{}", line)?;
                }
            }
        }

        writeln!(f, "piece length: {}", self.piece_length)?;
        write!(f, "info hash: {}", STANDARD.encode(self.info_hash))
    }
}

/// Prefers the tiered `announce-list`, falling back to a single `announce` URL.
fn resolve_trackers(root: &HashMap<String, BValue>) -> Result<TrackerTiers, ValidationError> {
    if let Some(raw) = root.get("announce-list") {
        let tiers = raw.as_list().ok_or_else(|| ValidationError::InvalidTrackerEntry {
            tier: None,
            position: None,
            reason: format!("'announce-list' must be a list, found {}", raw.kind()),
        })?;

        return tiers
            .iter()
            .enumerate()
            .map(|(t, tier)| -> Result<Vec<Url>, ValidationError> {
                let entries = tier.as_list().ok_or_else(|| ValidationError::InvalidTrackerEntry {
                    tier: Some(t),
                    position: None,
                    reason: format!("a tier must be a list, found {}", tier.kind()),
                })?;
                entries
                    .iter()
                    .enumerate()
                    .map(|(p, entry)| parse_tracker(entry, t, p))
                    .collect()
            })
            .collect();
    }

    match root.get("announce") {
        Some(announce) => Ok(vec![vec![parse_tracker(announce, 0, 0)?]]),
        None => Err(ValidationError::MissingTrackers),
    }
}

fn parse_tracker(entry: &BValue, tier: usize, position: usize) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidTrackerEntry {
        tier: Some(tier),
        position: Some(position),
        reason,
    };

    let bytes = entry
        .as_bytes()
        .ok_or_else(|| invalid(format!("expected a byte string, found {}", entry.kind())))?;
    let text = std::str::from_utf8(bytes).map_err(|_| invalid("URL is not valid UTF-8".to_string()))?;
    Url::parse(text).map_err(|e| invalid(format!("{:?} is not a URL: {}", text, e)))
}

fn parse_name(info: &HashMap<String, BValue>) -> Result<Option<String>, ValidationError> {
    match info.get("name") {
        None => Ok(None),
        Some(BValue::ByteString(bytes)) => String::from_utf8(bytes.clone())
            .map(Some)
            .map_err(|_| ValidationError::InvalidName { reason: "not valid UTF-8".to_string() }),
        Some(other) => Err(ValidationError::InvalidName {
            reason: format!("expected a byte string, found {}", other.kind()),
        }),
    }
}

fn parse_content(info: &HashMap<String, BValue>) -> Result<ContentLayout, ValidationError> {
    match (info.get("length"), info.get("files")) {
        (Some(_), Some(_)) => Err(ValidationError::ConflictingContentFields),
        (Some(length), None) => positive_integer(length)
            .map(ContentLayout::SingleFile)
            .ok_or_else(|| ValidationError::InvalidLength { found: describe(length) }),
        // no 'length' means a multi-file description, even without 'files'
        (None, files) => parse_files(files).map(ContentLayout::MultiFile),
    }
}

fn parse_files(files: Option<&BValue>) -> Result<Vec<Content>, ValidationError> {
    let raw_files = match files {
        Some(BValue::List(list)) => list,
        Some(other) => return Err(ValidationError::InvalidFileList { found: other.kind() }),
        None => return Err(ValidationError::InvalidFileList { found: "nothing" }),
    };

    let mut seen = HashSet::new();
    let mut content = Vec::with_capacity(raw_files.len());
    for (i, entry) in raw_files.iter().enumerate() {
        let file = parse_file_entry(i, entry)?;
        if !seen.insert(file.path.clone()) {
            return Err(ValidationError::InvalidFileEntry {
                file: i,
                segment: None,
                reason: format!("duplicate path {}", file.path_string()),
            });
        }
        content.push(file);
    }
    Ok(content)
}

fn parse_file_entry(index: usize, entry: &BValue) -> Result<Content, ValidationError> {
    let invalid = |segment: Option<usize>, reason: String| ValidationError::InvalidFileEntry {
        file: index,
        segment,
        reason,
    };

    let dict = entry
        .as_dict()
        .ok_or_else(|| invalid(None, format!("expected a dictionary, found {}", entry.kind())))?;

    let size = match dict.get("length") {
        Some(v) => positive_integer(v).ok_or_else(|| {
            invalid(None, format!("'length' must be a positive 64-bit integer, found {}", describe(v)))
        })?,
        None => return Err(invalid(None, "missing 'length'".to_string())),
    };

    let raw_path = match dict.get("path") {
        Some(BValue::List(segments)) => segments,
        Some(other) => return Err(invalid(None, format!("'path' must be a list, found {}", other.kind()))),
        None => return Err(invalid(None, "missing 'path'".to_string())),
    };
    if raw_path.is_empty() {
        return Err(invalid(None, "'path' is empty".to_string()));
    }

    let path = raw_path
        .iter()
        .enumerate()
        .map(|(j, segment)| parse_path_segment(segment).map_err(|reason| invalid(Some(j), reason)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Content { path, size })
}

fn parse_path_segment(segment: &BValue) -> Result<String, String> {
    let bytes = segment
        .as_bytes()
        .ok_or_else(|| format!("expected a byte string, found {}", segment.kind()))?;
    if bytes.is_empty() {
        return Err("empty path segment".to_string());
    }
    let text = std::str::from_utf8(bytes).map_err(|_| "path segment is not valid UTF-8".to_string())?;
    if text.contains('/') {
        return Err(format!("path segment {:?} contains '/'", text));
    }
    Ok(text.to_string())
}

fn positive_integer(value: &BValue) -> Option<u64> {
    match value {
        BValue::Integer(i) if *i > 0 => u64::try_from(*i).ok(),
        _ => None,
    }
}

/// Names the value a leading byte would start.
fn leading_kind(byte: u8) -> &'static str {
    match byte {
        b'i' => "integer",
        b'l' => "list",
        b'd' => "dictionary",
        b'0'..=b'9' => "byte string",
        _ => "an unknown token",
    }
}

/// Renders an offending value for an error message.
fn describe(value: &BValue) -> String {
    match value {
        BValue::Integer(i) => i.to_string(),
        other => other.kind().to_string(),
    }
}

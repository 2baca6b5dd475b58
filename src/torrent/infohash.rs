// infohash.rs
use crate::bencode::{encode_bvalue, BValue};

use sha1::{Sha1, Digest};

/// Identity of a content description: the SHA-1 of the canonical `info` encoding.
pub type InfoHash = [u8; 20];

/// Hashes the canonical re-encoding of an `info` dictionary.
///
/// Key order in the source bytes does not matter: the encoder always
/// writes dict keys sorted.
pub fn calculate_info_hash(info: &BValue) -> InfoHash {
    let encoded = encode_bvalue(info);

    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let result = hasher.finalize();

    let mut hash_bytes = [0u8; 20];
    hash_bytes.copy_from_slice(&result);
    hash_bytes
}

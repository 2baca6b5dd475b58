// lib.rs - Library interface for the bencode / metainfo inspector

pub mod bencode;
pub mod config;
pub mod engine;
pub mod file_io;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::{decode_bencode, decode_bencode_with, encode_bvalue, BValue, BencodeError, DecodeOptions};
pub use config::Config;
pub use torrent::{
    build_tree, iterate_pieces, load_document, Content, ContentLayout, FileTree, MetaInfo, ValidationError,
};

pub mod error;
pub mod file_tree;
pub mod infohash;
pub mod metadata;
pub mod pieces;

pub use error::ValidationError;
pub use file_tree::{build_tree, preview_tree, FileNode, FileTree};
pub use infohash::{calculate_info_hash, InfoHash};
pub use metadata::{load_document, load_document_with, Content, ContentLayout, MetaInfo, TrackerTiers};
pub use pieces::{get_piece, iterate_pieces, PieceIter, CHUNK_SIZE};

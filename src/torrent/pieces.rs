use std::iter::FusedIterator;

/// Width of one piece checksum: a SHA-1 digest.
pub const CHUNK_SIZE: usize = 20;

/// Returns the checksum chunk at `idx`, counting from the back when `idx` is
/// negative (`-1` is the last chunk).
///
/// Out-of-range indices are clamped to the buffer like slice ranges would be,
/// so a short final chunk is returned as-is and an empty result means there is
/// no such chunk.
pub fn get_piece(pieces: &[u8], idx: isize, chunk_size: usize) -> Option<&[u8]> {
	let len = pieces.len();
	let (start, end) = if idx >= 0 {
		let start = chunk_size.checked_mul(idx.unsigned_abs())?.min(len);
		(start, start.saturating_add(chunk_size).min(len))
	} else {
		let back = idx.unsigned_abs();
		let end = len.saturating_sub((back - 1).saturating_mul(chunk_size));
		let start = len.saturating_sub(back.saturating_mul(chunk_size));
		(start, end)
	};

	let chunk = &pieces[start..end];
	if chunk.is_empty() {
		None
	} else {
		Some(chunk)
	}
}

/// Walks the checksum chunks front-to-back, or back-to-front when `reverse`.
///
/// The walk ends the first time [`get_piece`] finds nothing. Call again to
/// start over.
pub fn iterate_pieces(pieces: &[u8], chunk_size: usize, reverse: bool) -> PieceIter<'_> {
	let (next, step) = if reverse { (-1, -1) } else { (0, 1) };
	PieceIter {
		pieces,
		chunk_size,
		next,
		step,
		done: false,
	}
}

#[derive(Debug, Clone)]
pub struct PieceIter<'a> {
	pieces: &'a [u8],
	chunk_size: usize,
	next: isize,
	step: isize,
	done: bool,
}

impl<'a> Iterator for PieceIter<'a> {
	type Item = &'a [u8];

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match get_piece(self.pieces, self.next, self.chunk_size) {
			Some(chunk) => {
				self.next += self.step;
				Some(chunk)
			}
			None => {
				self.done = true;
				None
			}
		}
	}
}

impl FusedIterator for PieceIter<'_> {}

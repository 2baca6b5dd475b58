// src/file_io.rs
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Reads all of `path`, or of stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
	let mut buf = Vec::new();
	match path {
		Some(path) => {
			File::open(path)
				.with_context(|| format!("I/O error while opening {}", path.display()))?
				.read_to_end(&mut buf)
				.with_context(|| format!("I/O error while reading {}", path.display()))?;
		}
		None => {
			io::stdin()
				.lock()
				.read_to_end(&mut buf)
				.context("I/O error while reading stdin")?;
		}
	}
	Ok(buf)
}

/// Opens `path` for writing (truncating it), or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
	match path {
		Some(path) => {
			let file = File::create(path)
				.with_context(|| format!("I/O error while creating {}", path.display()))?;
			Ok(Box::new(BufWriter::new(file)))
		}
		None => Ok(Box::new(BufWriter::new(io::stdout()))),
	}
}

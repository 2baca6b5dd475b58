// src/engine.rs
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, warn};
use std::io::Write;
use std::path::PathBuf;

use crate::bencode::{bvalue_to_json, decode_bencode_with, write_json, DecodeOptions};
use crate::config::Config;
use crate::file_io;
use crate::torrent::load_document_with;

#[derive(Debug, Parser)]
#[command(name = "bitmeta", version, about = "Inspect bencoded data and metainfo (.torrent) files")]
pub struct Cli {
    /// TOML config file (defaults to ./bitmeta.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate bencode into JSON
    Decode {
        /// Bencode file (defaults to stdin)
        #[arg(short, long)]
        infile: Option<PathBuf>,
        /// JSON file (defaults to stdout)
        #[arg(short, long)]
        outfile: Option<PathBuf>,
        /// Pretty-print with this many spaces of indentation
        #[arg(long)]
        indent: Option<usize>,
        /// Escape every non-ASCII character
        #[arg(long, conflicts_with = "no_ensure_ascii")]
        ensure_ascii: bool,
        /// Write non-ASCII characters as UTF-8
        #[arg(long)]
        no_ensure_ascii: bool,
    },
    /// Show trackers, content layout, piece length and info hash of a metainfo file
    Info {
        /// Metainfo file (defaults to stdin)
        #[arg(short, long)]
        infile: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        outfile: Option<PathBuf>,
    },
    /// Print the piece hashes of a metainfo file, one per line in hex
    Pieces {
        /// Metainfo file (defaults to stdin)
        #[arg(short, long)]
        infile: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        outfile: Option<PathBuf>,
        /// Start from the last piece
        #[arg(long)]
        reverse: bool,
    },
}

pub fn use_command(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let options = config.decode_options();

    match cli.command {
        Command::Decode { infile, outfile, indent, ensure_ascii, no_ensure_ascii } => {
            let input = file_io::read_input(infile.as_deref())?;
            let out = file_io::open_output(outfile.as_deref())?;
            let indent = indent.or(config.json_indent);
            let ensure_ascii = if no_ensure_ascii {
                false
            } else {
                ensure_ascii || config.ensure_ascii
            };
            convert_bencode(&input, &options, indent, ensure_ascii, out)
        }
        Command::Info { infile, outfile } => {
            let input = file_io::read_input(infile.as_deref())?;
            let out = file_io::open_output(outfile.as_deref())?;
            display_metainfo(&input, &options, out)
        }
        Command::Pieces { infile, outfile, reverse } => {
            let input = file_io::read_input(infile.as_deref())?;
            let out = file_io::open_output(outfile.as_deref())?;
            list_pieces(&input, &options, reverse, out)
        }
    }
}

/// Decodes one bencoded value from `input` and writes it to `out` as JSON.
pub fn convert_bencode<W: Write>(
    input: &[u8],
    options: &DecodeOptions,
    indent: Option<usize>,
    ensure_ascii: bool,
    mut out: W,
) -> anyhow::Result<()> {
    debug!("decoding {} bytes of bencode", input.len());
    let (value, consumed) = decode_bencode_with(input, options).context("invalid bencode")?;
    if consumed < input.len() {
        warn!(
            "ignoring {} trailing byte(s) after offset {}",
            input.len() - consumed,
            consumed
        );
    }

    write_json(&bvalue_to_json(&value), indent, ensure_ascii, &mut out)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Validates a metainfo document and writes its summary to `out`.
pub fn display_metainfo<W: Write>(input: &[u8], options: &DecodeOptions, mut out: W) -> anyhow::Result<()> {
    debug!("loading {} bytes of metainfo", input.len());
    let metainfo = load_document_with(input, options).context("invalid metainfo")?;
    debug!("info hash {}", hex::encode(metainfo.info_hash));

    writeln!(out, "{}", metainfo)?;
    out.flush()?;
    Ok(())
}

/// Writes the hex piece hashes of a metainfo document to `out`.
pub fn list_pieces<W: Write>(input: &[u8], options: &DecodeOptions, reverse: bool, mut out: W) -> anyhow::Result<()> {
    let metainfo = load_document_with(input, options).context("invalid metainfo")?;
    debug!("{} piece(s), reverse = {}", metainfo.piece_count(), reverse);

    for piece_hash in metainfo.piece_hashes(reverse) {
        writeln!(out, "{}", hex::encode(piece_hash))?;
    }
    out.flush()?;
    Ok(())
}

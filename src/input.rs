//! Opening input and output streams by path.
//!
//! `-` selects stdin or stdout. Input paths ending in `.gz` are decompressed
//! on the fly. Streams are closed when the returned box is dropped.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use tracing::debug;

const STDIO: &str = "-";

/// Opens `path` for reading.
pub fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == STDIO {
        debug!("Reading contributions from stdin");
        return Ok(Box::new(std::io::stdin().lock()));
    }

    let file = File::open(path).with_context(|| format!("failed to open input '{path}'"))?;
    let reader = BufReader::new(file);

    if Path::new(path).extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!(path, "Reading gzip-compressed contributions");
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        debug!(path, "Reading contributions");
        Ok(Box::new(reader))
    }
}

/// Creates (or truncates) `path` for writing.
pub fn create_output(path: &str) -> Result<Box<dyn Write>> {
    if path == STDIO {
        return Ok(Box::new(std::io::stdout().lock()));
    }

    let file = File::create(path).with_context(|| format!("failed to create output '{path}'"))?;
    debug!(path, "Writing output");
    Ok(Box::new(BufWriter::new(file)))
}

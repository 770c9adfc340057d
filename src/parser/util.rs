//! Utility functions for file parsing.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::Error;

/// Opens a path as a buffered reader, decoding gzip transparently.
///
/// Files ending in ".gz" are wrapped in a GzDecoder; everything else is
/// read as-is.
pub fn open_buffered(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Opens a path for record parsing, mapping IO failures to [`Error::Io`].
pub fn open_records(path: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    open_buffered(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Strips a trailing newline (and carriage return) from a line buffer.
pub fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

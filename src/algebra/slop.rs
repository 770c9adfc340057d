//! Windowed expansion against a chromosome-sizes table.

use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;

use super::{ensure_sorted, Span};
use crate::error::{Error, Result};
use crate::parser::util::{open_records, trim_line_end};

/// Chromosome lengths for one assembly, loaded from a `<assembly>.genome`
/// TSV of `chrom\tlength` rows.
#[derive(Debug, Clone, Default)]
pub struct ChromSizes {
    sizes: AHashMap<String, u64>,
}

impl ChromSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chrom: impl Into<String>, length: u64) {
        self.sizes.insert(chrom.into(), length);
    }

    pub fn get(&self, chrom: &str) -> Option<u64> {
        self.sizes.get(chrom).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Load a sizes table. Lines are `chrom\tlength`; comments and empty
    /// lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = open_records(path)?;
        Self::parse(reader, path)
    }

    fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut table = ChromSizes::new();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let line = trim_line_end(&line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = |reason: String| Error::MalformedRecord {
                file: path.to_path_buf(),
                line: idx + 1,
                reason,
            };

            let mut fields = line.split('\t');
            let chrom = fields
                .next()
                .ok_or_else(|| malformed("missing chromosome".to_string()))?;
            let length: u64 = fields
                .next()
                .ok_or_else(|| malformed("missing length".to_string()))?
                .parse()
                .map_err(|_| malformed(format!("non-integer length for {}", chrom)))?;
            table.insert(chrom, length);
        }

        Ok(table)
    }
}

/// Expand every record by `window` bases on both sides, clamped to
/// `[0, chrom_length]`.
///
/// `window = 0` is a no-op apart from clamping the end to the chromosome
/// length. Fails with [`Error::MissingChromosome`] when a record's
/// chromosome is absent from the table.
pub fn slop<T: Span + Clone>(track: Vec<T>, window: u64, sizes: &ChromSizes) -> Result<Vec<T>> {
    let track = ensure_sorted(track);

    let mut expanded = Vec::with_capacity(track.len());
    for record in &track {
        let chrom_len = sizes
            .get(record.chrom())
            .ok_or_else(|| Error::MissingChromosome(record.chrom().to_string()))?;
        let start = record.start().saturating_sub(window);
        let end = record.end().saturating_add(window).min(chrom_len);
        expanded.push(record.with_range(start, end));
    }

    Ok(expanded)
}

//! BED codec.
//!
//! Parses BED3/6/9/12 lines into records with 0-based half-open coordinates
//! and emits them back, tab-separated and byte-for-byte reproducible.
//! Columns beyond the third are kept verbatim as strings; the score column
//! in particular is never reinterpreted numerically.

use std::io::BufRead;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::util::{open_records, trim_line_end};
use crate::types::Strand;

/// Column widths accepted by the parser.
const VALID_WIDTHS: [usize; 4] = [3, 6, 9, 12];

/// A single BED record.
///
/// `extra` holds columns 4.. verbatim, so a BED6 record has
/// `extra = [name, score, strand]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub extra: Vec<String>,
}

impl BedRecord {
    /// A minimal BED3 record.
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        BedRecord {
            chrom: chrom.into(),
            start,
            end,
            extra: Vec::new(),
        }
    }

    /// The name column, if present.
    pub fn name(&self) -> Option<&str> {
        self.extra.first().map(String::as_str)
    }

    /// The score column, verbatim, if present.
    pub fn score(&self) -> Option<&str> {
        self.extra.get(1).map(String::as_str)
    }

    /// The strand column, parsed; absent or unparsable columns count as
    /// unstranded.
    pub fn strand(&self) -> Strand {
        self.extra
            .get(2)
            .and_then(|s| s.parse().ok())
            .unwrap_or(Strand::Unknown)
    }

    /// Emit the record as a tab-separated BED line without trailing newline.
    pub fn to_line(&self) -> String {
        let mut line = format!("{}\t{}\t{}", self.chrom, self.start, self.end);
        for field in &self.extra {
            line.push('\t');
            line.push_str(field);
        }
        line
    }
}

/// Parse a single BED line.
///
/// `file` and `line_no` feed the [`Error::MalformedRecord`] diagnostics.
pub fn parse_bed_line(line: &str, file: &Path, line_no: usize) -> Result<BedRecord> {
    let malformed = |reason: String| Error::MalformedRecord {
        file: file.to_path_buf(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if !VALID_WIDTHS.contains(&fields.len()) {
        return Err(malformed(format!(
            "expected 3, 6, 9 or 12 columns, got {}",
            fields.len()
        )));
    }

    let start: u64 = fields[1]
        .parse()
        .map_err(|_| malformed(format!("non-integer start: {:?}", fields[1])))?;
    let end: u64 = fields[2]
        .parse()
        .map_err(|_| malformed(format!("non-integer end: {:?}", fields[2])))?;
    if start > end {
        return Err(malformed(format!("start > end: {} > {}", start, end)));
    }

    Ok(BedRecord {
        chrom: fields[0].to_string(),
        start,
        end,
        extra: fields[3..].iter().map(|s| s.to_string()).collect(),
    })
}

/// Parse a BED file (optionally gzip-compressed) into records.
///
/// Comment lines (`#`) and empty lines are skipped; any other malformed
/// line aborts with [`Error::MalformedRecord`].
pub fn parse_bed(path: &Path) -> Result<Vec<BedRecord>> {
    let reader = open_records(path)?;
    parse_bed_reader(reader, path)
}

fn parse_bed_reader<R: BufRead>(reader: R, path: &Path) -> Result<Vec<BedRecord>> {
    let mut records = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = trim_line_end(&line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        records.push(parse_bed_line(line, path, idx + 1)?);
    }

    Ok(records)
}

/// Project a record to exactly six columns.
///
/// Records wider than six columns are truncated; BED3 records are padded
/// with `name="."`, `score="0"`, `strand="."`. Idempotent.
pub fn project_bed6(record: &BedRecord) -> BedRecord {
    let mut extra: Vec<String> = record.extra.iter().take(3).cloned().collect();
    let defaults = [".", "0", "."];
    while extra.len() < 3 {
        extra.push(defaults[extra.len()].to_string());
    }

    BedRecord {
        chrom: record.chrom.clone(),
        start: record.start,
        end: record.end,
        extra,
    }
}

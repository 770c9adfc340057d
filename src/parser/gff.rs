//! GFF3 codec.
//!
//! Parses nine-column GFF3 region files into records with 0-based half-open
//! coordinates (the source convention, 1-based inclusive, is restored on
//! emit). The attribute column is kept as an ordered key/value map so that
//! emission reproduces the input order.

use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::util::{open_records, trim_line_end};
use crate::types::Strand;

/// A single GFF3 record.
#[derive(Debug, Clone, PartialEq)]
pub struct GffRecord {
    pub chrom: String,
    pub source: String,
    pub feature: String,
    /// 0-based half-open start.
    pub start: u64,
    /// 0-based half-open end.
    pub end: u64,
    pub score: String,
    pub strand: Strand,
    pub frame: String,
    /// Attribute column, order-preserving. `ID` carries the gene id.
    pub attributes: IndexMap<String, String>,
}

impl GffRecord {
    /// The gene identifier from the `ID` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("ID").map(String::as_str)
    }

    /// Emit the attribute column in input order.
    pub fn attributes_column(&self) -> String {
        if self.attributes.is_empty() {
            return ".".to_string();
        }
        self.attributes
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else {
                    format!("{}={}", key, value)
                }
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Emit the record as a tab-separated GFF3 line without trailing
    /// newline, restoring 1-based inclusive coordinates.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.source,
            self.feature,
            self.start + 1,
            self.end,
            self.score,
            self.strand,
            self.frame,
            self.attributes_column()
        )
    }
}

/// Parse the attribute column into an ordered map.
///
/// Entries are `key=value` separated by `;`; bare keys are kept with an
/// empty value. A lone `.` means no attributes.
pub fn parse_attributes(column: &str) -> IndexMap<String, String> {
    let mut attributes = IndexMap::new();
    if column == "." {
        return attributes;
    }

    for entry in column.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('=') {
            Some((key, value)) => {
                attributes.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                attributes.insert(entry.to_string(), String::new());
            }
        }
    }

    attributes
}

/// Parse a single GFF3 line.
pub fn parse_gff_line(line: &str, file: &Path, line_no: usize) -> Result<GffRecord> {
    let malformed = |reason: String| Error::MalformedRecord {
        file: file.to_path_buf(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(malformed(format!("expected 9 columns, got {}", fields.len())));
    }

    let start: u64 = fields[3]
        .parse()
        .map_err(|_| malformed(format!("non-integer start: {:?}", fields[3])))?;
    let end: u64 = fields[4]
        .parse()
        .map_err(|_| malformed(format!("non-integer end: {:?}", fields[4])))?;
    if start < 1 {
        return Err(malformed("GFF3 coordinates are 1-based".to_string()));
    }
    if start > end {
        return Err(malformed(format!("start > end: {} > {}", start, end)));
    }

    let strand: Strand = fields[6]
        .parse()
        .map_err(|_| malformed(format!("invalid strand: {:?}", fields[6])))?;

    Ok(GffRecord {
        chrom: fields[0].to_string(),
        source: fields[1].to_string(),
        feature: fields[2].to_string(),
        start: start - 1,
        end,
        score: fields[5].to_string(),
        strand,
        frame: fields[7].to_string(),
        attributes: parse_attributes(fields[8]),
    })
}

/// Parse a GFF3 file (optionally gzip-compressed) into records.
///
/// Comment lines (`#`, which covers `##` directives) and empty lines are
/// skipped; malformed lines abort with [`Error::MalformedRecord`].
pub fn parse_gff(path: &Path) -> Result<Vec<GffRecord>> {
    let reader = open_records(path)?;
    parse_gff_reader(reader, path)
}

fn parse_gff_reader<R: BufRead>(reader: R, path: &Path) -> Result<Vec<GffRecord>> {
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
        records.push(parse_gff_line(line, path, idx + 1)?);
    }

    Ok(records)
}

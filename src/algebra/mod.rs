//! Interval-set algebra over sorted record streams.
//!
//! Every operator consumes streams sorted by `(chrom, start, end)` and
//! produces sorted streams; unsorted inputs are sorted first with a stable
//! sort so that equal keys keep their input order. All operators are pure
//! functions of their inputs. Ordering ties across input streams are broken
//! by the original stream index.

pub mod intersect;
pub mod slop;
pub mod subtract;

pub use intersect::{intersect_all, intersect_any, intersect_pairs, intersect_segments};
pub use slop::{slop, ChromSizes};
pub use subtract::subtract;

use std::cmp::Ordering;

use crate::parser::bed::BedRecord;
use crate::parser::gff::GffRecord;
use crate::types::Strand;

/// Uniform interval view over the record types that flow through the
/// algebra: annotated regions (GFF3) and regulator sites (BED).
pub trait Span {
    fn chrom(&self) -> &str;
    fn start(&self) -> u64;
    fn end(&self) -> u64;
    fn strand(&self) -> Strand;

    /// A copy of the record with replaced coordinates, all other fields
    /// preserved.
    fn with_range(&self, start: u64, end: u64) -> Self
    where
        Self: Sized;
}

impl Span for BedRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn strand(&self) -> Strand {
        BedRecord::strand(self)
    }

    fn with_range(&self, start: u64, end: u64) -> Self {
        BedRecord {
            start,
            end,
            ..self.clone()
        }
    }
}

impl Span for GffRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn strand(&self) -> Strand {
        self.strand
    }

    fn with_range(&self, start: u64, end: u64) -> Self {
        GffRecord {
            start,
            end,
            ..self.clone()
        }
    }
}

/// Stream ordering: `(chrom, start, end)` lexicographic.
pub fn span_cmp<A: Span, B: Span>(a: &A, b: &B) -> Ordering {
    a.chrom()
        .cmp(b.chrom())
        .then(a.start().cmp(&b.start()))
        .then(a.end().cmp(&b.end()))
}

/// Whether two spans overlap, half-open and strand-insensitive.
pub fn overlaps<A: Span, B: Span>(a: &A, b: &B) -> bool {
    a.chrom() == b.chrom() && a.start() < b.end() && b.start() < a.end()
}

fn is_sorted<T: Span>(track: &[T]) -> bool {
    track.windows(2).all(|w| span_cmp(&w[0], &w[1]) != Ordering::Greater)
}

/// Sort a stream if it is not already sorted. The sort is stable, so equal
/// keys keep their input order.
pub fn ensure_sorted<T: Span>(mut track: Vec<T>) -> Vec<T> {
    if !is_sorted(&track) {
        track.sort_by(span_cmp);
    }
    track
}

/// Multiway merge of sorted streams into one sorted stream.
///
/// No coordinate merging happens: the result has exactly the records of all
/// inputs, duplicates preserved. Ties are broken by stream index, then by
/// position within the stream.
pub fn union<T: Span + Clone>(tracks: Vec<Vec<T>>) -> Vec<T> {
    let tracks: Vec<Vec<T>> = tracks.into_iter().map(ensure_sorted).collect();
    let total: usize = tracks.iter().map(Vec::len).sum();

    let mut merged = Vec::with_capacity(total);
    let mut heads = vec![0usize; tracks.len()];

    // The stream count is the regulator count of a query, so a linear scan
    // over the heads is cheaper than a heap here.
    loop {
        let mut best: Option<usize> = None;
        for (idx, track) in tracks.iter().enumerate() {
            if heads[idx] >= track.len() {
                continue;
            }
            best = match best {
                None => Some(idx),
                Some(current)
                    if span_cmp(&track[heads[idx]], &tracks[current][heads[current]])
                        == Ordering::Less =>
                {
                    Some(idx)
                }
                Some(current) => Some(current),
            };
        }
        match best {
            Some(idx) => {
                merged.push(tracks[idx][heads[idx]].clone());
                heads[idx] += 1;
            }
            None => break,
        }
    }

    merged
}

/// Collapse overlapping and book-ended records into plain BED3 spans.
///
/// Not used by the query joins; kept for codec round-trips and track
/// normalisation.
pub fn merge_adjacent<T: Span>(track: &[T]) -> Vec<BedRecord> {
    let sorted = {
        let mut refs: Vec<&T> = track.iter().collect();
        refs.sort_by(|a, b| span_cmp(*a, *b));
        refs
    };

    let mut merged: Vec<BedRecord> = Vec::new();
    for record in sorted {
        match merged.last_mut() {
            Some(last)
                if last.chrom == record.chrom() && record.start() <= last.end =>
            {
                last.end = last.end.max(record.end());
            }
            _ => merged.push(BedRecord::new(
                record.chrom().to_string(),
                record.start(),
                record.end(),
            )),
        }
    }

    merged
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    pub fn bed(chrom: &str, start: u64, end: u64) -> BedRecord {
        BedRecord::new(chrom, start, end)
    }

    pub fn bed6(chrom: &str, start: u64, end: u64, name: &str) -> BedRecord {
        BedRecord {
            chrom: chrom.to_string(),
            start,
            end,
            extra: vec![name.to_string(), "0".to_string(), "+".to_string()],
        }
    }

    pub fn coords(track: &[BedRecord]) -> Vec<(u64, u64)> {
        track.iter().map(|r| (r.start, r.end)).collect()
    }
}

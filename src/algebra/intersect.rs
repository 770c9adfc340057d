//! Overlap operators.
//!
//! All operators index the right-hand stream per chromosome and sweep the
//! left-hand stream through it. The index keeps the maximum interval length
//! per chromosome so the sweep can binary-search a safe start position
//! instead of scanning from the beginning.

use ahash::AHashMap;

use super::{ensure_sorted, span_cmp, Span};

struct Group<'a, T> {
    records: Vec<&'a T>,
    max_len: u64,
}

/// Per-chromosome overlap index over a record stream.
pub struct ChromIndex<'a, T> {
    groups: AHashMap<&'a str, Group<'a, T>>,
}

impl<'a, T: Span> ChromIndex<'a, T> {
    /// Build an index over `track`. The input need not be sorted; groups
    /// are sorted internally with stable ties.
    pub fn build(track: &'a [T]) -> Self {
        let mut groups: AHashMap<&'a str, Group<'a, T>> = AHashMap::new();

        for record in track {
            let group = groups.entry(record.chrom()).or_insert_with(|| Group {
                records: Vec::new(),
                max_len: 0,
            });
            group.records.push(record);
            group.max_len = group.max_len.max(record.end() - record.start());
        }

        for group in groups.values_mut() {
            group.records.sort_by(|a, b| span_cmp(*a, *b));
        }

        ChromIndex { groups }
    }

    /// All records overlapping `span`, in `(start, end, input index)` order.
    pub fn overlapping<S: Span>(&self, span: &S) -> Vec<&'a T> {
        let Some(group) = self.groups.get(span.chrom()) else {
            return Vec::new();
        };

        // No record starting before this point can reach span.start().
        let search_start = span.start().saturating_sub(group.max_len);
        let from = group
            .records
            .partition_point(|record| record.start() < search_start);

        let mut found = Vec::new();
        for record in &group.records[from..] {
            if record.start() >= span.end() {
                break;
            }
            if record.end() > span.start() {
                found.push(*record);
            }
        }
        found
    }

    /// Whether any record overlaps `span`.
    pub fn has_overlap<S: Span>(&self, span: &S) -> bool {
        !self.overlapping(span).is_empty()
    }
}

/// `intersect -u`: the records of `a` that overlap at least one record of
/// `b`, each emitted at most once.
pub fn intersect_any<A, B>(a: Vec<A>, b: &[B]) -> Vec<A>
where
    A: Span + Clone,
    B: Span,
{
    let a = ensure_sorted(a);
    let index = ChromIndex::build(b);
    a.into_iter().filter(|record| index.has_overlap(record)).collect()
}

/// Conjunction: the records of `a` that overlap every one of the given
/// streams. Implemented as a left fold of [`intersect_any`].
pub fn intersect_all<A, B>(a: Vec<A>, tracks: &[Vec<B>]) -> Vec<A>
where
    A: Span + Clone,
    B: Span,
{
    tracks
        .iter()
        .fold(a, |acc, track| intersect_any(acc, track))
}

/// Segment intersection: for every overlapping pair, the `a` record with
/// its coordinates truncated to the overlap. An `a` record overlapping k
/// records of `b` is emitted k times.
pub fn intersect_segments<A, B>(a: Vec<A>, b: &[B]) -> Vec<A>
where
    A: Span + Clone,
    B: Span,
{
    let a = ensure_sorted(a);
    let index = ChromIndex::build(b);

    let mut segments = Vec::new();
    for record in &a {
        for hit in index.overlapping(record) {
            let start = record.start().max(hit.start());
            let end = record.end().min(hit.end());
            segments.push(record.with_range(start, end));
        }
    }

    // Truncation can reorder records that started before each other.
    ensure_sorted(segments)
}

/// `intersect -wa -wb`: every overlapping pair as `(a, b)` clones, ordered
/// by the `a` stream with witnesses in index order.
pub fn intersect_pairs<A, B>(a: Vec<A>, b: &[B]) -> Vec<(A, B)>
where
    A: Span + Clone,
    B: Span + Clone,
{
    let a = ensure_sorted(a);
    let index = ChromIndex::build(b);

    let mut pairs = Vec::new();
    for record in &a {
        for hit in index.overlapping(record) {
            pairs.push((record.clone(), hit.clone()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::parser::bed::BedRecord;

    #[test]
    fn test_intersect_any_u_mode() {
        let regions = vec![bed("chr1", 0, 1000), bed("chr1", 2000, 3000)];
        // Two sites in the first region must not duplicate it.
        let sites = vec![
            bed("chr1", 250, 260),
            bed("chr1", 400, 410),
            bed("chr1", 5000, 5010),
        ];
        let result = intersect_any(regions, &sites);
        assert_eq!(coords(&result), vec![(0, 1000)]);
    }

    #[test]
    fn test_intersect_any_every_emitted_record_overlaps() {
        let regions = vec![
            bed("chr1", 0, 100),
            bed("chr1", 200, 300),
            bed("chr2", 0, 100),
        ];
        let sites = vec![bed("chr1", 250, 260), bed("chr2", 50, 60)];
        let index = ChromIndex::build(&sites);
        for record in intersect_any(regions, &sites) {
            assert!(index.has_overlap(&record));
        }
    }

    #[test]
    fn test_intersect_any_empty_b() {
        let regions = vec![bed("chr1", 0, 100)];
        let sites: Vec<BedRecord> = vec![];
        assert!(intersect_any(regions, &sites).is_empty());
    }

    #[test]
    fn test_intersect_all_conjunction() {
        let regions = vec![bed("chr1", 0, 1000), bed("chr1", 2000, 3000)];
        let first = vec![bed("chr1", 250, 260), bed("chr1", 2350, 2360)];
        let second = vec![bed("chr1", 255, 265)];
        // Only the first region overlaps both streams.
        let result = intersect_all(regions, &[first, second]);
        assert_eq!(coords(&result), vec![(0, 1000)]);
    }

    #[test]
    fn test_intersect_all_vacuous_conjunction() {
        let regions = vec![bed("chr1", 0, 1000)];
        let tracks: Vec<Vec<BedRecord>> = vec![];
        let result = intersect_all(regions.clone(), &tracks);
        assert_eq!(coords(&result), coords(&regions));
    }

    #[test]
    fn test_intersect_segments_truncates() {
        let regions = vec![bed("chr1", 0, 1000)];
        let sites = vec![bed("chr1", 250, 260)];
        let result = intersect_segments(regions, &sites);
        assert_eq!(coords(&result), vec![(250, 260)]);
    }

    #[test]
    fn test_intersect_segments_one_row_per_overlap() {
        let regions = vec![bed("chr1", 0, 1000)];
        let sites = vec![bed("chr1", 100, 200), bed("chr1", 900, 1100)];
        let result = intersect_segments(regions, &sites);
        assert_eq!(coords(&result), vec![(100, 200), (900, 1000)]);
    }

    #[test]
    fn test_intersect_segments_keeps_fields() {
        let regions = vec![bed6("chr1", 0, 1000, "gene01.01")];
        let sites = vec![bed("chr1", 250, 260)];
        let result = intersect_segments(regions, &sites);
        assert_eq!(result[0].name(), Some("gene01.01"));
    }

    #[test]
    fn test_intersect_pairs_order() {
        let regions = vec![bed6("chr1", 0, 1000, "g1"), bed6("chr1", 2000, 3000, "g2")];
        let sites = vec![
            bed6("chr1", 2350, 2360, "s3"),
            bed6("chr1", 250, 260, "s1"),
            bed6("chr1", 255, 265, "s2"),
        ];
        let pairs = intersect_pairs(regions, &sites);
        let names: Vec<(Option<&str>, Option<&str>)> = pairs
            .iter()
            .map(|(a, b)| (a.name(), b.name()))
            .collect();
        assert_eq!(
            names,
            vec![
                (Some("g1"), Some("s1")),
                (Some("g1"), Some("s2")),
                (Some("g2"), Some("s3")),
            ]
        );
    }

    #[test]
    fn test_index_lookback_over_long_intervals() {
        // A long interval starting early must still be found for a late query.
        let sites = vec![bed("chr1", 0, 10_000), bed("chr1", 9000, 9100)];
        let index = ChromIndex::build(&sites);
        let query = bed("chr1", 8000, 8010);
        let found = index.overlapping(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].end, 10_000);
    }

    #[test]
    fn test_index_unknown_chromosome() {
        let sites = vec![bed("chr1", 0, 10)];
        let index = ChromIndex::build(&sites);
        assert!(!index.has_overlap(&bed("chrM", 0, 10)));
    }
}

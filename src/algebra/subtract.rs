//! Stream subtraction.

use super::intersect::ChromIndex;
use super::{ensure_sorted, Span};

/// `subtract -A` semantics: the records of `a` with no overlap in `b`,
/// emitted whole.
///
/// With `strand_aware` only records on the same strand count as overlap
/// (`subtract -s`); the engine's own joins are strand-insensitive.
pub fn subtract<A, B>(a: Vec<A>, b: &[B], strand_aware: bool) -> Vec<A>
where
    A: Span + Clone,
    B: Span,
{
    let a = ensure_sorted(a);
    let index = ChromIndex::build(b);

    a.into_iter()
        .filter(|record| {
            !index
                .overlapping(record)
                .iter()
                .any(|hit| !strand_aware || hit.strand() == record.strand())
        })
        .collect()
}

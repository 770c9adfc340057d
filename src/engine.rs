//! The dorina query engine.
//!
//! One query runs through a fixed pipeline: resolve the assembly and the
//! regulator sets, compute each side (region stream, optional window,
//! any/all predicate), combine the sides with a set operator, and re-join
//! the combined stream with the selected regulators so every output row
//! carries the witnessing site. All intermediate streams are materialised
//! and sorted, so the parallel schedule emits exactly the sequential order.

use rayon::prelude::*;

use crate::algebra::{
    intersect::ChromIndex, intersect_all, intersect_any, intersect_pairs,
    intersect_segments, slop, subtract, union, Span,
};
use crate::catalog::{Assembly, Catalog};
use crate::error::{Error, Result};
use crate::parser::bed::{parse_bed, BedRecord};
use crate::parser::gff::{parse_gff, GffRecord};
use crate::regulator::Regulator;
use crate::types::{
    Combine, Hit, MatchMode, Query, QuerySide, RegionKind, Strand, WitnessScope,
};

/// Which query side a combined record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// A region record tagged with its originating side, so the final join can
/// scope witnesses per side.
#[derive(Debug, Clone)]
struct Tagged {
    record: GffRecord,
    side: Side,
}

impl Span for Tagged {
    fn chrom(&self) -> &str {
        &self.record.chrom
    }

    fn start(&self) -> u64 {
        self.record.start
    }

    fn end(&self) -> u64 {
        self.record.end
    }

    fn strand(&self) -> Strand {
        self.record.strand
    }

    fn with_range(&self, start: u64, end: u64) -> Self {
        Tagged {
            record: self.record.with_range(start, end),
            side: self.side,
        }
    }
}

fn tag(records: Vec<GffRecord>, side: Side) -> Vec<Tagged> {
    records
        .into_iter()
        .map(|record| Tagged { record, side })
        .collect()
}

/// The query engine, borrowing an immutable catalog.
pub struct Dorina<'a> {
    catalog: &'a Catalog,
}

impl<'a> Dorina<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Dorina { catalog }
    }

    /// Run one query and return its hits, sorted by region
    /// `(chrom, start, end)` with witnesses in stream order.
    pub fn analyse(&self, query: &Query) -> Result<Vec<Hit>> {
        log::debug!(
            "analyse({}, {:?}({}) <-'{}'-> {:?})",
            query.assembly,
            query.side_a.regulators,
            query.side_a.match_mode,
            query.combine,
            query.side_b.as_ref().map(|side| &side.regulators),
        );

        let assembly = self.catalog.require_assembly(&query.assembly)?;

        let regulators_a =
            Regulator::from_names(self.catalog, &query.side_a.regulators, &query.assembly)?;
        let regulators_b = match &query.side_b {
            Some(side) => {
                Regulator::from_names(self.catalog, &side.regulators, &query.assembly)?
            }
            None => Vec::new(),
        };

        // Regulator tracks load independently; order is preserved.
        let tracks_a = load_tracks(&regulators_a)?;
        let tracks_b = load_tracks(&regulators_b)?;

        let genes: Option<&[String]> = if query.filters_genes() {
            query.genes.as_deref()
        } else {
            None
        };

        let combined = match &query.side_b {
            Some(side_b) => {
                let (result_a, result_b) = rayon::join(
                    || self.compute_side(&query.side_a, &tracks_a, assembly, genes),
                    || self.compute_side(side_b, &tracks_b, assembly, genes),
                );
                combine(tag(result_a?, Side::A), tag(result_b?, Side::B), query.combine)
            }
            None => tag(
                self.compute_side(&query.side_a, &tracks_a, assembly, genes)?,
                Side::A,
            ),
        };

        Ok(join_witnesses(
            combined,
            tracks_a,
            tracks_b,
            query.witness_scope,
        ))
    }

    /// Compute one side: region stream, optional windowed intersection with
    /// the first regulator, then the any/all predicate over the rest.
    fn compute_side(
        &self,
        side: &QuerySide,
        tracks: &[Vec<BedRecord>],
        assembly: &Assembly,
        genes: Option<&[String]>,
    ) -> Result<Vec<GffRecord>> {
        let mut regions = self.region_stream(assembly, side.region, genes)?;

        let predicate: &[Vec<BedRecord>] = if side.window >= 0 {
            let Some((first, rest)) = tracks.split_first() else {
                return Err(Error::InvalidQuery(
                    "a windowed side needs at least one regulator".to_string(),
                ));
            };
            regions = intersect_segments(regions, first);
            if side.window > 0 {
                let sizes = assembly.require_chrom_sizes()?;
                regions = slop(regions, side.window as u64, sizes)?;
            }
            rest
        } else {
            if tracks.is_empty() {
                return match side.match_mode {
                    // Vacuous conjunction: every region trivially matches.
                    MatchMode::All => Ok(regions),
                    MatchMode::Any => Err(Error::EmptySet),
                };
            }
            tracks
        };

        Ok(match side.match_mode {
            _ if predicate.is_empty() => regions,
            MatchMode::Any => intersect_any(regions, &union(predicate.to_vec())),
            MatchMode::All => intersect_all(regions, predicate),
        })
    }

    /// Load the region stream of an assembly, optionally restricted to a
    /// gene id set.
    fn region_stream(
        &self,
        assembly: &Assembly,
        kind: RegionKind,
        genes: Option<&[String]>,
    ) -> Result<Vec<GffRecord>> {
        let path = assembly
            .region_path(kind)
            .ok_or_else(|| Error::UnknownRegion(kind.to_string()))?;

        let records = if path.extension().and_then(|e| e.to_str()) == Some("bed") {
            parse_bed(path)?
                .iter()
                .map(|record| gff_from_bed(record, kind))
                .collect()
        } else {
            parse_gff(path)?
        };

        let records = match genes {
            None => records,
            Some(genes) => records
                .into_iter()
                .filter(|record| record.id().is_some_and(|id| genes.iter().any(|g| g == id)))
                .collect(),
        };

        Ok(crate::algebra::ensure_sorted(records))
    }
}

fn load_tracks(regulators: &[Regulator<'_>]) -> Result<Vec<Vec<BedRecord>>> {
    regulators
        .par_iter()
        .map(|regulator| regulator.load())
        .collect()
}

/// A BED-backed region file presented as GFF-shaped records (intergenic
/// regions may ship as `.bed`).
fn gff_from_bed(record: &BedRecord, kind: RegionKind) -> GffRecord {
    let mut attributes = indexmap::IndexMap::new();
    if let Some(name) = record.name() {
        attributes.insert("ID".to_string(), name.to_string());
    }

    GffRecord {
        chrom: record.chrom.clone(),
        source: ".".to_string(),
        feature: kind.file_stem().to_string(),
        start: record.start,
        end: record.end,
        score: record.score().unwrap_or(".").to_string(),
        strand: Span::strand(record),
        frame: ".".to_string(),
        attributes,
    }
}

/// Apply the inter-set combinator.
fn combine(a: Vec<Tagged>, b: Vec<Tagged>, op: Combine) -> Vec<Tagged> {
    match op {
        Combine::Or => union(vec![a, b]),
        Combine::And => intersect_any(a, &b),
        Combine::Xor => union(vec![
            subtract(a.clone(), &b, false),
            subtract(b, &a, false),
        ]),
        Combine::Not => subtract(a, &b, false),
    }
}

/// The final annotation join: pair every combined record with the
/// regulator intervals overlapping it.
fn join_witnesses(
    combined: Vec<Tagged>,
    tracks_a: Vec<Vec<BedRecord>>,
    tracks_b: Vec<Vec<BedRecord>>,
    scope: WitnessScope,
) -> Vec<Hit> {
    match scope {
        WitnessScope::CombinedUnion => {
            let pool = union(tracks_a.into_iter().chain(tracks_b).collect());
            intersect_pairs(combined, &pool)
                .into_iter()
                .map(|(tagged, witness)| Hit {
                    region: tagged.record,
                    witness,
                })
                .collect()
        }
        WitnessScope::PerSide => {
            let pool_a = union(tracks_a);
            let pool_b = union(tracks_b);
            let index_a = ChromIndex::build(&pool_a);
            let index_b = ChromIndex::build(&pool_b);

            combined
                .iter()
                .flat_map(|tagged| {
                    let index = match tagged.side {
                        Side::A => &index_a,
                        Side::B => &index_b,
                    };
                    index.overlapping(&tagged.record).into_iter().map(|witness| Hit {
                        region: tagged.record.clone(),
                        witness: witness.clone(),
                    })
                })
                .collect()
        }
    }
}

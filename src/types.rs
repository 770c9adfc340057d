//! Core value types for dorina queries.
//!
//! The query engine works over half-open, 0-based genomic intervals. GFF3
//! input is converted on parse and restored on emit; BED coordinates pass
//! through unchanged.

use std::fmt;
use std::str::FromStr;

use crate::parser::bed::BedRecord;
use crate::parser::gff::GffRecord;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    /// Unstranded or unknown, written as `.`.
    Unknown,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+', '-' or '.'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Region classes a query side can select.
///
/// Each class maps onto one prebuilt file per assembly (`all.gff`,
/// `cds.gff`, ...). Intergenic files may be `.gff` or `.bed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Any,
    Cds,
    ThreePrime,
    FivePrime,
    Intron,
    Intergenic,
}

/// Error type for parsing a region class from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRegionError;

impl fmt::Display for ParseRegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid region: expected 'any', 'CDS', '3prime', '5prime', 'intron' or 'intergenic'"
        )
    }
}

impl std::error::Error for ParseRegionError {}

impl FromStr for RegionKind {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(RegionKind::Any),
            "CDS" => Ok(RegionKind::Cds),
            "3prime" => Ok(RegionKind::ThreePrime),
            "5prime" => Ok(RegionKind::FivePrime),
            "intron" => Ok(RegionKind::Intron),
            "intergenic" => Ok(RegionKind::Intergenic),
            _ => Err(ParseRegionError),
        }
    }
}

impl RegionKind {
    /// The query-facing name of this region class.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Any => "any",
            RegionKind::Cds => "CDS",
            RegionKind::ThreePrime => "3prime",
            RegionKind::FivePrime => "5prime",
            RegionKind::Intron => "intron",
            RegionKind::Intergenic => "intergenic",
        }
    }

    /// The file stem backing this region class inside an assembly directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            RegionKind::Any => "all",
            RegionKind::Cds => "cds",
            RegionKind::ThreePrime => "3_utr",
            RegionKind::FivePrime => "5_utr",
            RegionKind::Intron => "intron",
            RegionKind::Intergenic => "intergenic",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a region must overlap any or every regulator of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Any,
    All,
}

/// Error type for parsing a match mode from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMatchModeError;

impl fmt::Display for ParseMatchModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid match mode: expected 'any' or 'all'")
    }
}

impl std::error::Error for ParseMatchModeError {}

impl FromStr for MatchMode {
    type Err = ParseMatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any" => Ok(MatchMode::Any),
            "all" => Ok(MatchMode::All),
            _ => Err(ParseMatchModeError),
        }
    }
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Any => "any",
            MatchMode::All => "all",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set operator combining the two query sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Or,
    And,
    Xor,
    Not,
}

/// Error type for parsing a combine operator from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCombineError;

impl fmt::Display for ParseCombineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid combine operator: expected 'or', 'and', 'xor' or 'not'")
    }
}

impl std::error::Error for ParseCombineError {}

impl FromStr for Combine {
    type Err = ParseCombineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "or" => Ok(Combine::Or),
            "and" => Ok(Combine::And),
            "xor" => Ok(Combine::Xor),
            "not" => Ok(Combine::Not),
            _ => Err(ParseCombineError),
        }
    }
}

impl Combine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combine::Or => "or",
            Combine::And => "and",
            Combine::Xor => "xor",
            Combine::Not => "not",
        }
    }
}

impl fmt::Display for Combine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a query: a regulator set with its match mode, region class
/// and window.
///
/// `window` uses `-1` as the explicit "no window" sentinel; `0` still pops
/// the first regulator and intersects with it, without expansion.
#[derive(Debug, Clone)]
pub struct QuerySide {
    pub regulators: Vec<String>,
    pub match_mode: MatchMode,
    pub region: RegionKind,
    pub window: i64,
}

impl QuerySide {
    pub fn new(regulators: Vec<String>) -> Self {
        QuerySide {
            regulators,
            match_mode: MatchMode::Any,
            region: RegionKind::Any,
            window: -1,
        }
    }
}

/// Which regulators witness the final annotation join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WitnessScope {
    /// Join the combined stream against the union of both sides' regulators.
    /// Matches the original pipeline; a row that came only from side A may
    /// pick up a witness from side B.
    #[default]
    CombinedUnion,
    /// Join each combined record only against its originating side's set.
    PerSide,
}

/// A complete query over one assembly.
#[derive(Debug, Clone)]
pub struct Query {
    pub assembly: String,
    pub side_a: QuerySide,
    pub side_b: Option<QuerySide>,
    pub combine: Combine,
    /// Gene ids to restrict the region stream to. `None` or a list
    /// containing `"all"` keeps every region record.
    pub genes: Option<Vec<String>>,
    pub witness_scope: WitnessScope,
}

impl Query {
    /// A single-sided query with default match mode and region.
    pub fn new(assembly: impl Into<String>, regulators: Vec<String>) -> Self {
        Query {
            assembly: assembly.into(),
            side_a: QuerySide::new(regulators),
            side_b: None,
            combine: Combine::Or,
            genes: None,
            witness_scope: WitnessScope::CombinedUnion,
        }
    }

    /// Whether the gene filter is active.
    pub fn filters_genes(&self) -> bool {
        match &self.genes {
            None => false,
            Some(genes) => !genes.iter().any(|g| g == "all"),
        }
    }
}

/// The unit of output: an annotated region paired with the regulator
/// interval that witnesses the match.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub region: GffRecord,
    pub witness: BedRecord,
}

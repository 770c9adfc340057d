//! Codecs for genomic file formats.

pub mod bed;
pub mod gff;
pub mod util;

pub use bed::{parse_bed, project_bed6, BedRecord};
pub use gff::{parse_gff, GffRecord};

//! Hit emission.
//!
//! Hits are written as GFF-shaped lines: the annotated region's eight GFF
//! columns, then an attributes column carrying the region's own attributes
//! plus the witnessing regulator's name, score and BED coordinates. By
//! default every witness gets its own row; collapse mode merges all
//! witnesses of one region into a single row, joining values with `~`.

use std::io::{self, Write};

use crate::parser::bed::BedRecord;
use crate::types::Hit;

/// Delimiter joining collapsed witness values.
const COLLAPSE_DELIMITER: &str = "~";

/// Format one region with its witnesses as a single GFF-shaped line,
/// without trailing newline.
fn format_line(hit: &Hit, witnesses: &[&BedRecord]) -> String {
    let region = &hit.region;
    let join = |values: Vec<String>| values.join(COLLAPSE_DELIMITER);

    let mut attributes: Vec<String> = region
        .attributes
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect();

    attributes.push(format!(
        "regulator={}",
        join(witnesses.iter().map(|w| w.name().unwrap_or(".").to_string()).collect())
    ));
    attributes.push(format!(
        "score={}",
        join(witnesses.iter().map(|w| w.score().unwrap_or(".").to_string()).collect())
    ));
    attributes.push(format!(
        "start={}",
        join(witnesses.iter().map(|w| w.start.to_string()).collect())
    ));
    attributes.push(format!(
        "end={}",
        join(witnesses.iter().map(|w| w.end.to_string()).collect())
    ));

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        region.chrom,
        region.source,
        region.feature,
        region.start + 1,
        region.end,
        region.score,
        region.strand,
        region.frame,
        attributes.join(";")
    )
}

/// Format a single hit (one witness per row).
pub fn format_hit(hit: &Hit) -> String {
    format_line(hit, &[&hit.witness])
}

/// Write hits, one row per witness.
pub fn write_hits<W: Write>(writer: &mut W, hits: &[Hit]) -> io::Result<()> {
    for hit in hits {
        writeln!(writer, "{}", format_hit(hit))?;
    }
    Ok(())
}

/// Write hits with consecutive witnesses of the same region collapsed into
/// one row.
pub fn write_hits_collapsed<W: Write>(writer: &mut W, hits: &[Hit]) -> io::Result<()> {
    let mut iter = hits.iter().peekable();

    while let Some(first) = iter.next() {
        let mut witnesses: Vec<&BedRecord> = vec![&first.witness];
        while let Some(next) = iter.peek() {
            if next.region != first.region {
                break;
            }
            witnesses.push(&next.witness);
            iter.next();
        }
        writeln!(writer, "{}", format_line(first, &witnesses))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::bed::parse_bed_line;
    use crate::parser::gff::parse_gff_line;
    use std::path::Path;

    fn hit(gff: &str, bed: &str) -> Hit {
        Hit {
            region: parse_gff_line(gff, Path::new("x.gff"), 1).unwrap(),
            witness: parse_bed_line(bed, Path::new("x.bed"), 1).unwrap(),
        }
    }

    #[test]
    fn test_format_hit() {
        let hit = hit(
            "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
            "chr1\t250\t260\tPARCLIP#scifi*scifi_cds\t5\t+",
        );
        assert_eq!(
            format_hit(&hit),
            "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\t\
             ID=gene01.01;regulator=PARCLIP#scifi*scifi_cds;score=5;start=250;end=260"
        );
    }

    #[test]
    fn test_format_hit_bed3_witness() {
        let hit = hit(
            "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
            "chr1\t250\t260",
        );
        let line = format_hit(&hit);
        assert!(line.ends_with("regulator=.;score=.;start=250;end=260"));
    }

    #[test]
    fn test_write_hits_one_row_per_witness() {
        let hits = vec![
            hit(
                "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
                "chr1\t250\t260\ta\t5\t+",
            ),
            hit(
                "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
                "chr1\t255\t265\tb\t5\t+",
            ),
        ];

        let mut buffer = Vec::new();
        write_hits(&mut buffer, &hits).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_write_hits_collapsed() {
        let hits = vec![
            hit(
                "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
                "chr1\t250\t260\ta\t5\t+",
            ),
            hit(
                "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\tID=gene01.01",
                "chr1\t255\t265\tb\t7\t+",
            ),
            hit(
                "chr1\tdoRiNA2\tgene\t2001\t3000\t.\t+\t.\tID=gene01.02",
                "chr1\t2350\t2360\tc\t5\t+",
            ),
        ];

        let mut buffer = Vec::new();
        write_hits_collapsed(&mut buffer, &hits).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("regulator=a~b"));
        assert!(lines[0].contains("score=5~7"));
        assert!(lines[0].contains("start=250~255"));
        assert!(lines[1].contains("regulator=c"));
    }
}

//! Regulator selection.
//!
//! A regulator name resolves either through the catalog (experiment id for
//! an assembly) or, when it contains a path separator, directly to a BED
//! file on disk. Catalog regulators filter their backing BED down to the
//! sites belonging to that regulator; the loaded view is always projected
//! to BED6.

use std::path::PathBuf;

use crate::catalog::{Catalog, Experiment};
use crate::error::{Error, Result};
use crate::parser::bed::{parse_bed, project_bed6, BedRecord};

/// A resolved regulator: name, backing BED file, and a borrow of the
/// catalog experiment when the name came from the catalog.
#[derive(Debug)]
pub struct Regulator<'a> {
    pub name: String,
    pub path: PathBuf,
    pub custom: bool,
    pub experiment: Option<&'a Experiment>,
}

/// The site-name predicate behind regulator filtering.
///
/// Site names in shared BED files are shaped
/// `<data-source>#<track>*<regulator-id>`, so a record passes when its name
/// equals the pattern or contains the pattern immediately followed by `*`.
pub fn site_name_matches(pattern: &str, site_name: &str) -> bool {
    if site_name == pattern {
        return true;
    }
    let anchored = format!("{}*", pattern);
    site_name.contains(&anchored)
}

/// The filter pattern for a regulator name: everything up to and including
/// the first underscore is stripped.
pub fn filter_pattern(name: &str) -> &str {
    match name.split_once('_') {
        Some((_, rest)) => rest,
        None => name,
    }
}

impl<'a> Regulator<'a> {
    /// Resolve a regulator name for an assembly.
    ///
    /// Names containing a path separator are custom tracks: the backing
    /// file is `<stem>.bed` and no site filtering applies. Everything else
    /// is looked up in the catalog, searching species in catalog order.
    pub fn from_name(catalog: &'a Catalog, name: &str, assembly: &str) -> Result<Self> {
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            return Ok(Regulator {
                name: name.to_string(),
                path: PathBuf::from(name).with_extension("bed"),
                custom: true,
                experiment: None,
            });
        }

        let experiment = catalog
            .experiment(name, assembly)
            .ok_or_else(|| Error::UnknownRegulator(name.to_string()))?;
        let path = experiment.bed_path();
        if !path.is_file() {
            return Err(Error::UnknownRegulator(name.to_string()));
        }

        Ok(Regulator {
            name: name.to_string(),
            path,
            custom: false,
            experiment: Some(experiment),
        })
    }

    /// Resolve a whole set of names, preserving order.
    pub fn from_names(
        catalog: &'a Catalog,
        names: &[String],
        assembly: &str,
    ) -> Result<Vec<Regulator<'a>>> {
        names
            .iter()
            .map(|name| Regulator::from_name(catalog, name, assembly))
            .collect()
    }

    /// Whether site filtering applies to this regulator.
    ///
    /// Custom tracks and names containing the literal `_all` pass every
    /// record through.
    fn filters_sites(&self) -> bool {
        !self.custom && !self.name.contains("_all")
    }

    /// Load the regulator's sites: parse the backing BED, keep the records
    /// belonging to this regulator, and project to BED6.
    pub fn load(&self) -> Result<Vec<BedRecord>> {
        let records = parse_bed(&self.path)?;

        let filtered: Vec<BedRecord> = if self.filters_sites() {
            let pattern = filter_pattern(&self.name);
            log::debug!("filtering {} sites on pattern {:?}", self.name, pattern);
            records
                .into_iter()
                .filter(|record| {
                    record
                        .name()
                        .is_some_and(|name| site_name_matches(pattern, name))
                })
                .collect()
        } else {
            records
        };

        Ok(filtered.iter().map(project_bed6).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_site_name_matcher() {
        // Anchored form: pattern followed by a star, anywhere in the name.
        assert!(site_name_matches("scifi", "PARCLIP#scifi*scifi_cds"));
        assert!(site_name_matches("fake01", "PICTAR#fake01*fake01_cds"));
        // Plain names are accepted verbatim.
        assert!(site_name_matches("scifi", "scifi"));
        // A shared prefix without the star anchor does not match.
        assert!(!site_name_matches("fake02", "PICTAR#fake023*fake023_cds"));
        assert!(!site_name_matches("scifi", "PARCLIP#other*other_cds"));
        assert!(!site_name_matches("scifi", "scifi_cds"));
    }

    #[test]
    fn test_filter_pattern_strips_first_underscore() {
        assert_eq!(filter_pattern("PARCLIP_scifi"), "scifi");
        assert_eq!(filter_pattern("PICTAR_fake01"), "fake01");
        // Only the first underscore splits; the rest stays.
        assert_eq!(filter_pattern("CLIP_seq_track"), "seq_track");
        assert_eq!(filter_pattern("plainname"), "plainname");
    }

    fn fixture_catalog() -> (TempDir, Catalog) {
        let dir = TempDir::new().unwrap();
        let reg_dir = dir.path().join("regulators/h_sapiens/hg19");
        fs::create_dir_all(&reg_dir).unwrap();

        let mut json = fs::File::create(reg_dir.join("PICTAR_fake.json")).unwrap();
        write!(
            json,
            r#"[{{"id": "PICTAR_fake01"}}, {{"id": "PICTAR_fake02"}}, {{"id": "PICTAR_all_fake"}}]"#
        )
        .unwrap();

        let mut bed = fs::File::create(reg_dir.join("PICTAR_fake.bed")).unwrap();
        writeln!(bed, "chr1\t255\t265\tPICTAR#fake01*fake01_cds\t5\t+").unwrap();
        writeln!(bed, "chr1\t2450\t2460\tPICTAR#fake02*fake02_intron\t5\t+").unwrap();
        writeln!(bed, "chr1\t3000\t3010\tPICTAR#fake023*fake023_cds\t5\t+").unwrap();

        let catalog = Catalog::load(dir.path()).unwrap();
        (dir, catalog)
    }

    #[test]
    fn test_resolve_from_catalog() {
        let (_dir, catalog) = fixture_catalog();
        let regulator = Regulator::from_name(&catalog, "PICTAR_fake01", "hg19").unwrap();
        assert!(!regulator.custom);
        assert_eq!(regulator.experiment.unwrap().id, "PICTAR_fake01");
        assert!(regulator.path.ends_with("PICTAR_fake.bed"));
    }

    #[test]
    fn test_resolve_unknown_name() {
        let (_dir, catalog) = fixture_catalog();
        assert!(matches!(
            Regulator::from_name(&catalog, "CLIP_missing", "hg19"),
            Err(Error::UnknownRegulator(_))
        ));
        // Known name, wrong assembly.
        assert!(matches!(
            Regulator::from_name(&catalog, "PICTAR_fake01", "hg18"),
            Err(Error::UnknownRegulator(_))
        ));
    }

    #[test]
    fn test_resolve_custom_path() {
        let (_dir, catalog) = fixture_catalog();
        let regulator =
            Regulator::from_name(&catalog, "/tmp/tracks/manual.bed", "hg19").unwrap();
        assert!(regulator.custom);
        assert!(regulator.experiment.is_none());
        assert_eq!(regulator.path, PathBuf::from("/tmp/tracks/manual.bed"));

        // A path-shaped name always backs onto the .bed stem.
        let regulator =
            Regulator::from_name(&catalog, "/tmp/tracks/manual.json", "hg19").unwrap();
        assert_eq!(regulator.path, PathBuf::from("/tmp/tracks/manual.bed"));
    }

    #[test]
    fn test_load_filters_to_own_sites() {
        let (_dir, catalog) = fixture_catalog();
        let sites = Regulator::from_name(&catalog, "PICTAR_fake01", "hg19")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name(), Some("PICTAR#fake01*fake01_cds"));
    }

    #[test]
    fn test_load_anchoring_excludes_shared_prefix() {
        let (_dir, catalog) = fixture_catalog();
        let sites = Regulator::from_name(&catalog, "PICTAR_fake02", "hg19")
            .unwrap()
            .load()
            .unwrap();
        // fake02 must not pick up the fake023 site.
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].start, 2450);
    }

    #[test]
    fn test_load_all_opt_out() {
        let (_dir, catalog) = fixture_catalog();
        let sites = Regulator::from_name(&catalog, "PICTAR_all_fake", "hg19")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(sites.len(), 3);
    }

    #[test]
    fn test_load_projects_to_bed6() {
        let dir = TempDir::new().unwrap();
        let bed_path = dir.path().join("manual.bed");
        let mut bed = fs::File::create(&bed_path).unwrap();
        writeln!(bed, "chr1\t0\t10\twide\t7\t+\t0\t10\t255,0,0").unwrap();
        writeln!(bed, "chr1\t20\t30\tnarrow\t2\t-\t20\t30\t0,0,255").unwrap();

        let catalog = Catalog::default();
        let name = bed_path.to_string_lossy().into_owned();
        let sites = Regulator::from_name(&catalog, &name, "hg19")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(sites.len(), 2);
        for site in &sites {
            assert_eq!(site.extra.len(), 3);
        }
        assert_eq!(sites[0].to_line(), "chr1\t0\t10\twide\t7\t+");
    }
}

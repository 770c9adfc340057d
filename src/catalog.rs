//! On-disk catalog of genome assemblies and regulator experiments.
//!
//! The catalog walks exactly two directory levels below `genomes/` and
//! `regulators/` (`<species>/<assembly>/`) and is immutable after load;
//! selectors and the engine borrow from it. Species directories may carry a
//! `description.json`; regulator experiments live in `<stem>.json` arrays
//! paired with a `<stem>.bed` data file.

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::algebra::ChromSizes;
use crate::error::{Error, Result};
use crate::parser::gff::parse_gff;
use crate::types::RegionKind;

/// Species header from `description.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesDescription {
    pub id: String,
    pub label: String,
    pub scientific: String,
    #[serde(default)]
    pub weight: i64,
}

/// One regulator experiment from a `<stem>.json` array.
///
/// `id` is the user-visible regulator name; `file` is injected at load time
/// as the absolute path of the JSON document, so the backing data file is
/// always `file` with a `.bed` extension.
#[derive(Debug, Clone, Deserialize)]
pub struct Experiment {
    pub id: String,
    #[serde(skip)]
    pub file: PathBuf,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Experiment {
    /// Path of the BED file backing this experiment.
    pub fn bed_path(&self) -> PathBuf {
        self.file.with_extension("bed")
    }
}

/// Region files of one genome assembly, keyed by file stem.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub dir: PathBuf,
    pub regions: IndexMap<String, PathBuf>,
    chrom_sizes: Option<ChromSizes>,
}

impl Assembly {
    /// The file backing a region class, if present. Intergenic regions may
    /// be `.gff` or `.bed`; the stem decides membership, the stored path
    /// keeps the extension.
    pub fn region_path(&self, kind: RegionKind) -> Option<&Path> {
        self.regions.get(kind.file_stem()).map(PathBuf::as_path)
    }

    /// The cached chromosome-sizes table, if the assembly ships one.
    pub fn chrom_sizes(&self) -> Option<&ChromSizes> {
        self.chrom_sizes.as_ref()
    }

    /// The sizes table, required (windowed queries).
    pub fn require_chrom_sizes(&self) -> Result<&ChromSizes> {
        self.chrom_sizes.as_ref().ok_or_else(|| Error::Io {
            path: self.dir.clone(),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                "no chromosome sizes table for this assembly",
            ),
        })
    }
}

/// All assemblies of one species, with the optional description header.
#[derive(Debug, Clone, Default)]
pub struct Species {
    pub description: Option<SpeciesDescription>,
    pub assemblies: IndexMap<String, Assembly>,
}

/// Experiments of one species, by assembly and regulator id.
pub type RegulatorTree = IndexMap<String, IndexMap<String, Experiment>>;

/// The loaded catalog: genomes and regulators, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub genomes: IndexMap<String, Species>,
    pub regulators: IndexMap<String, RegulatorTree>,
}

impl Catalog {
    /// Load the catalog from a data directory.
    ///
    /// Fails with [`Error::Catalog`] only when `data_dir` itself is
    /// unreadable or a regulator JSON is unparsable; missing `genomes/` or
    /// `regulators/` subtrees and malformed species descriptions are
    /// non-fatal.
    pub fn load(data_dir: &Path) -> Result<Self> {
        fs::read_dir(data_dir).map_err(|source| Error::Catalog {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let mut catalog = Catalog::default();

        for species_dir in subdirectories(&data_dir.join("genomes")) {
            let species_name = dir_name(&species_dir);
            let mut species = Species {
                description: load_description(&species_dir),
                assemblies: IndexMap::new(),
            };
            for assembly_dir in subdirectories(&species_dir) {
                species
                    .assemblies
                    .insert(dir_name(&assembly_dir), load_assembly(&assembly_dir));
            }
            catalog.genomes.insert(species_name, species);
        }

        for species_dir in subdirectories(&data_dir.join("regulators")) {
            let mut tree = RegulatorTree::new();
            for assembly_dir in subdirectories(&species_dir) {
                tree.insert(
                    dir_name(&assembly_dir),
                    load_experiments(&assembly_dir)?,
                );
            }
            catalog.regulators.insert(dir_name(&species_dir), tree);
        }

        Ok(catalog)
    }

    /// Find an assembly by name, across species.
    pub fn assembly(&self, name: &str) -> Option<&Assembly> {
        self.genomes
            .values()
            .find_map(|species| species.assemblies.get(name))
    }

    /// Find an assembly by name, failing with [`Error::UnknownAssembly`].
    pub fn require_assembly(&self, name: &str) -> Result<&Assembly> {
        self.assembly(name)
            .ok_or_else(|| Error::UnknownAssembly(name.to_string()))
    }

    /// Find the first experiment with the given regulator id for an
    /// assembly, searching species in catalog order.
    pub fn experiment(&self, regulator_id: &str, assembly: &str) -> Option<&Experiment> {
        self.regulators.values().find_map(|tree| {
            tree.get(assembly)
                .and_then(|experiments| experiments.get(regulator_id))
        })
    }

    /// All gene ids of an assembly, read from the `ID` attributes of its
    /// `all` region file, in file order.
    pub fn genes(&self, assembly: &str) -> Result<Vec<String>> {
        let assembly = self.require_assembly(assembly)?;
        let path = assembly
            .region_path(RegionKind::Any)
            .ok_or_else(|| Error::UnknownRegion(RegionKind::Any.to_string()))?;

        let mut genes = Vec::new();
        for record in parse_gff(path)? {
            if let Some(id) = record.id() {
                genes.push(id.to_string());
            }
        }
        Ok(genes)
    }
}

/// Immediate subdirectories of `root`, sorted by name for deterministic
/// catalog order. A missing or unreadable `root` yields nothing.
fn subdirectories(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Species `description.json`; IO and parse failures are downgraded to a
/// warning and the species stays visible without a header.
fn load_description(species_dir: &Path) -> Option<SpeciesDescription> {
    let path = species_dir.join("description.json");
    if !path.is_file() {
        return None;
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("skipping unreadable {}: {}", path.display(), err);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(description) => Some(description),
        Err(err) => {
            log::warn!("skipping malformed {}: {}", path.display(), err);
            None
        }
    }
}

/// Index one genome assembly directory: one region entry per `.gff`/`.bed`
/// file, keyed by stem, plus the optional `<assembly>.genome` sizes table.
fn load_assembly(assembly_dir: &Path) -> Assembly {
    let mut regions = IndexMap::new();
    let mut chrom_sizes = None;

    for path in files_sorted(assembly_dir) {
        let (Some(stem), Some(ext)) = (
            path.file_stem().map(|s| s.to_string_lossy().into_owned()),
            path.extension().and_then(|e| e.to_str()),
        ) else {
            continue;
        };

        match ext {
            "gff" | "bed" => {
                regions.insert(stem, path);
            }
            "genome" => match ChromSizes::load(&path) {
                Ok(sizes) => chrom_sizes = Some(sizes),
                Err(err) => {
                    log::warn!("skipping sizes table {}: {}", path.display(), err)
                }
            },
            _ => {}
        }
    }

    Assembly {
        dir: assembly_dir.to_path_buf(),
        regions,
        chrom_sizes,
    }
}

/// Index one regulator assembly directory: every `<stem>.json` with a
/// sibling `<stem>.bed` contributes one experiment per JSON-array element.
/// JSONs without a data file are skipped silently.
fn load_experiments(assembly_dir: &Path) -> Result<IndexMap<String, Experiment>> {
    let mut experiments = IndexMap::new();

    for path in files_sorted(assembly_dir) {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if !path.with_extension("bed").is_file() {
            continue;
        }

        let catalog_err = |source: io::Error| Error::Catalog {
            path: path.clone(),
            source,
        };

        let content = fs::read_to_string(&path).map_err(catalog_err)?;
        let parsed: Vec<Experiment> = serde_json::from_str(&content)
            .map_err(|err| catalog_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;

        let absolute = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        for mut experiment in parsed {
            experiment.file = absolute.clone();
            experiments.insert(experiment.id.clone(), experiment);
        }
    }

    Ok(experiments)
}

/// Plain files of a directory, sorted by name.
fn files_sorted(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

//! CLI entry point for dorina.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use dorina::output::{write_hits, write_hits_collapsed};
use dorina::{
    Catalog, Combine, Dorina, Error, MatchMode, Query, QuerySide, RegionKind, Settings,
    WitnessScope,
};

/// Query engine for the doRiNA database of posttranscriptional regulatory
/// elements.
#[derive(Parser, Debug)]
#[command(name = "dorina")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set logging level to debug (more verbose)
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Set logging level to error (quieter)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a query against a genome assembly
    Run(RunArgs),
    /// List available genomes in the data directory
    Genomes(ListArgs),
    /// List available regulators in the data directory
    Regulators(ListArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Genome assembly to query (e.g. hg19)
    assembly: String,

    /// First set of regulators to analyse
    #[arg(short = 'a', long = "seta", num_args = 1.., required = true)]
    set_a: Vec<String>,

    /// Second set of regulators to analyse
    #[arg(short = 'b', long = "setb", num_args = 1..)]
    set_b: Vec<String>,

    /// All or any regulators in set A must match
    #[arg(long = "match-a", default_value = "any")]
    match_a: String,

    /// Region to match set A in
    #[arg(long = "region-a", default_value = "any")]
    region_a: String,

    /// Use windowed search for set A (-1 = off)
    #[arg(long = "window-a", default_value = "-1", allow_hyphen_values = true)]
    window_a: i64,

    /// All or any regulators in set B must match
    #[arg(long = "match-b", default_value = "any")]
    match_b: String,

    /// Region to match set B in
    #[arg(long = "region-b", default_value = "any")]
    region_b: String,

    /// Use windowed search for set B (-1 = off)
    #[arg(long = "window-b", default_value = "-1", allow_hyphen_values = true)]
    window_b: i64,

    /// Set operation to combine set A and set B hits
    #[arg(short = 'C', long = "combine", default_value = "or")]
    combine: String,

    /// Restrict regions to these gene ids
    #[arg(long = "genes", num_args = 1..)]
    genes: Vec<String>,

    /// Join witnesses per side instead of against the union of both sets
    #[arg(long = "witnesses-per-side")]
    witnesses_per_side: bool,

    /// Collapse multiple witnesses of one region into a single row
    #[arg(long = "collapse")]
    collapse: bool,

    /// Number of worker threads (0 = auto-detect)
    #[arg(short = 'j', long = "threads", default_value = "0")]
    threads: usize,

    #[command(flatten)]
    data: ListArgs,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Path to genomes and regulators
    #[arg(short = 'p', long = "path")]
    path: Option<PathBuf>,
}

impl ListArgs {
    /// The data directory: the CLI flag wins over the settings file.
    fn data_dir(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => {
                let settings = Settings::discover().context("failed to read settings")?;
                Ok(settings.expanded_data_path())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            exit_code_for(&err)
        }
    }
}

/// Exit 1 for user errors, 2 for IO/catalog failures.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(err) if err.is_user_error() => ExitCode::from(1),
        _ => ExitCode::from(2),
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Genomes(args) => list_genomes(&args),
        Commands::Regulators(args) => list_regulators(&args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let query = build_query(&args)?;

    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("failed to create thread pool")?;

    let data_dir = args.data.data_dir()?;
    log::debug!("loading catalog from {}", data_dir.display());
    let catalog = Catalog::load(&data_dir)?;
    let engine = Dorina::new(&catalog);

    let hits = pool.install(|| engine.analyse(&query))?;

    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    if args.collapse {
        write_hits_collapsed(&mut writer, &hits)?;
    } else {
        write_hits(&mut writer, &hits)?;
    }
    writer.flush()?;

    Ok(())
}

/// Translate CLI strings into a [`Query`], mapping parse failures onto the
/// user-error kinds so they exit 1.
fn build_query(args: &RunArgs) -> Result<Query> {
    let parse_match = |value: &str| -> Result<MatchMode> {
        value
            .parse()
            .map_err(|_| Error::InvalidQuery(format!("invalid match mode: {}", value)).into())
    };
    let parse_region = |value: &str| -> Result<RegionKind> {
        value
            .parse()
            .map_err(|_| Error::UnknownRegion(value.to_string()).into())
    };

    let side_a = QuerySide {
        regulators: args.set_a.clone(),
        match_mode: parse_match(&args.match_a)?,
        region: parse_region(&args.region_a)?,
        window: args.window_a,
    };

    let side_b = if args.set_b.is_empty() {
        None
    } else {
        Some(QuerySide {
            regulators: args.set_b.clone(),
            match_mode: parse_match(&args.match_b)?,
            region: parse_region(&args.region_b)?,
            window: args.window_b,
        })
    };

    let combine: Combine = args
        .combine
        .parse()
        .map_err(|_| Error::InvalidQuery(format!("invalid combine operator: {}", args.combine)))?;

    Ok(Query {
        assembly: args.assembly.clone(),
        side_a,
        side_b,
        combine,
        genes: if args.genes.is_empty() {
            None
        } else {
            Some(args.genes.clone())
        },
        witness_scope: if args.witnesses_per_side {
            WitnessScope::PerSide
        } else {
            WitnessScope::CombinedUnion
        },
    })
}

fn list_genomes(args: &ListArgs) -> Result<()> {
    let catalog = Catalog::load(&args.data_dir()?)?;

    if catalog.genomes.is_empty() {
        println!("No genomes available.");
        return Ok(());
    }

    println!("Available genomes:");
    println!("------------------");
    for (species, entry) in &catalog.genomes {
        match &entry.description {
            Some(description) => println!("\t{} ({})", species, description.label),
            None => println!("\t{}", species),
        }
        for (assembly, regions) in &entry.assemblies {
            println!("\t\t{}", assembly);
            let mut stems: Vec<(&String, &PathBuf)> = regions.regions.iter().collect();
            stems.sort_by_key(|(stem, _)| stem.as_str());
            for (stem, path) in stems {
                let file = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("\t\t\t{}: {}", stem, file);
            }
        }
    }

    Ok(())
}

fn list_regulators(args: &ListArgs) -> Result<()> {
    let catalog = Catalog::load(&args.data_dir()?)?;

    if catalog.regulators.is_empty() {
        println!("No regulators available.");
        return Ok(());
    }

    println!("Available regulators:");
    println!("---------------------");
    for (species, assemblies) in &catalog.regulators {
        println!("\t{}", species);
        for (assembly, experiments) in assemblies {
            println!("\t\t{}", assembly);
            for regulator in experiments.keys() {
                println!("\t\t\t{}", regulator);
            }
        }
    }

    Ok(())
}

//! CLI round-trip tests driving the dorina binary against the fixture data
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn dorina() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dorina"))
}

#[test]
fn run_single_regulator() {
    dorina()
        .arg("run")
        .arg("hg19")
        .arg("-a")
        .arg("PARCLIP_scifi")
        .arg("-p")
        .arg(data_dir())
        .assert()
        .success()
        .stdout(
            "chr1\tdoRiNA2\tgene\t1\t1000\t.\t+\t.\t\
             ID=gene01.01;regulator=PARCLIP#scifi*scifi_cds;score=5;start=250;end=260\n\
             chr1\tdoRiNA2\tgene\t2001\t3000\t.\t+\t.\t\
             ID=gene01.02;regulator=PARCLIP#scifi*scifi_intron;score=5;start=2350;end=2360\n",
        );
}

#[test]
fn run_cds_region() {
    dorina()
        .args(["run", "hg19", "-a", "PARCLIP_scifi", "--region-a", "CDS", "-p"])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("CDS\t201\t300"))
        .stdout(predicate::str::contains("scifi_cds"));
}

#[test]
fn run_combine_and() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "-b", "PICTAR_fake01", "-C", "and", "-p",
        ])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("gene01.01").count(2))
        .stdout(predicate::str::contains("gene01.02").count(0));
}

#[test]
fn run_combine_xor() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "-b", "PICTAR_fake01", "-C", "xor", "-p",
        ])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(
            "chr1\tdoRiNA2\tgene\t2001\t3000\t.\t+\t.\t\
             ID=gene01.02;regulator=PARCLIP#scifi*scifi_intron;score=5;start=2350;end=2360\n",
        );
}

#[test]
fn run_windowed() {
    dorina()
        .args([
            "run",
            "hg19",
            "-a",
            "PARCLIP_scifi",
            "PICTAR_fake01",
            "--match-a",
            "all",
            "--window-a",
            "1000",
            "-p",
        ])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("gene\t1\t1260"))
        .stdout(predicate::str::contains("gene\t1351\t3360"));
}

#[test]
fn run_genes_filter() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "--genes", "gene01.02", "-p",
        ])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("gene01.01").count(0))
        .stdout(predicate::str::contains("gene01.02"));
}

#[test]
fn run_collapse_joins_witnesses() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "PICTAR_fake01", "--match-a", "all",
            "--collapse", "-p",
        ])
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "regulator=PARCLIP#scifi*scifi_cds~PICTAR#fake01*fake01_cds",
        ))
        .stdout(predicate::str::contains("score=5~5"));
}

#[test]
fn run_unknown_regulator_exits_1() {
    dorina()
        .args(["run", "hg19", "-a", "CLIP_unknown", "-p"])
        .arg(data_dir())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown regulator"));
}

#[test]
fn run_unknown_assembly_exits_1() {
    dorina()
        .args(["run", "mm10", "-a", "PARCLIP_scifi", "-p"])
        .arg(data_dir())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown assembly"));
}

#[test]
fn run_bad_region_exits_1() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "--region-a", "exonic", "-p",
        ])
        .arg(data_dir())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown region"));
}

#[test]
fn run_missing_data_dir_exits_2() {
    dorina()
        .args([
            "run", "hg19", "-a", "PARCLIP_scifi", "-p", "/no/such/dorina/data",
        ])
        .assert()
        .code(2);
}

#[test]
fn genomes_listing() {
    dorina()
        .arg("genomes")
        .arg("-p")
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Available genomes:"))
        .stdout(predicate::str::contains("h_sapiens (Human)"))
        .stdout(predicate::str::contains("hg19"))
        .stdout(predicate::str::contains("all: all.gff"))
        .stdout(predicate::str::contains("intergenic: intergenic.gff"));
}

#[test]
fn regulators_listing() {
    dorina()
        .arg("regulators")
        .arg("-p")
        .arg(data_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Available regulators:"))
        .stdout(predicate::str::contains("PARCLIP_scifi"))
        .stdout(predicate::str::contains("PICTAR_fake02"))
        .stdout(predicate::str::contains("fake024|Pictar"))
        .stdout(predicate::str::contains("hg18"));
}

#[test]
fn genomes_listing_empty_dir() {
    let dir = tempfile::tempdir().unwrap();
    dorina()
        .arg("genomes")
        .arg("-p")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No genomes available."));
}

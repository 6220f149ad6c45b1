//! Tests for the `sqb` binary
//!
//! - `translate`: per-dialect outcomes in every output format
//! - `emit`: batch files and the skip manifest
//! - `bench`: a full run against a fake engine script

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const QUERIES: &str = "q1\tSELECT ?x WHERE { ?x <is-a> <City> . } LIMIT 5\n\
                       q2\tSELECT ?x ?y WHERE { <word:berlin*> <in-context> ?c . ?x <in-context> ?c . ?x <p> ?y }\n\
                       q3\tSELECT ?x WHERE { ?x <p> ?y\n";

fn query_file(temp: &TempDir) -> std::path::PathBuf {
    let path = temp.path().join("queries.tsv");
    fs::write(&path, QUERIES).unwrap();
    path
}

fn sqb() -> Command {
    let mut cmd = Command::cargo_bin("sqb").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("SQB_VIRTUOSO_PWD");
    cmd
}

// ============================================================================
// Translate Command Tests
// ============================================================================

#[test]
fn test_translate_tsv_lists_every_outcome() {
    let temp = TempDir::new().unwrap();

    sqb()
        .arg("translate")
        .arg(query_file(&temp))
        .args(["-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "q1\tbroccoli\trewritten\t?s=$1 :r:is-a :e:City&query=$1",
        ))
        .stdout(predicate::str::contains("q2\trdf3x\tinexpressible\t"))
        .stdout(predicate::str::contains("q2\tbroccoli\tinexpressible\tmulti-variable projection"))
        .stdout(predicate::str::contains("q3\t-\tmalformed\t"));
}

#[test]
fn test_translate_single_dialect_json() {
    let temp = TempDir::new().unwrap();

    let output = sqb()
        .arg("translate")
        .arg(query_file(&temp))
        .args(["-d", "bif-contains-inc", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[..2].iter().all(|r| r["dialect"] == "bif-contains-inc"));
    assert!(rows[1]["text"]
        .as_str()
        .unwrap()
        .contains("?textc bif:contains \"'berlin*'\""));
}

#[test]
fn test_translate_unknown_dialect_fails() {
    let temp = TempDir::new().unwrap();

    sqb()
        .arg("translate")
        .arg(query_file(&temp))
        .args(["-d", "virtuoso"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dialect"));
}

#[test]
fn test_translate_missing_file_fails() {
    sqb()
        .args(["translate", "/nonexistent/queries.tsv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read query file"));
}

// ============================================================================
// Emit Command Tests
// ============================================================================

#[test]
fn test_emit_writes_batches_and_manifest() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("out");

    sqb()
        .arg("emit")
        .arg(query_file(&temp))
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("broccoli.queries"));

    for name in [
        "native.queries",
        "rdf3x.queries",
        "bif-contains.queries",
        "bif-contains-inc.queries",
        "broccoli.queries",
        "skipped.json",
    ] {
        assert!(out_dir.join(name).exists(), "{} missing", name);
    }

    let inc = fs::read_to_string(out_dir.join("bif-contains-inc.queries")).unwrap();
    assert_eq!(inc.lines().count(), 2);
    assert!(inc.lines().all(|l| l.starts_with("SPARQL ")));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("skipped.json")).unwrap()).unwrap();
    let rdf3x_skipped: Vec<_> = manifest["rdf3x"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(rdf3x_skipped, vec!["q2", "q3"]);
}

// ============================================================================
// Bench Command Tests
// ============================================================================

#[cfg(unix)]
#[test]
fn test_bench_against_fake_native_engine() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();

    // Called as `engine -i <index> -t --queryfile <file>`
    let engine = temp.path().join("engine.sh");
    fs::write(
        &engine,
        "#!/bin/sh\n\
         for last; do :; done\n\
         while read -r line; do\n\
         echo 'Number of matches (limit): 3'\n\
         echo 'Done. Time: 2 ms'\n\
         done < \"$last\"\n",
    )
    .unwrap();
    fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();

    let config = temp.path().join("config.toml");
    fs::write(
        &config,
        format!("[native]\nbinary = \"{}\"\nindex = \"idx\"\n", engine.display()),
    )
    .unwrap();

    sqb()
        .arg("-C")
        .arg(&config)
        .arg("bench")
        .arg(query_file(&temp))
        .args(["-d", "native", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id\tquery\tbifc\tbifc_inc\trdf3x\tnative\tbroccoli\n",
        ))
        .stdout(predicate::str::contains(
            "q1\tSELECT ?x WHERE { ?x <is-a> <City> . } LIMIT 5\t-\t-\t-\t2ms\t-",
        ))
        .stdout(predicate::str::contains("q3\tSELECT ?x WHERE { ?x <p> ?y\t-\t-\t-\t-\t-"));
}

#[test]
fn test_bench_without_password_still_reports() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "").unwrap();

    sqb()
        .arg("--config")
        .arg(&config)
        .arg("bench")
        .arg(query_file(&temp))
        .args(["-d", "bif-contains", "-f", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("requires a password"))
        .stdout(predicate::str::contains("\"status\": \"missing\""));
}

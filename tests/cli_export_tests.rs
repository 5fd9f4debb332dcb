//! End-to-end tests driving the dump2dot binary
//!
//! Each test writes a dump into a temp dir, runs the binary there and
//! inspects the output file.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WORKED_EXAMPLE: &str = "\
# object dump
0x1,nil,24,100,,root
0x2,0x1,24,50,child_of,leaf1
0x3,0x1,24,50,child_of,leaf2
";

fn write_dump(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("heap.txt");
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_default_output_is_a_dot() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.current_dir(dir.path()).arg(&dump).assert().success();

    let dot = read(&dir.path().join("a.dot"));
    assert!(dot.starts_with("strict digraph dump {"));
    assert!(dot.contains("200(100)\\n100.00%(50.00%)"));
    assert!(dot.contains("N1 -> N2[label = \"child_of\"];"));
    assert!(dot.contains("N1 -> N3[label = \"child_of\"];"));
}

#[test]
fn test_threshold_excludes_small_subtrees() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("--threshold")
        .arg("0.3")
        .assert()
        .success();

    let dot = read(&out);
    assert!(dot.contains("N1[label="));
    assert!(!dot.contains("leaf1"));
    assert!(!dot.contains("leaf2"));
}

#[test]
fn test_node_path_selects_subtree() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("leaf.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("--node")
        .arg("root;leaf1")
        .assert()
        .success();

    let dot = read(&out);
    assert!(dot.contains("leaf1"));
    assert!(!dot.contains("leaf2"));
    assert!(!dot.contains("->"));
}

#[test]
fn test_unresolved_selectors_warn_and_continue() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("-n")
        .arg("root;missing")
        .arg("-l")
        .arg("0xdead")
        .arg("-l")
        .arg("2")
        .assert()
        .success()
        .stderr(predicate::str::contains("No node found for path root;missing"))
        .stderr(predicate::str::contains("No node found for label 0xdead"));

    assert!(read(&out).contains("leaf1"));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(
        &dir,
        "0x1,nil,24,100,,root\nnot a record\n0x2,0x1,24,50,,leaf\n",
    );
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to parse line 2: not a record"));

    assert!(read(&out).contains("N1 -> N2"));
}

#[test]
fn test_depth_zero_emits_only_roots() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("-d")
        .arg("0")
        .assert()
        .success();

    let dot = read(&out);
    assert!(dot.contains("N0[label=\"NIL"));
    assert!(!dot.contains("N1["));
}

#[test]
fn test_critical_only() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(
        &dir,
        "0x1,nil,24,10,,root\n0x2,0x1,24,100,,big\n0x3,0x1,24,10,,small\n",
    );
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("--critical")
        .assert()
        .success();

    let dot = read(&out);
    assert!(dot.contains("big"));
    assert!(!dot.contains("small"));
    assert!(!dot.contains("fillcolor"));
}

#[test]
fn test_gml_and_graphml_default_names() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);

    for (format, file, marker) in [
        ("gml", "a.gml", "graph ["),
        ("graphml", "a.graphml", "<graphml"),
    ] {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
        cmd.current_dir(dir.path())
            .arg(&dump)
            .arg("--format")
            .arg(format)
            .assert()
            .success();
        assert!(read(&dir.path().join(file)).contains(marker));
    }
}

#[test]
fn test_summary_json_on_stdout() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("out.dot");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    let output = cmd
        .arg(&dump)
        .arg("-o")
        .arg(&out)
        .arg("--summary")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["nodes"], 4);
    assert_eq!(summary["tree_edges"], 3);
    assert_eq!(summary["roots"], 1);
    assert_eq!(summary["total_size"], 200.0);
    assert_eq!(summary["comment_lines"], 1);
    assert_eq!(summary["emitted_nodes"], 4);
    assert_eq!(summary["emitted_edges"], 3);
}

#[test]
fn test_config_file_with_flag_override() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);
    let out = dir.path().join("from_config.gml");
    let config = dir.path().join("dump2dot.toml");
    fs::write(
        &config,
        format!(
            "output = {:?}\nthreshold = 0.9\nformat = \"gml\"\n",
            out.to_str().unwrap()
        ),
    )
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("--config")
        .arg(&config)
        .arg("-t")
        .arg("0")
        .assert()
        .success();

    let gml = read(&out);
    assert!(gml.contains("label \"leaf2\""));
}

#[test]
fn test_invalid_threshold_rejected() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.current_dir(dir.path())
        .arg(&dump)
        .arg("-t")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Threshold must be between 0 and 1"));

    assert!(!dir.path().join("a.dot").exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.current_dir(dir.path())
        .arg("no_such_dump.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_dump.txt"));
}

#[test]
fn test_unwritable_output_fails() {
    let dir = TempDir::new().unwrap();
    let dump = write_dump(&dir, WORKED_EXAMPLE);

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dump2dot");
    cmd.arg(&dump)
        .arg("-o")
        .arg(dir.path().join("missing_dir").join("out.dot"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to export graph"));
}

//! Runs the `mixsyn` binary on generated designs

use mixsyn_net::{Design, Network, PartitionId, PartitionManager, Signal};
use std::path::Path;
use std::process::{Command, Output};

/// Ripple-carry adder with carries written as sums of products, one
/// partition per bit
fn adder(bits: usize) -> Design {
    let mut ntk = Network::new("adder");
    let mut assignment = Vec::new();
    let mut carry = Signal::new(ntk.add_input("cin"));

    for i in 0..bits {
        let a = Signal::new(ntk.add_input(format!("a{}", i)));
        let b = Signal::new(ntk.add_input(format!("b{}", i)));
        let ab = ntk.add_xor(a, b);
        let sum = ntk.add_xor(ab, carry);
        let t0 = ntk.add_and(a, b);
        let t1 = ntk.add_and(a, carry);
        let t2 = ntk.add_and(b, carry);
        let t = ntk.add_or(t0, t1);
        carry = ntk.add_or(t, t2);
        ntk.add_output(format!("s{}", i), sum);
        assignment.resize(ntk.size(), PartitionId(i as u32));
    }
    ntk.add_output("cout", carry);

    let manager = PartitionManager::new(&ntk, assignment).unwrap();
    Design::with_partitions(ntk, &manager)
}

fn mixsyn(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mixsyn"))
        .args(args)
        .output()
        .expect("Failed to run mixsyn")
}

fn write_design(dir: &Path, bits: usize) -> String {
    let path = dir.join("adder.json");
    adder(bits).save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_optimize_writes_changed_network() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 4);
    let out = dir.path().join("adder.blif");

    let output = mixsyn(&["optimize", &design, "-c", "-o", out.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Final ntk size = "));
    assert!(stdout.contains("Area Delay Product = "));
    assert!(stdout.contains("Resulting network written to"));

    let blif = std::fs::read_to_string(&out).unwrap();
    assert!(blif.starts_with(".model adder"));
}

#[test]
fn test_skipping_everything_reports_no_change() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 2);
    let out = dir.path().join("adder.v");

    let output = mixsyn(&[
        "optimize",
        &design,
        "--skip-partitions",
        "0,1",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No change made to network"));
    assert!(!out.exists());
}

#[test]
fn test_unsupported_output_is_rejected_after_optimizing() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 2);
    let out = dir.path().join("result.txt");
    let saved = dir.path().join("optimized.json");

    let output = mixsyn(&[
        "optimize",
        &design,
        "-c",
        "--save",
        saved.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Final ntk size = "));
    assert!(saved.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is not an accepted output file {.v, .blif}"));
    assert!(!out.exists());
}

#[test]
fn test_global_flags_are_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 2);
    let out = dir.path().join("adder.v");

    let output = mixsyn(&["optimize", &design, "--aig", "--mig", "-o", out.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("mutually exclusive"));
    assert!(!out.exists());
}

#[test]
fn test_config_file_and_saved_design() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 3);
    let config = dir.path().join("run.toml");
    std::fs::write(
        &config,
        "strategy = 2\ncombine = true\n\n[partitions]\ndepth = [0, 1, 2]\n",
    )
    .unwrap();
    let saved = dir.path().join("optimized.json");

    let output = mixsyn(&[
        "optimize",
        &design,
        "--config",
        config.to_str().unwrap(),
        "--save",
        saved.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let optimized = Design::load(&saved).unwrap();
    let original = adder(3);
    assert!(optimized.partitions.is_none());
    assert!(optimized.network.depth() < original.network.depth());
    assert!(mixsyn_net::equivalent(&original.network, &optimized.network, 8).unwrap());
}

#[test]
fn test_stats_lists_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let design = write_design(dir.path(), 3);

    let output = mixsyn(&["stats", &design]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Network Statistics:"));
    assert!(stdout.contains("Partitions: 3"));
    assert!(stdout.contains("P1:"));
}

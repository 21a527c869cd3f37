//! Integration tests for patchbay-cli.
//!
//! Tests cover the binary invocation of both commands, config file handling
//! and argument validation.

use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `patchbay` binary built by cargo.
fn patchbay_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_patchbay"))
}

fn run_ok(args: &[&str]) -> String {
    let output = patchbay_bin()
        .args(args)
        .output()
        .expect("failed to run patchbay");
    assert!(
        output.status.success(),
        "patchbay {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// `patchbay inspect`
// ---------------------------------------------------------------------------

#[test]
fn cli_inspect_chain_lists_nodes_and_sequence() {
    let stdout = run_ok(&["inspect"]);

    for name in ["Sine", "Pre", "Level", "Audio Output"] {
        assert!(stdout.contains(name), "missing node {name}:\n{stdout}");
    }
    assert!(stdout.contains("Render sequence"));
    assert!(stdout.contains("ProcessNode"));
    assert!(stdout.contains("ProcessIo"));
    assert!(stdout.contains("Buffers:"));
}

#[test]
fn cli_inspect_diamond_sums_into_level() {
    let stdout = run_ok(&["inspect", "--demo", "diamond"]);
    assert!(stdout.contains("Left"));
    assert!(stdout.contains("Right"));
    assert!(
        stdout.contains("AddAudio"),
        "fan-in should compile to a sum:\n{stdout}"
    );
}

#[test]
fn cli_inspect_subgraph_marks_nested_graph() {
    let stdout = run_ok(&["inspect", "--demo", "subgraph"]);
    assert!(stdout.contains("Inner"));
    assert!(stdout.contains("[subgraph]"));
}

#[test]
fn cli_inspect_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.toml");
    std::fs::write(
        &path,
        "name = \"Studio\"\nsample_rate = 44100\nblock_size = 32\n",
    )
    .unwrap();

    let stdout = run_ok(&["inspect", "--config", path.to_str().unwrap()]);
    assert!(stdout.contains("Studio"));
    assert!(stdout.contains("44100 Hz"));
    assert!(stdout.contains("Block Size:  32"));
}

#[test]
fn cli_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.toml");
    std::fs::write(&path, "block_size = 32\n").unwrap();

    let stdout = run_ok(&[
        "inspect",
        "--config",
        path.to_str().unwrap(),
        "--block-size",
        "128",
        "--channels",
        "1",
    ]);
    assert!(stdout.contains("Block Size:  128"));
    assert!(stdout.contains("1 in / 1 out"));
}

#[test]
fn cli_inspect_saves_effective_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("graph.toml");

    run_ok(&[
        "inspect",
        "--sample-rate",
        "96000",
        "--save-config",
        path.to_str().unwrap(),
    ]);

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("sample_rate = 96000"), "saved:\n{saved}");
}

// ---------------------------------------------------------------------------
// `patchbay run`
// ---------------------------------------------------------------------------

#[test]
fn cli_run_applies_control_thread_gain() {
    let stdout = run_ok(&["run", "--blocks", "8", "--gain", "0.5"]);

    assert!(stdout.contains("Rendered 8 blocks"));
    assert!(stdout.contains("Level"));
    // 0.5 sine through Pre (0.5) and Level (0.5)
    assert!(
        stdout.contains("Output peak: 0.12"),
        "unexpected peak:\n{stdout}"
    );
}

#[test]
fn cli_run_every_demo() {
    for demo in ["chain", "diamond", "subgraph"] {
        let stdout = run_ok(&["run", "--demo", demo, "--blocks", "4"]);
        assert!(stdout.contains("Output peak:"));
        assert!(!stdout.contains("Output peak: 0.0000"), "{demo} is silent");
    }
}

#[test]
fn cli_run_zero_gain_is_silent() {
    let stdout = run_ok(&["run", "--blocks", "4", "--gain", "0"]);
    assert!(stdout.contains("Output peak: 0.0000"), "{stdout}");
}

// ---------------------------------------------------------------------------
// Error cases
// ---------------------------------------------------------------------------

#[test]
fn cli_rejects_zero_block_size() {
    let output = patchbay_bin()
        .args(["inspect", "--block-size", "0"])
        .output()
        .expect("failed to run patchbay");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("block_size"), "stderr:\n{stderr}");
}

#[test]
fn cli_rejects_missing_config_file() {
    let output = patchbay_bin()
        .args(["run", "--config", "/nonexistent/graph.toml"])
        .output()
        .expect("failed to run patchbay");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read file"), "stderr:\n{stderr}");
}

#[test]
fn cli_rejects_unknown_demo() {
    let output = patchbay_bin()
        .args(["inspect", "--demo", "ring"])
        .output()
        .expect("failed to run patchbay");
    assert!(!output.status.success());
}

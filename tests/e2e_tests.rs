//! End-to-end tests for the perfrun binary
//!
//! Each test writes small shell-script probes into a temporary probe
//! directory and runs the real binary against it with `--no-interpreter`,
//! so the full path from process launch to printed report is exercised.

#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const RULE: &str = "==============================";

/// Probe directory populated with shell stubs
struct ProbeDir {
    dir: TempDir,
}

impl ProbeDir {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn with_probe(self, name: &str, body: &str) -> Self {
        let path = self.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    /// A command running the binary against this directory
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("perfrun").unwrap();
        cmd.current_dir(self.path())
            .arg("--probe-dir")
            .arg(self.path())
            .arg("--no-interpreter")
            .arg("--no-color")
            .env_remove("PROBE_DIR")
            .env_remove("PROBE_INTERPRETER")
            .env_remove("SERVER_GRACE_MS")
            .env_remove("SERVER_TEARDOWN_MS")
            .env_remove("OUTPUT_FORMAT")
            .env_remove("ENABLE_COLOR");
        cmd
    }
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "perfrun failed: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_cpu_only_report() {
    let probes = ProbeDir::new().with_probe(
        "cputest.py",
        "echo 'Searching for primes...'\necho 'Total Primes Found: 42'\necho 'Time Taken: 1.00 seconds'",
    );

    let stdout = stdout_of(&mut probes.command());

    assert!(stdout.starts_with(&format!("{}\n  Comprehensive Performance Overview\n{}\n", RULE, RULE)));
    assert!(stdout.contains("--- CPU Performance Test (Heavy CPU) ---\n  Primes Found: 42\n  Time Taken: 1.00 seconds\n"));
    assert_eq!(stdout.matches("--- ").count(), 1);
    assert!(stdout.ends_with(&format!("\n{}\n", RULE)));
}

#[test]
fn test_no_probes_reports_no_data() {
    let probes = ProbeDir::new();

    probes
        .command()
        .assert()
        .success()
        .stdout(format!(
            "{}\n  Comprehensive Performance Overview\n{}\nNo performance data collected from any scripts.\n",
            RULE, RULE
        ))
        .stderr(predicate::str::contains("Network server failed to start, skipping client test."));
}

#[test]
fn test_failing_probe_is_not_parsed() {
    let probes = ProbeDir::new()
        .with_probe("memorytest.py", "echo 'Total Allocation Cycles: 500'\necho 'MemoryError' >&2\nexit 1")
        .with_probe("fileiotest.py", "echo 'Write Speed: 120.456 MB/s'\necho 'Read Speed: NaN MB/s'");

    let output = probes.command().output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Memory Performance Test"));
    assert!(stdout.contains("  Write Speed: 120.46 MB/s\n"));
    assert!(stdout.contains("  Read Speed: N/A\n"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("memorytest.py"));
    assert!(stderr.contains("Errors from memorytest.py"));
    assert!(stderr.contains("MemoryError"));
}

#[test]
fn test_report_sections_in_fixed_order() {
    let probes = ProbeDir::new()
        .with_probe("gputest.py", "echo 'Total Matrix Multiplications (size 64x64): 300'\necho 'Time Taken: 2.5 seconds'")
        .with_probe("2dtest.py", "echo 'Total Sprites Generated: 800'\necho 'Average FPS: 59.941'")
        .with_probe("mcseedgen.py", "echo 'Generated 1000 seeds in 0.42 seconds.'");

    let stdout = stdout_of(&mut probes.command());

    let pos_2d = stdout.find("--- 2D Pygame Test (Graphics) ---").unwrap();
    let pos_mc = stdout.find("--- Minecraft Seed Gen Test (Light CPU) ---").unwrap();
    let pos_gpu = stdout.find("--- Simulated GPU Compute Test (CPU-based) ---").unwrap();
    assert!(pos_2d < pos_mc && pos_mc < pos_gpu);

    assert!(stdout.contains("  Total Sprites: 800\n  Lowest FPS: N/A\n  Highest FPS: N/A\n  Average FPS: 59.94\n"));
    assert!(stdout.contains("  Seeds Generated: 1000\n  Generation Time: 0.42 seconds\n"));
    assert!(stdout.contains("  Matrix Multiplications: 300\n  Time Taken: 2.50 seconds\n"));
}

#[test]
fn test_network_pair_report_and_teardown() {
    let probes = ProbeDir::new()
        .with_probe("nettest_server.py", "echo $$ > server.pid\nexec sleep 30")
        .with_probe("nettest_client.py", "echo 'Send Speed: 10.50 MB/s'\necho 'Receive Speed: 9.25 MB/s'");

    let start = Instant::now();
    let stdout = stdout_of(
        probes
            .command()
            .arg("--grace-period")
            .arg("200")
            .arg("--teardown-timeout")
            .arg("3000"),
    );

    assert!(start.elapsed() < Duration::from_secs(20));
    assert!(stdout.contains("--- Network Performance Test (Loopback) ---\n  Send Speed: 10.50 MB/s\n  Receive Speed: 9.25 MB/s\n"));

    let pid = fs::read_to_string(probes.path().join("server.pid")).unwrap();
    let pid = pid.trim();
    let alive = Command::new("kill").arg("-0").arg(pid).status().unwrap().success();
    assert!(!alive, "network server {} survived the run", pid);
}

#[test]
fn test_stubborn_server_is_killed() {
    let probes = ProbeDir::new()
        .with_probe("nettest_server.py", "trap '' TERM\necho $$ > server.pid\nwhile true; do sleep 0.1; done")
        .with_probe("nettest_client.py", "echo 'Send Speed: 1.00 MB/s'");

    let output = probes
        .command()
        .arg("--grace-period")
        .arg("200")
        .arg("--teardown-timeout")
        .arg("300")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("killed after teardown timeout"));

    let pid = fs::read_to_string(probes.path().join("server.pid")).unwrap();
    let alive = Command::new("kill").arg("-0").arg(pid.trim()).status().unwrap().success();
    assert!(!alive);
}

#[test]
fn test_client_failure_still_stops_server() {
    let probes = ProbeDir::new()
        .with_probe("nettest_server.py", "echo $$ > server.pid\nexec sleep 30")
        .with_probe("nettest_client.py", "echo 'ConnectionRefusedError' >&2\nexit 1");

    let stdout = stdout_of(probes.command().arg("--grace-period").arg("100"));
    assert!(stdout.contains("No performance data collected from any scripts."));

    let pid = fs::read_to_string(probes.path().join("server.pid")).unwrap();
    let alive = Command::new("kill").arg("-0").arg(pid.trim()).status().unwrap().success();
    assert!(!alive);
}

#[test]
fn test_json_output() {
    let probes = ProbeDir::new().with_probe("cputest.py", "echo 'Total Primes Found: 42'\necho 'Time Taken: 1.00 seconds'");

    let stdout = stdout_of(probes.command().arg("--format").arg("json"));
    let value: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(value["metrics"]["CPU Primes Found"], 42);
    assert_eq!(value["metrics"]["CPU Time Taken (s)"], 1.0);

    let probes_run = value["probes"].as_array().unwrap();
    assert_eq!(probes_run.len(), 9);
    assert_eq!(probes_run[3]["probe"], "cputest.py");
    assert_eq!(probes_run[3]["status"], "Success");
    assert_eq!(probes_run[8]["status"], "Skipped");
    assert!(value["network"]["server_error"].is_string());
}

#[test]
fn test_verbose_adds_run_summary() {
    let probes = ProbeDir::new().with_probe("cputest.py", "echo 'Total Primes Found: 42'");

    let output = probes.command().arg("--verbose").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Run Summary:"));
    assert!(stdout.contains("Probes Attempted: 8"));
    assert!(stdout.contains("Succeeded:        1"));
    assert!(stdout.contains("Not Found:        7"));
    assert!(stdout.contains("Skipped:          1"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Running cputest.py..."));
}

#[test]
fn test_interpreter_launches_probe_files() {
    let probes = ProbeDir::new();
    fs::write(probes.path().join("cputest.py"), "echo 'Total Primes Found: 7'\n").unwrap();

    let mut cmd = Command::cargo_bin("perfrun").unwrap();
    cmd.current_dir(probes.path())
        .arg("--probe-dir")
        .arg(probes.path())
        .arg("--interpreter")
        .arg("sh")
        .arg("--no-color")
        .env_remove("PROBE_DIR")
        .env_remove("PROBE_INTERPRETER");

    let stdout = stdout_of(&mut cmd);
    assert!(stdout.contains("  Primes Found: 7\n"));
}

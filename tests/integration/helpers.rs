//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Two edge routers, a core switch and a line card inside edge-a.
///
/// | id | circuit | terminations         |
/// |----|---------|----------------------|
/// | 10 | C1      | edge-a, -            |
/// | 20 | C2      | edge-b, -            |
/// | 30 | C3      | edge-a, edge-b       |
/// | 40 | C4      | linecard-1, -        |
/// | 50 | LOOP    | core-1, core-1       |
pub const SNAPSHOT: &str = r#"{
  "devices": [
    { "id": 1, "name": "edge-a" },
    { "id": 2, "name": "edge-b" },
    { "id": 3, "name": "core-1" },
    { "id": 4, "name": "linecard-1", "parent": 1 }
  ],
  "circuits": [
    { "id": 10, "cid": "C1", "terminations": [{ "device": 1 }, { "device": null }] },
    { "id": 20, "cid": "C2", "terminations": [{ "device": 2 }, { "device": null }] },
    { "id": 30, "cid": "C3", "terminations": [{ "device": 1 }, { "device": 2 }] },
    { "id": 40, "cid": "C4", "terminations": [{ "device": 4 }, { "device": null }] },
    { "id": 50, "cid": "LOOP", "terminations": [{ "device": 3 }, { "device": 3 }] }
  ],
  "interfaces": [
    { "id": 100, "name": "xe-0/0/0", "device": 1 },
    { "id": 101, "name": "xe-0/0/1", "device": 2 }
  ]
}"#;

/// A scratch directory holding a topology snapshot
pub struct TestTopology {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestTopology {
  /// Create a directory with the default snapshot at `topology.json`
  pub fn new() -> Result<Self> {
    Self::with_snapshot(SNAPSHOT)
  }

  pub fn with_snapshot(snapshot: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    std::fs::write(path.join("topology.json"), snapshot)?;
    Ok(Self { _root: root, path })
  }

  pub fn snapshot_path(&self) -> String {
    self.path.join("topology.json").display().to_string()
  }

  /// Write a file relative to the directory
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Run with `--snapshot` pointing at this topology; fails on non-zero exit
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let snapshot = self.snapshot_path();
    let mut full_args = args.to_vec();
    full_args.extend(["--snapshot", snapshot.as_str()]);
    run_netbox_impact(&self.path, &full_args)
  }

  /// Like [`TestTopology::run`] but returns the output whatever the exit status
  pub fn run_raw(&self, args: &[&str]) -> Result<Output> {
    let snapshot = self.snapshot_path();
    let mut full_args = args.to_vec();
    full_args.extend(["--snapshot", snapshot.as_str()]);
    run_netbox_impact_raw(&self.path, &full_args)
  }
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}

/// Run netbox-impact without checking the exit status
pub fn run_netbox_impact_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_netbox-impact");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("NETBOX_TOKEN")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run netbox-impact")
}

/// Run netbox-impact CLI command
pub fn run_netbox_impact(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_netbox_impact_raw(cwd, args)?;

  if !output.status.success() {
    anyhow::bail!(
      "netbox-impact command failed: netbox-impact {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout(&output),
      stderr(&output)
    );
  }

  Ok(output)
}

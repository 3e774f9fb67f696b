//! Integration tests for config discovery and topology source selection

use crate::helpers::{TestTopology, run_netbox_impact_raw, stderr, stdout};
use anyhow::Result;

#[test]
fn test_config_mode_applies_without_flag() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file(".config/impact.toml", "[analysis]\nmode = \"transitive\"\n")?;

  let output = topo.run(&["analyze", "--devices", "1", "--format", "names-only"])?;

  assert_eq!(stdout(&output).trim(), "C1\nC3\nC4");
  Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file("conf/custom.toml", "[weights]\ncircuit = 10.0\n")?;

  let output = topo.run(&["score", "--circuits", "10", "--config", "conf/custom.toml", "--json"])?;
  let result: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(result["total_impact"].as_f64(), Some(10.0));
  Ok(())
}

#[test]
fn test_missing_explicit_config() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["devices", "--config", "nope.toml"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("nope.toml"));
  Ok(())
}

#[test]
fn test_invalid_config_value() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file("impact.toml", "[weights]\ndevice = -1.0\n")?;

  let output = topo.run_raw(&["devices"])?;

  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_netbox_url_requires_token() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = run_netbox_impact_raw(
    &topo.path,
    &["devices", "--netbox-url", "http://127.0.0.1:9"],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("No NetBox API token available"));
  Ok(())
}

#[test]
fn test_snapshot_conflicts_with_netbox_url() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["devices", "--netbox-url", "http://127.0.0.1:9"])?;

  assert!(!output.status.success());
  Ok(())
}

//! Integration tests for `netbox-impact manifest`

use crate::helpers::{run_netbox_impact, stdout};
use anyhow::Result;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn test_manifest_json() -> Result<()> {
  let dir = TempDir::new()?;

  // No snapshot and no config: the manifest needs neither
  let output = run_netbox_impact(dir.path(), &["manifest", "--json"])?;
  let manifest: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(manifest["name"], "netbox_impact");
  assert_eq!(manifest["verbose_name"], "NetBox Impact Analysis");
  assert_eq!(manifest["base_url"], "impact-analysis");
  assert_eq!(manifest["version"], env!("CARGO_PKG_VERSION"));
  Ok(())
}

#[test]
fn test_manifest_text() -> Result<()> {
  let dir = TempDir::new()?;

  let output = run_netbox_impact(dir.path(), &["manifest"])?;
  let text = stdout(&output);

  assert!(text.contains("NetBox Impact Analysis (netbox_impact)"));
  assert!(text.contains("Base URL: /plugins/impact-analysis/"));
  Ok(())
}

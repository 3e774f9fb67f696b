//! Integration tests for `netbox-impact devices`

use crate::helpers::{TestTopology, stdout};
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_devices_lists_all_choices() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["devices"])?;
  let text = stdout(&output);

  assert!(text.contains("Select Devices"));
  assert!(text.contains("Select one or more devices to analyze for circuit impact."));
  for name in ["edge-a", "edge-b", "core-1", "linecard-1"] {
    assert!(text.contains(name), "missing {}", name);
  }
  assert!(text.contains("(in #1)"));
  Ok(())
}

#[test]
fn test_devices_filter_json() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["devices", "--filter", "edge", "--json"])?;
  let form: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(form["field"], "devices");
  assert_eq!(form["required"], true);
  let ids: Vec<u64> = form["choices"]
    .as_array()
    .map(|c| c.iter().filter_map(|d| d["id"].as_u64()).collect())
    .unwrap_or_default();
  assert_eq!(ids, vec![1, 2]);
  Ok(())
}

#[test]
fn test_devices_no_match() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["devices", "--filter", "spine"])?;

  assert!(stdout(&output).contains("No matching devices"));
  Ok(())
}

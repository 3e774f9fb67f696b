//! Integration tests for `netbox-impact analyze`

use crate::helpers::{TestTopology, stderr, stdout};
use anyhow::Result;
use serde_json::Value;

fn aggregate_cids(report: &Value) -> Vec<String> {
  report["aggregate"]
    .as_array()
    .map(|items| items.iter().filter_map(|c| c["cid"].as_str().map(String::from)).collect())
    .unwrap_or_default()
}

#[test]
fn test_analyze_single_device() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["analyze", "--devices", "1", "--format", "names-only"])?;
  let lines: Vec<String> = stdout(&output).lines().map(String::from).collect();

  assert_eq!(lines, vec!["C1", "C3"]);
  Ok(())
}

#[test]
fn test_analyze_shared_circuit_is_counted_once() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["analyze", "--devices", "1,2", "--format", "json"])?;
  let report: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(aggregate_cids(&report), vec!["C1", "C2", "C3"]);
  assert_eq!(report["summary"]["selected_count"], 2);
  assert_eq!(report["summary"]["impacted_circuit_count"], 3);
  assert_eq!(report["mode"], "direct");

  let devices = report["devices"].as_array().cloned().unwrap_or_default();
  assert_eq!(devices.len(), 2);
  assert_eq!(devices[0]["name"], "edge-a");
  assert_eq!(devices[1]["circuits"].as_array().map(|c| c.len()), Some(2));
  Ok(())
}

#[test]
fn test_analyze_repeated_and_duplicate_ids() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["analyze", "--devices", "2", "--devices", "2,1", "--format", "json"])?;
  let report: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(report["summary"]["selected_count"], 2);
  assert_eq!(report["devices"][0]["id"], 2);
  Ok(())
}

#[test]
fn test_analyze_direct_stays_on_the_device() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["analyze", "--devices", "4", "--format", "json", "--mode", "direct"])?;
  let report: Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(aggregate_cids(&report), vec!["C4"]);

  let output = topo.run(&["analyze", "--devices", "2", "--format", "names-only"])?;
  assert_eq!(stdout(&output).trim(), "C2\nC3");
  Ok(())
}

#[test]
fn test_analyze_transitive_follows_parent_links() -> Result<()> {
  let topo = TestTopology::new()?;

  let direct = topo.run(&["analyze", "--devices", "1", "--format", "names-only"])?;
  assert!(!stdout(&direct).contains("C4"));

  let output = topo.run(&["analyze", "--devices", "1", "--mode", "transitive", "--format", "json"])?;
  let report: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(aggregate_cids(&report), vec!["C1", "C3", "C4"]);
  assert_eq!(report["mode"], "transitive");
  assert_eq!(report["devices"][0]["dependents"], serde_json::json!([4]));
  Ok(())
}

#[test]
fn test_analyze_empty_selection_is_rejected() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["analyze"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("This field is required."));
  assert!(stdout(&output).is_empty());
  Ok(())
}

#[test]
fn test_analyze_unknown_device_is_rejected() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["analyze", "--devices", "1,99"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("99 is not one of the available choices"));
  Ok(())
}

#[test]
fn test_analyze_non_numeric_device_is_rejected() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["analyze", "--devices", "edge-a"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("'edge-a' is not a valid device id."));
  Ok(())
}

#[test]
fn test_analyze_text_output() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["analyze", "--devices", "1"])?;
  let text = stdout(&output);

  assert!(text.contains("Impact Analysis"));
  assert!(text.contains("edge-a (#1): 2 circuits"));
  assert!(text.contains("Impacted circuits: 2"));
  Ok(())
}

#[test]
fn test_analyze_with_score() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&[
    "analyze",
    "--devices",
    "3",
    "--score",
    "--impact-type",
    "electrical-work",
    "--format",
    "json",
  ])?;
  let report: Value = serde_json::from_str(&stdout(&output))?;

  // device 5 + implicit core-1 5 + LOOP 3 * 0.8, doubled
  let total = report["score"]["total_impact"].as_f64().unwrap_or_default();
  assert!((total - 24.8).abs() < 1e-9, "unexpected total {}", total);
  assert_eq!(report["score"]["impact_type"], "electrical-work");
  Ok(())
}

#[test]
fn test_analyze_unknown_format() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["analyze", "--devices", "1", "--format", "xml"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Unknown format 'xml'"));
  Ok(())
}

#[test]
fn test_analyze_missing_snapshot() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = crate::helpers::run_netbox_impact_raw(
    &topo.path,
    &["analyze", "--devices", "1", "--snapshot", "does-not-exist.json"],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("does-not-exist.json"));
  Ok(())
}

#[test]
fn test_analyze_without_topology_source() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = crate::helpers::run_netbox_impact_raw(&topo.path, &["analyze", "--devices", "1"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("No topology source configured"));
  Ok(())
}

//! Integration tests for `netbox-impact score`

use crate::helpers::{TestTopology, stderr, stdout};
use anyhow::Result;
use serde_json::Value;

fn total(output: &std::process::Output) -> Result<f64> {
  let result: Value = serde_json::from_str(&stdout(output))?;
  Ok(result["total_impact"].as_f64().unwrap_or(f64::NAN))
}

#[test]
fn test_score_weights_each_category() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&[
    "score",
    "--devices",
    "1",
    "--circuits",
    "10,30",
    "--interfaces",
    "100",
    "--json",
  ])?;

  // 5 + 3 + 3 + 1
  assert!((total(&output)? - 12.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_looped_circuit() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["score", "--circuits", "50", "--json"])?;
  let result: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(result["breakdown"]["circuits"]["items"][0]["redundancy_factor"], 0.8);
  assert_eq!(result["breakdown"]["implicit_devices"]["count"], 1);
  // 3 * 0.8 + implicit core-1
  assert!((total(&output)? - 7.4).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_impact_type_multiplier() -> Result<()> {
  let topo = TestTopology::new()?;

  let planned = topo.run(&["score", "--devices", "1,2", "--json"])?;
  let incident = topo.run(&["score", "--devices", "1,2", "--impact-type", "incident-work", "--json"])?;

  assert!((total(&planned)? - 10.0).abs() < 1e-9);
  assert!((total(&incident)? - 100.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_duplicate_ids_count_once() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["score", "--devices", "1,1", "--devices", "1", "--json"])?;

  assert!((total(&output)? - 5.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_text_output() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["score", "--circuits", "20", "--impact-type", "fiber-works"])?;
  let text = stdout(&output);

  assert!(text.contains("Impact Score (fiber-works)"));
  assert!(text.contains("Total impact:            4.50"));
  Ok(())
}

#[test]
fn test_score_nothing_selected() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["score"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Nothing to score"));
  Ok(())
}

#[test]
fn test_score_unknown_impact_type() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["score", "--devices", "1", "--impact-type", "weather"])?;

  assert_ne!(output.status.code(), Some(0));
  assert!(stderr(&output).contains("weather"));
  Ok(())
}

#[test]
fn test_score_unknown_circuit() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run_raw(&["score", "--circuits", "999"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Circuit 999 not found"));
  Ok(())
}

#[test]
fn test_score_uses_configured_weights() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file(
    "impact.toml",
    r#"
[weights]
device = 2.0

[analysis]
impact_type = "fiber-works"
"#,
  )?;

  let output = topo.run(&["score", "--devices", "1", "--json"])?;
  let result: Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(result["impact_type"], "fiber-works");
  assert!((total(&output)? - 3.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_space_separated_ids() -> Result<()> {
  let topo = TestTopology::new()?;

  let output = topo.run(&["score", "--circuits", "10 30", "--json"])?;

  assert!((total(&output)? - 6.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_from_request_file() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file(
    "request.json",
    r#"{"device_ids":[1],"circuit_ids":[50],"interface_ids":[100,101],"impact_type":"incident-work"}"#,
  )?;

  let output = topo.run(&["score", "--request", "request.json", "--json"])?;
  let result: Value = serde_json::from_str(&stdout(&output))?;

  // 10 * (5 + 5 implicit + 2.4 + 2)
  assert_eq!(result["impact_type"], "incident-work");
  assert!((total(&output)? - 144.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_flag_overrides_request_impact_type() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file("request.json", r#"{"device_ids":[1],"impact_type":"incident-work"}"#)?;

  let output = topo.run(&["score", "--request", "request.json", "--impact-type", "planned-work", "--json"])?;

  assert!((total(&output)? - 5.0).abs() < 1e-9);
  Ok(())
}

#[test]
fn test_score_request_conflicts_with_id_flags() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file("request.json", r#"{"device_ids":[1]}"#)?;

  let output = topo.run_raw(&["score", "--request", "request.json", "--devices", "2"])?;

  assert!(!output.status.success());
  Ok(())
}

#[test]
fn test_score_invalid_request_file() -> Result<()> {
  let topo = TestTopology::new()?;
  topo.write_file("request.json", r#"{"device_ids":"all"}"#)?;

  let output = topo.run_raw(&["score", "--request", "request.json"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Invalid score request in"));
  Ok(())
}

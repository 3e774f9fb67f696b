//! `netbox-impact analyze` - Show which circuits are impacted by device outages
//!
//! This command takes a device selection through the analysis form and reports:
//! - Which circuits terminate on each selected device
//! - In transitive mode, which dependent devices go down with it
//! - The union of impacted circuits, optionally scored

use crate::core::context::AnalysisContext;
use crate::core::error::{ImpactError, ImpactResult};
use crate::forms::DeviceImpactAnalysisForm;
use crate::graph::impact::{self, ImpactAnalysis, ResolveMode};
use crate::graph::Topology;
use crate::score::{self, ImpactType, ScoreRequest, ScoreResult};
use crate::store::{CircuitId, DeviceId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Output format for analyze command
#[derive(Debug, Clone, Copy)]
enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  fn from_str(s: &str) -> ImpactResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(ImpactError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names-only",
        s
      ))),
    }
  }
}

#[derive(Debug, Serialize)]
struct CircuitRef {
  id: CircuitId,
  cid: String,
}

#[derive(Debug, Serialize)]
struct DeviceReport {
  id: DeviceId,
  name: String,
  circuits: Vec<CircuitRef>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  dependents: Vec<DeviceId>,
}

#[derive(Debug, Serialize)]
struct Summary {
  selected_count: usize,
  impacted_circuit_count: usize,
}

/// Serialisable view of an analysis run.
#[derive(Debug, Serialize)]
pub(crate) struct AnalysisReport {
  generated_at: DateTime<Utc>,
  source: String,
  topology_digest: String,
  mode: ResolveMode,
  devices: Vec<DeviceReport>,
  aggregate: Vec<CircuitRef>,
  summary: Summary,
  #[serde(skip_serializing_if = "Option::is_none")]
  score: Option<ScoreResult>,
}

impl AnalysisReport {
  pub(crate) fn new(topology: &Topology, analysis: &ImpactAnalysis, score: Option<ScoreResult>) -> Self {
    let circuit_refs = |ids: &BTreeSet<CircuitId>| -> Vec<CircuitRef> {
      ids
        .iter()
        .map(|&id| CircuitRef {
          id,
          cid: topology.circuit(id).map(|c| c.cid.clone()).unwrap_or_default(),
        })
        .collect()
    };

    // Selection order, so the report reads the way the user asked
    let devices = analysis
      .selection
      .ids()
      .iter()
      .map(|&id| DeviceReport {
        id,
        name: topology.device(id).map(|d| d.name.clone()).unwrap_or_default(),
        circuits: analysis.impact.per_device.get(&id).map(circuit_refs).unwrap_or_default(),
        dependents: analysis
          .impact
          .dependents
          .get(&id)
          .map(|d| d.iter().copied().collect())
          .unwrap_or_default(),
      })
      .collect();

    Self {
      generated_at: Utc::now(),
      source: topology.source().to_string(),
      topology_digest: topology.digest().to_string(),
      mode: analysis.mode,
      devices,
      aggregate: circuit_refs(&analysis.impact.aggregate),
      summary: Summary {
        selected_count: analysis.selection.ids().len(),
        impacted_circuit_count: analysis.impact.aggregate.len(),
      },
      score,
    }
  }
}

/// Run the analyze command
pub fn run_analyze(
  ctx: &AnalysisContext,
  devices: Vec<String>,
  mode: Option<String>,
  format: String,
  with_score: bool,
  impact_type: Option<String>,
) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&format)?;
  let mode = match mode {
    Some(m) => m.parse::<ResolveMode>()?,
    None => ctx.config.analysis.mode,
  };
  let impact_type = match impact_type {
    Some(t) => t.parse::<ImpactType>()?,
    None => ctx.config.analysis.impact_type,
  };

  let form = DeviceImpactAnalysisForm::new(ctx.topology.as_ref());
  let selection = form.validate(&devices)?;

  let analysis = impact::analyze(&ctx.topology, &selection, mode)?;
  tracing::info!(
    selected = selection.ids().len(),
    impacted = analysis.impact.aggregate.len(),
    mode = %mode,
    "impact analysis complete"
  );
  if analysis.impact.is_empty() {
    tracing::info!("no circuits terminate on the selected devices");
  }

  let score = if with_score {
    Some(score_analysis(ctx, &analysis, impact_type)?)
  } else {
    None
  };

  let report = AnalysisReport::new(&ctx.topology, &analysis, score);
  match output_format {
    OutputFormat::Text => display_text(&report),
    OutputFormat::Json => display_json(&report)?,
    OutputFormat::NamesOnly => display_names_only(&report),
  }

  Ok(())
}

/// Score the selected devices plus every circuit the analysis found.
pub(crate) fn score_analysis(
  ctx: &AnalysisContext,
  analysis: &ImpactAnalysis,
  impact_type: ImpactType,
) -> ImpactResult<ScoreResult> {
  let request = ScoreRequest {
    device_ids: analysis.selection.ids().iter().copied().collect(),
    circuit_ids: analysis.impact.aggregate.clone(),
    interface_ids: BTreeSet::new(),
    impact_type,
  };
  score::calculate(&ctx.topology, &request, &ctx.config.scoring_policy())
}

/// Display results in human-readable text format
pub(crate) fn display_text(report: &AnalysisReport) {
  println!("Impact Analysis");
  println!("===============");
  println!();
  println!("Topology: {} (digest {})", report.source, report.topology_digest);
  println!("Mode: {}", report.mode);
  println!();

  for device in &report.devices {
    println!("📦 {} (#{}): {} circuits", device.name, device.id, device.circuits.len());
    for circuit in &device.circuits {
      println!("   🔌 {} (#{})", circuit.cid, circuit.id);
    }
    for dependent in &device.dependents {
      println!("   ⬇  device #{} depends on it", dependent);
    }
  }
  println!();

  println!("Impacted circuits: {}", report.summary.impacted_circuit_count);
  for circuit in &report.aggregate {
    println!("  🎯 {} (#{})", circuit.cid, circuit.id);
  }

  if let Some(ref score) = report.score {
    println!();
    super::score::display_score_text(score);
  }
}

/// Display results in JSON format
fn display_json(report: &AnalysisReport) -> ImpactResult<()> {
  println!("{}", serde_json::to_string_pretty(report)?);
  Ok(())
}

/// Display only impacted circuit ids (cid)
fn display_names_only(report: &AnalysisReport) {
  for circuit in &report.aggregate {
    println!("{}", circuit.cid);
  }
}

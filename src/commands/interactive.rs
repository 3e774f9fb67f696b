//! `netbox-impact interactive` - Prompt-driven analysis session
//!
//! Walks the user through picking devices, extra circuits, interfaces and an
//! impact type, then prints the analysis and its score. Malformed or unknown
//! ids are reported and asked again rather than aborting the session.

use super::analyze::{AnalysisReport, display_text};
use crate::core::context::AnalysisContext;
use crate::core::error::{ImpactError, ImpactResult};
use crate::forms::DeviceImpactAnalysisForm;
use crate::graph::impact;
use crate::graph::{ImpactAnalysis, Selection};
use crate::score::{self, ImpactType, ScoreRequest, ScoreResult};
use crate::utils::{parse_id_list, split_input_line};
use std::io::{self, BufRead, Write};

/// Run the interactive command on stdin/stdout
pub fn run_interactive(ctx: &AnalysisContext) -> ImpactResult<()> {
  let stdin = io::stdin();
  let mut stdout = io::stdout();
  let (analysis, score) = session(ctx, &mut stdin.lock(), &mut stdout)?;

  writeln!(stdout)?;
  let report = AnalysisReport::new(&ctx.topology, &analysis, Some(score));
  display_text(&report);
  Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> ImpactResult<String> {
  write!(output, "{}", question)?;
  output.flush()?;

  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    return Err(ImpactError::message("Input ended before the session finished"));
  }
  Ok(line.trim().to_string())
}

/// Drive one session; prompts go to `output`.
fn session<R: BufRead, W: Write>(
  ctx: &AnalysisContext,
  input: &mut R,
  output: &mut W,
) -> ImpactResult<(ImpactAnalysis, ScoreResult)> {
  let topology = &ctx.topology;
  let form = DeviceImpactAnalysisForm::new(topology.as_ref());

  writeln!(output, "Available Devices:")?;
  for device in form.choices("") {
    writeln!(output, "ID: {}, Name: {}", device.id, device.name)?;
  }
  let selection: Selection = loop {
    let line = prompt(input, output, "Enter device IDs (comma-separated): ")?;
    match form.validate(&split_input_line(&line)) {
      Ok(selection) => break selection,
      Err(errors) => writeln!(output, "{}", errors)?,
    }
  };

  writeln!(output, "\nAvailable Circuits:")?;
  for circuit in topology.circuits() {
    let end = |d: Option<u64>| d.and_then(|id| topology.device(id)).map(|d| d.name.as_str()).unwrap_or("-");
    writeln!(
      output,
      "ID: {}, CID: {}, TerminationA: {}, TerminationB: {}",
      circuit.id,
      circuit.cid,
      end(circuit.a_side()),
      end(circuit.b_side())
    )?;
  }
  let extra_circuits = loop {
    let line = prompt(input, output, "Enter additional circuit IDs (comma-separated, blank for none): ")?;
    match parse_id_list(&split_input_line(&line), "circuit") {
      Ok(ids) => match ids.iter().copied().find(|&id| topology.circuit(id).is_none()) {
        Some(id) => writeln!(output, "{}", ImpactError::CircuitNotFound { id })?,
        None => break ids,
      },
      Err(e) => writeln!(output, "{}", e)?,
    }
  };

  writeln!(output, "\nAvailable Interfaces:")?;
  for interface in topology.interfaces() {
    let device = topology.device(interface.device).map(|d| d.name.as_str()).unwrap_or("-");
    writeln!(output, "ID: {}, Name: {}, Device: {}", interface.id, interface.name, device)?;
  }
  let interface_ids = loop {
    let line = prompt(input, output, "Enter interface IDs (comma-separated, blank for none): ")?;
    match parse_id_list(&split_input_line(&line), "interface") {
      Ok(ids) => match ids.iter().copied().find(|&id| topology.interface(id).is_none()) {
        Some(id) => writeln!(output, "Interface {} not found in topology", id)?,
        None => break ids,
      },
      Err(e) => writeln!(output, "{}", e)?,
    }
  };

  let impact_type = loop {
    let line = prompt(
      input,
      output,
      "\nEnter impact type (planned-work, fiber-works, electrical-work, incident-work): ",
    )?;
    if line.is_empty() {
      break ctx.config.analysis.impact_type;
    }
    match line.parse::<ImpactType>() {
      Ok(t) => break t,
      Err(e) => writeln!(output, "{}", e)?,
    }
  };

  let analysis = impact::analyze(topology, &selection, ctx.config.analysis.mode)?;

  let mut circuit_ids = analysis.impact.aggregate.clone();
  circuit_ids.extend(extra_circuits);
  let request = ScoreRequest {
    device_ids: selection.ids().iter().copied().collect(),
    circuit_ids,
    interface_ids,
    impact_type,
  };
  let score = score::calculate(topology, &request, &ctx.config.scoring_policy())?;

  Ok((analysis, score))
}

//! `netbox-impact score` - Weighted impact score for a set of objects

use crate::core::context::AnalysisContext;
use crate::core::error::{ImpactError, ImpactResult};
use crate::score::{self, ImpactRequest, ImpactType, ScoreRequest, ScoreResult};
use crate::utils::parse_id_list;
use std::path::PathBuf;

/// Run the score command
///
/// Ids come from the flags, or from a JSON request file. The impact type is
/// taken from `--impact-type`, then the request file, then the config.
pub fn run_score(
  ctx: &AnalysisContext,
  devices: Vec<String>,
  circuits: Vec<String>,
  interfaces: Vec<String>,
  request_file: Option<PathBuf>,
  impact_type: Option<String>,
  json: bool,
) -> ImpactResult<()> {
  let flag_type = impact_type.map(|t| t.parse::<ImpactType>()).transpose()?;
  let default_type = ctx.config.analysis.impact_type;

  let request = match request_file {
    Some(path) => {
      let file = ImpactRequest::load(&path)?;
      tracing::debug!(path = %path.display(), "loaded score request");
      let mut request = file.into_score_request(default_type);
      if let Some(t) = flag_type {
        request.impact_type = t;
      }
      request
    }
    None => ScoreRequest {
      device_ids: parse_id_list(&devices, "device")?,
      circuit_ids: parse_id_list(&circuits, "circuit")?,
      interface_ids: parse_id_list(&interfaces, "interface")?,
      impact_type: flag_type.unwrap_or(default_type),
    },
  };

  if request.device_ids.is_empty() && request.circuit_ids.is_empty() && request.interface_ids.is_empty() {
    return Err(ImpactError::with_help(
      "Nothing to score",
      "Pass at least one of --devices, --circuits or --interfaces, or a --request file with ids",
    ));
  }

  let result = score::calculate(&ctx.topology, &request, &ctx.config.scoring_policy())?;

  if json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    display_score_text(&result);
  }

  Ok(())
}

/// Display a score breakdown in human-readable text format
pub fn display_score_text(result: &ScoreResult) {
  let b = &result.breakdown;

  println!("Impact Score ({})", result.impact_type);
  println!("============");
  println!();
  println!(
    "Devices:          {} × {} = {}",
    b.devices.count, b.devices.weight_per_device, b.devices.impact
  );
  println!(
    "Implicit devices: {} × {} = {}",
    b.implicit_devices.count, b.implicit_devices.weight_per_device, b.implicit_devices.impact
  );
  println!("Circuits:         {} = {:.2}", b.circuits.items.len(), b.circuits.total_impact);
  for item in &b.circuits.items {
    println!(
      "  🔌 {} (#{}): {} × {} = {:.2}",
      item.cid, item.id, item.weight, item.redundancy_factor, item.impact
    );
  }
  println!(
    "Interfaces:       {} × {} = {}",
    b.interfaces.count, b.interfaces.weight_per_interface, b.interfaces.impact
  );
  println!();
  println!("Total before multiplier: {:.2}", result.total_impact_before_multiplier);
  println!("Multiplier:              {}", result.multiplier);
  println!("Total impact:            {:.2}", result.total_impact);
}

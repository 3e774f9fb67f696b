//! `netbox-impact devices` - List the devices the analysis form offers

use crate::core::context::AnalysisContext;
use crate::core::error::ImpactResult;
use crate::forms::DeviceImpactAnalysisForm;
use serde_json::json;

/// Run the devices command
pub fn run_devices(ctx: &AnalysisContext, filter: Option<String>, json: bool) -> ImpactResult<()> {
  let form = DeviceImpactAnalysisForm::new(ctx.topology.as_ref());
  let choices = form.choices(filter.as_deref().unwrap_or(""));

  if json {
    let output = json!({
      "field": form.devices.name,
      "label": form.devices.label,
      "help_text": form.devices.help_text,
      "required": form.devices.required,
      "choices": choices,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("{}", form.devices.label);
  println!("  {}", form.devices.help_text);
  println!();

  if choices.is_empty() {
    println!("No matching devices");
    return Ok(());
  }

  for device in choices {
    match device.parent {
      Some(parent) => println!("  {:>6}  {} (in #{})", device.id, device.name, parent),
      None => println!("  {:>6}  {}", device.id, device.name),
    }
  }

  Ok(())
}

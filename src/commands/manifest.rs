//! `netbox-impact manifest` - Show the plugin manifest

use crate::core::error::ImpactResult;
use crate::plugin::PluginManifest;

/// Run the manifest command
pub fn run_manifest(json: bool) -> ImpactResult<()> {
  let manifest = PluginManifest::new();
  manifest.validate()?;

  if json {
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    return Ok(());
  }

  println!("{} ({})", manifest.verbose_name, manifest.name);
  println!("  {}", manifest.description);
  println!();
  println!("Version:  {}", manifest.version);
  println!("Author:   {} <{}>", manifest.author, manifest.author_email);
  println!("Base URL: /plugins/{}/", manifest.base_url);
  println!("Settings: none required");

  Ok(())
}

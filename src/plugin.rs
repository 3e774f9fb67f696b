//! Plugin manifest
//!
//! Identity of the analysis as the host platform sees it. Built once at
//! startup, never mutated. The plugin takes no settings of its own.

use crate::core::error::{ConfigError, ImpactResult};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginManifest {
  pub name: &'static str,
  pub verbose_name: &'static str,
  pub description: &'static str,
  pub version: &'static str,
  pub author: &'static str,
  pub author_email: &'static str,
  /// URL path prefix the host mounts the plugin under
  pub base_url: &'static str,
  pub required_settings: Vec<String>,
  pub default_settings: BTreeMap<String, String>,
}

impl PluginManifest {
  pub fn new() -> Self {
    Self {
      name: "netbox_impact",
      verbose_name: "NetBox Impact Analysis",
      description: "Analyze the impact of device outages on circuits",
      version: env!("CARGO_PKG_VERSION"),
      author: "Lorenzo Karel",
      author_email: "r2unit@proton.me",
      base_url: "impact-analysis",
      required_settings: Vec::new(),
      default_settings: BTreeMap::new(),
    }
  }

  /// Check the manifest is something a host would accept.
  pub fn validate(&self) -> ImpactResult<()> {
    if semver::Version::parse(self.version).is_err() {
      return Err(
        ConfigError::InvalidValue {
          field: "version".to_string(),
          reason: format!("'{}' is not valid semver", self.version),
        }
        .into(),
      );
    }

    let valid_segment = !self.base_url.is_empty()
      && self
        .base_url
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid_segment {
      return Err(
        ConfigError::InvalidValue {
          field: "base_url".to_string(),
          reason: format!("'{}' must be a single lowercase path segment", self.base_url),
        }
        .into(),
      );
    }

    Ok(())
  }
}

impl Default for PluginManifest {
  fn default() -> Self {
    Self::new()
  }
}

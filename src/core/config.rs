use crate::core::error::{ConfigError, ImpactError, ImpactResult, ResultExt};
use crate::graph::ResolveMode;
use crate::score::{ImpactType, ScoringPolicy, Weights};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for netbox-impact
/// Searched in order: impact.toml, .impact.toml, .config/impact.toml
///
/// # Example
///
/// ```toml
/// [netbox]
/// url = "https://netbox.example.net"
/// token_env = "NETBOX_TOKEN"
/// timeout_secs = 10
///
/// [analysis]
/// mode = "transitive"
/// impact_type = "fiber-works"
///
/// [weights]
/// device = 5.0
/// circuit = 3.0
/// interface = 1.0
///
/// [multipliers]
/// incident-work = 20.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImpactConfig {
  #[serde(default)]
  pub netbox: NetboxConfig,
  #[serde(default)]
  pub analysis: AnalysisConfig,
  #[serde(default)]
  pub weights: Weights,
  /// Per impact type multiplier overrides
  #[serde(default)]
  pub multipliers: BTreeMap<ImpactType, f64>,
}

/// Where to reach NetBox
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetboxConfig {
  /// NetBox root URL (without `/api`)
  #[serde(default)]
  pub url: Option<String>,

  /// Environment variable holding the API token (default: NETBOX_TOKEN)
  #[serde(default = "default_token_env")]
  pub token_env: String,

  /// Per-request timeout in seconds (default: 10)
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_token_env() -> String {
  "NETBOX_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Default for NetboxConfig {
  fn default() -> Self {
    Self {
      url: None,
      token_env: default_token_env(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl NetboxConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn validate(&self) -> ImpactResult<()> {
    if let Some(ref url) = self.url
      && !(url.starts_with("http://") || url.starts_with("https://"))
    {
      return Err(invalid("netbox.url", format!("'{}' must start with http:// or https://", url)));
    }

    if self.timeout_secs == 0 {
      return Err(invalid("netbox.timeout_secs", "must be at least 1".to_string()));
    }

    Ok(())
  }
}

/// Analysis defaults, overridable per invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
  #[serde(default)]
  pub mode: ResolveMode,

  #[serde(default = "default_impact_type")]
  pub impact_type: ImpactType,
}

fn default_impact_type() -> ImpactType {
  ImpactType::PlannedWork
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      mode: ResolveMode::default(),
      impact_type: default_impact_type(),
    }
  }
}

fn invalid(field: &str, reason: String) -> ImpactError {
  ImpactError::Config(ConfigError::InvalidValue {
    field: field.to_string(),
    reason,
  })
}

impl ImpactConfig {
  /// Find config file in search order: impact.toml, .impact.toml, .config/impact.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("impact.toml"),
      path.join(".impact.toml"),
      path.join(".config").join("impact.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from `dir` if one exists there, defaults otherwise.
  pub fn discover(dir: &Path) -> ImpactResult<Self> {
    match Self::find_config_path(dir) {
      Some(path) => Self::load_from(&path),
      None => {
        tracing::debug!(dir = %dir.display(), "no impact.toml found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Load and validate a specific config file
  pub fn load_from(config_path: &Path) -> ImpactResult<Self> {
    if !config_path.exists() {
      return Err(ImpactError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ImpactConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "loaded configuration");
    Ok(config)
  }

  pub fn validate(&self) -> ImpactResult<()> {
    self.netbox.validate()?;

    for (field, value) in [
      ("weights.device", self.weights.device),
      ("weights.circuit", self.weights.circuit),
      ("weights.interface", self.weights.interface),
    ] {
      if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, format!("{} must be a non-negative number", value)));
      }
    }

    for (impact_type, value) in &self.multipliers {
      if !value.is_finite() || *value <= 0.0 {
        return Err(invalid(
          &format!("multipliers.{}", impact_type),
          format!("{} must be a positive number", value),
        ));
      }
    }

    Ok(())
  }

  pub fn scoring_policy(&self) -> ScoringPolicy {
    ScoringPolicy {
      weights: self.weights,
      multipliers: self.multipliers.clone(),
    }
  }
}

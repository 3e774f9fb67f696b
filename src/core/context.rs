//! Analysis context - build once, pass everywhere
//!
//! # Architecture
//!
//! ```text
//! main.rs:
//!   AnalysisContext::build(&TopologySource, config) -> &AnalysisContext
//!   |
//!   v
//! commands/analyze.rs, score.rs, etc:
//!   fn run_x(ctx: &AnalysisContext, ...)
//! ```
//!
//! The topology is read from its store exactly once per invocation, so every
//! command in a run sees the same snapshot.

use crate::core::config::ImpactConfig;
use crate::core::error::{ConfigError, ImpactError, ImpactResult};
use crate::graph::Topology;
use crate::store::{NetboxClient, SnapshotStore, TopologyStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Where topology records come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
  Snapshot(PathBuf),
  Netbox { url: String, token: String },
}

impl TopologySource {
  /// Pick a source from CLI flags, falling back to the config file.
  ///
  /// A snapshot wins over NetBox. The token comes from `--netbox-token`
  /// (or NETBOX_TOKEN), then from the env var named in `[netbox] token_env`.
  pub fn resolve(
    snapshot: Option<PathBuf>,
    netbox_url: Option<String>,
    netbox_token: Option<String>,
    config: &ImpactConfig,
  ) -> ImpactResult<Self> {
    if let Some(path) = snapshot {
      return Ok(Self::Snapshot(path));
    }

    let url = netbox_url
      .or_else(|| config.netbox.url.clone())
      .ok_or(ImpactError::Config(ConfigError::NoTopologySource))?;

    let token = netbox_token
      .or_else(|| std::env::var(&config.netbox.token_env).ok())
      .ok_or_else(|| {
        ImpactError::with_help(
          "No NetBox API token available",
          format!("Pass --netbox-token or set {}", config.netbox.token_env),
        )
      })?;

    Ok(Self::Netbox { url, token })
  }

  fn open(&self, config: &ImpactConfig) -> ImpactResult<Box<dyn TopologyStore>> {
    match self {
      Self::Snapshot(path) => Ok(Box::new(SnapshotStore::open(path)?)),
      Self::Netbox { url, token } => Ok(Box::new(NetboxClient::new(url, token, config.netbox.timeout())?)),
    }
  }
}

/// Shared state for one invocation.
#[derive(Clone)]
pub struct AnalysisContext {
  /// Loaded (or default) configuration
  pub config: Arc<ImpactConfig>,

  /// Topology snapshot, read once from the source
  pub topology: Arc<Topology>,
}

impl AnalysisContext {
  pub fn build(source: &TopologySource, config: ImpactConfig) -> ImpactResult<Self> {
    let store = source.open(&config)?;
    let topology = Topology::load(store.as_ref())?;

    Ok(Self {
      config: Arc::new(config),
      topology: Arc::new(topology),
    })
  }
}

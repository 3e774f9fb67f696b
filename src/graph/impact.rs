//! Circuit impact analysis
//!
//! Given a selection of devices going down, determine:
//! - Which circuits terminate on each selected device
//! - In transitive mode, which circuits terminate on devices that depend on it
//! - The union of impacted circuits across the whole selection

use super::topology::Topology;
use crate::core::error::{ImpactError, ImpactResult};
use crate::forms::FormErrors;
use crate::store::{CircuitId, DeviceId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// How far an outage propagates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
  /// Circuits terminating on the device itself
  #[default]
  Direct,
  /// Also circuits on devices that depend on it through parent links
  Transitive,
}

impl FromStr for ResolveMode {
  type Err = ImpactError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "direct" | "one-hop" => Ok(Self::Direct),
      "transitive" => Ok(Self::Transitive),
      _ => Err(ImpactError::message(format!(
        "Unknown mode '{}'. Valid modes: direct, transitive",
        s
      ))),
    }
  }
}

impl fmt::Display for ResolveMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Direct => write!(f, "direct"),
      Self::Transitive => write!(f, "transitive"),
    }
  }
}

/// Non-empty, de-duplicated set of device ids a user asked about.
///
/// Keeps the order the user gave them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection(Vec<DeviceId>);

impl Selection {
  pub fn new(ids: impl IntoIterator<Item = DeviceId>) -> ImpactResult<Self> {
    let mut seen = BTreeSet::new();
    let ids: Vec<DeviceId> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
    if ids.is_empty() {
      return Err(ImpactError::Validation(FormErrors::required("devices")));
    }
    Ok(Self(ids))
  }

  pub fn ids(&self) -> &[DeviceId] {
    &self.0
  }
}

/// Impacted circuits per selected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactSet {
  /// Circuits lost when each selected device goes down
  pub per_device: BTreeMap<DeviceId, BTreeSet<CircuitId>>,

  /// Devices dragged down with each selected device (transitive mode only)
  pub dependents: BTreeMap<DeviceId, BTreeSet<DeviceId>>,

  /// Union over the whole selection
  pub aggregate: BTreeSet<CircuitId>,
}

impl ImpactSet {
  pub fn is_empty(&self) -> bool {
    self.aggregate.is_empty()
  }
}

/// Complete impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAnalysis {
  pub selection: Selection,
  pub mode: ResolveMode,
  pub impact: ImpactSet,
}

/// Analyze which circuits are impacted when the selected devices go down.
///
/// Algorithm:
/// 1. Check every selected device exists (fail before computing anything)
/// 2. Per device, collect circuits terminating on it (plus its dependents'
///    circuits in transitive mode)
/// 3. Union all sets
pub fn analyze(topology: &Topology, selection: &Selection, mode: ResolveMode) -> ImpactResult<ImpactAnalysis> {
  // A partial report under-states the outage, so one missing device fails all
  if let Some(&missing) = selection.ids().iter().find(|id| !topology.contains_device(**id)) {
    return Err(ImpactError::DeviceNotFound { id: missing });
  }

  let mut per_device = BTreeMap::new();
  let mut dependents = BTreeMap::new();
  let mut aggregate = BTreeSet::new();

  for &device_id in selection.ids() {
    let mut circuits = topology.circuits_on(device_id)?;

    if mode == ResolveMode::Transitive {
      let children = topology.transitive_dependents(device_id)?;
      for &child in &children {
        circuits.extend(topology.circuits_on(child)?);
      }
      dependents.insert(device_id, children);
    }

    tracing::debug!(device = device_id, circuits = circuits.len(), "resolved device impact");
    aggregate.extend(circuits.iter().copied());
    per_device.insert(device_id, circuits);
  }

  Ok(ImpactAnalysis {
    selection: selection.clone(),
    mode,
    impact: ImpactSet {
      per_device,
      dependents,
      aggregate,
    },
  })
}

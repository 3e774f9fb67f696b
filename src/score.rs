//! Weighted impact score
//!
//! Turns a set of affected devices, circuits and interfaces into one number,
//! scaled by the kind of work causing the outage:
//!
//! ```text
//! total = multiplier(impact_type) × (devices + implicit devices + circuits + interfaces)
//! ```
//!
//! A circuit whose A and B ends sit on the same device is looped back and only
//! partly counted (redundancy factor 0.8), but its A-side device then counts as
//! an implicitly affected device.

use crate::core::error::{ImpactError, ImpactResult, ResultExt};
use crate::graph::Topology;
use crate::store::{Circuit, CircuitId, DeviceId, InterfaceId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const LOOPED_REDUNDANCY_FACTOR: f64 = 0.8;

/// Kind of work behind the outage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactType {
  PlannedWork,
  FiberWorks,
  ElectricalWork,
  IncidentWork,
}

impl ImpactType {
  pub const ALL: [ImpactType; 4] = [
    ImpactType::PlannedWork,
    ImpactType::FiberWorks,
    ImpactType::ElectricalWork,
    ImpactType::IncidentWork,
  ];

  pub fn default_multiplier(self) -> f64 {
    match self {
      ImpactType::PlannedWork => 1.0,
      ImpactType::FiberWorks => 1.5,
      ImpactType::ElectricalWork => 2.0,
      ImpactType::IncidentWork => 10.0,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ImpactType::PlannedWork => "planned-work",
      ImpactType::FiberWorks => "fiber-works",
      ImpactType::ElectricalWork => "electrical-work",
      ImpactType::IncidentWork => "incident-work",
    }
  }
}

impl FromStr for ImpactType {
  type Err = ImpactError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_lowercase();
    ImpactType::ALL.into_iter().find(|t| t.as_str() == wanted).ok_or_else(|| {
      ImpactError::message(format!(
        "Unknown impact type '{}'. Valid types: planned-work, fiber-works, electrical-work, incident-work",
        s.trim()
      ))
    })
  }
}

impl fmt::Display for ImpactType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Points per affected object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
  #[serde(default = "default_device_weight")]
  pub device: f64,
  #[serde(default = "default_circuit_weight")]
  pub circuit: f64,
  #[serde(default = "default_interface_weight")]
  pub interface: f64,
}

fn default_device_weight() -> f64 {
  5.0
}

fn default_circuit_weight() -> f64 {
  3.0
}

fn default_interface_weight() -> f64 {
  1.0
}

impl Default for Weights {
  fn default() -> Self {
    Self {
      device: default_device_weight(),
      circuit: default_circuit_weight(),
      interface: default_interface_weight(),
    }
  }
}

/// Weights plus per-type multipliers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringPolicy {
  pub weights: Weights,
  /// Overrides for [`ImpactType::default_multiplier`]
  pub multipliers: BTreeMap<ImpactType, f64>,
}

impl ScoringPolicy {
  pub fn multiplier(&self, impact_type: ImpactType) -> f64 {
    self
      .multipliers
      .get(&impact_type)
      .copied()
      .unwrap_or_else(|| impact_type.default_multiplier())
  }
}

/// What to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRequest {
  pub device_ids: BTreeSet<DeviceId>,
  pub circuit_ids: BTreeSet<CircuitId>,
  pub interface_ids: BTreeSet<InterfaceId>,
  pub impact_type: ImpactType,
}

/// Score request as JSON, the payload other tooling posts for a score:
///
/// ```json
/// { "device_ids": [1], "circuit_ids": [10, 30], "interface_ids": [], "impact_type": "fiber-works" }
/// ```
///
/// Every field is optional; a missing `impact_type` falls back to the caller's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpactRequest {
  pub device_ids: Vec<DeviceId>,
  pub circuit_ids: Vec<CircuitId>,
  pub interface_ids: Vec<InterfaceId>,
  pub impact_type: Option<ImpactType>,
}

impl ImpactRequest {
  pub fn load(path: &Path) -> ImpactResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| {
      ImpactError::message(format!("Failed to read score request {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).context(format!("Invalid score request in {}", path.display()))
  }

  /// Duplicate ids collapse; `default_type` applies when the file names no type.
  pub fn into_score_request(self, default_type: ImpactType) -> ScoreRequest {
    ScoreRequest {
      device_ids: self.device_ids.into_iter().collect(),
      circuit_ids: self.circuit_ids.into_iter().collect(),
      interface_ids: self.interface_ids.into_iter().collect(),
      impact_type: self.impact_type.unwrap_or(default_type),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceImpact {
  pub count: usize,
  pub weight_per_device: f64,
  pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitImpactDetail {
  pub id: CircuitId,
  pub cid: String,
  pub redundancy_factor: f64,
  pub weight: f64,
  pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitImpact {
  pub items: Vec<CircuitImpactDetail>,
  pub total_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceImpact {
  pub count: usize,
  pub weight_per_interface: f64,
  pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactBreakdown {
  pub devices: DeviceImpact,
  pub implicit_devices: DeviceImpact,
  pub circuits: CircuitImpact,
  pub interfaces: InterfaceImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
  pub impact_type: ImpactType,
  pub total_impact: f64,
  pub total_impact_before_multiplier: f64,
  pub multiplier: f64,
  pub breakdown: ImpactBreakdown,
}

/// 0.8 for a circuit looped back onto one device, 1.0 otherwise
pub fn redundancy_factor(circuit: &Circuit) -> f64 {
  match (circuit.a_side(), circuit.b_side()) {
    (Some(a), Some(b)) if a == b => LOOPED_REDUNDANCY_FACTOR,
    _ => 1.0,
  }
}

/// Score a request against the topology.
///
/// Every referenced id must exist; one unknown id fails the whole score.
pub fn calculate(topology: &Topology, request: &ScoreRequest, policy: &ScoringPolicy) -> ImpactResult<ScoreResult> {
  let weights = policy.weights;

  if let Some(&missing) = request.device_ids.iter().find(|id| !topology.contains_device(**id)) {
    return Err(ImpactError::DeviceNotFound { id: missing });
  }

  if let Some(missing) = request.interface_ids.iter().find(|id| topology.interface(**id).is_none()) {
    return Err(ImpactError::with_help(
      format!("Interface {} not found in topology", missing),
      "Check the interface ids against your topology source.",
    ));
  }

  let device_count = request.device_ids.len();
  let device_impact = device_count as f64 * weights.device;

  let interface_count = request.interface_ids.len();
  let interface_impact = interface_count as f64 * weights.interface;

  let mut items = Vec::with_capacity(request.circuit_ids.len());
  let mut total_circuit_impact = 0.0;
  let mut implicit_devices = BTreeSet::new();

  for &circuit_id in &request.circuit_ids {
    let circuit = topology
      .circuit(circuit_id)
      .ok_or(ImpactError::CircuitNotFound { id: circuit_id })?;

    let factor = redundancy_factor(circuit);
    let impact = weights.circuit * factor;
    total_circuit_impact += impact;

    if factor < 1.0
      && let Some(a_side) = circuit.a_side()
    {
      implicit_devices.insert(a_side);
    }

    items.push(CircuitImpactDetail {
      id: circuit.id,
      cid: circuit.cid.clone(),
      redundancy_factor: factor,
      weight: weights.circuit,
      impact,
    });
  }

  let implicit_count = implicit_devices.len();
  let implicit_impact = implicit_count as f64 * weights.device;

  let before_multiplier = device_impact + implicit_impact + total_circuit_impact + interface_impact;
  let multiplier = policy.multiplier(request.impact_type);

  tracing::debug!(
    impact_type = %request.impact_type,
    before_multiplier,
    multiplier,
    "scored impact"
  );

  Ok(ScoreResult {
    impact_type: request.impact_type,
    total_impact: multiplier * before_multiplier,
    total_impact_before_multiplier: before_multiplier,
    multiplier,
    breakdown: ImpactBreakdown {
      devices: DeviceImpact {
        count: device_count,
        weight_per_device: weights.device,
        impact: device_impact,
      },
      implicit_devices: DeviceImpact {
        count: implicit_count,
        weight_per_device: weights.device,
        impact: implicit_impact,
      },
      circuits: CircuitImpact {
        items,
        total_impact: total_circuit_impact,
      },
      interfaces: InterfaceImpact {
        count: interface_count,
        weight_per_interface: weights.interface,
        impact: interface_impact,
      },
    },
  })
}

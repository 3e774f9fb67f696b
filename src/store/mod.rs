//! Topology sources
//!
//! The tool never writes to a store. A store hands over devices, circuits and
//! interfaces once, and [`crate::graph::Topology`] indexes them into a snapshot.
//!
//! - **snapshot**: JSON export on disk
//! - **netbox**: live NetBox REST API

pub mod netbox;
pub mod snapshot;

pub use netbox::NetboxClient;
pub use snapshot::SnapshotStore;

use crate::core::error::ImpactResult;
use serde::{Deserialize, Serialize};

pub type DeviceId = u64;
pub type CircuitId = u64;
pub type InterfaceId = u64;

/// A network node in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
  pub id: DeviceId,
  pub name: String,
  /// Device this one depends on for connectivity (chassis, uplink)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent: Option<DeviceId>,
}

/// One end of a circuit. `device` is `None` for provider-network ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
  pub device: Option<DeviceId>,
}

/// A connectivity link/service terminating on one or more devices.
///
/// Terminations are ordered: A side first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
  pub id: CircuitId,
  pub cid: String,
  #[serde(default)]
  pub terminations: Vec<Termination>,
}

impl Circuit {
  /// Device on the A side, if any
  pub fn a_side(&self) -> Option<DeviceId> {
    self.terminations.first().and_then(|t| t.device)
  }

  /// Device on the far side, if any
  pub fn b_side(&self) -> Option<DeviceId> {
    self.terminations.get(1).and_then(|t| t.device)
  }

  /// Devices this circuit terminates on, without provider-network ends
  pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
    self.terminations.iter().filter_map(|t| t.device)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
  pub id: InterfaceId,
  pub name: String,
  pub device: DeviceId,
}

/// Read-only catalog of topology records.
pub trait TopologyStore {
  /// Human-readable origin, used in logs and reports
  fn describe(&self) -> String;

  fn devices(&self) -> ImpactResult<Vec<Device>>;

  fn circuits(&self) -> ImpactResult<Vec<Circuit>>;

  fn interfaces(&self) -> ImpactResult<Vec<Interface>>;
}

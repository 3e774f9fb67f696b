//! JSON snapshot store
//!
//! ```json
//! {
//!   "devices":    [{ "id": 1, "name": "core-1" }, { "id": 2, "name": "lc-1", "parent": 1 }],
//!   "circuits":   [{ "id": 10, "cid": "C1", "terminations": [{ "device": 1 }, { "device": null }] }],
//!   "interfaces": [{ "id": 100, "name": "eth0", "device": 1 }]
//! }
//! ```

use super::{Circuit, Device, Interface, TopologyStore};
use crate::core::error::{ImpactResult, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
  pub devices: Vec<Device>,
  #[serde(default)]
  pub circuits: Vec<Circuit>,
  #[serde(default)]
  pub interfaces: Vec<Interface>,
}

/// Topology store backed by a snapshot file, parsed once on open.
pub struct SnapshotStore {
  path: PathBuf,
  snapshot: Snapshot,
}

impl SnapshotStore {
  pub fn open(path: &Path) -> ImpactResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::Read {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| StoreError::Read {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;

    tracing::debug!(
      path = %path.display(),
      devices = snapshot.devices.len(),
      circuits = snapshot.circuits.len(),
      interfaces = snapshot.interfaces.len(),
      "loaded topology snapshot"
    );

    Ok(Self {
      path: path.to_path_buf(),
      snapshot,
    })
  }
}

impl TopologyStore for SnapshotStore {
  fn describe(&self) -> String {
    format!("snapshot {}", self.path.display())
  }

  fn devices(&self) -> ImpactResult<Vec<Device>> {
    Ok(self.snapshot.devices.clone())
  }

  fn circuits(&self) -> ImpactResult<Vec<Circuit>> {
    Ok(self.snapshot.circuits.clone())
  }

  fn interfaces(&self) -> ImpactResult<Vec<Interface>> {
    Ok(self.snapshot.interfaces.clone())
  }
}

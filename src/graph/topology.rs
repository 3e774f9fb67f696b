//! Topology snapshot built from a store + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**, two node kinds: devices and circuits
//! - `circuit → device`: the circuit terminates on the device
//! - `child → parent`: the child device depends on the parent for connectivity
//! - **Index**: device id / circuit id → node index
//!
//! The snapshot is immutable once built. Every query is a pure function of it.

use crate::core::error::{ImpactError, ImpactResult};
use crate::store::{Circuit, CircuitId, Device, DeviceId, Interface, InterfaceId, TopologyStore};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// A node in the topology graph.
#[derive(Debug, Clone)]
pub enum TopologyNode {
  Device(Device),
  Circuit(Circuit),
}

/// Relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyEdge {
  /// circuit → device
  Terminates,
  /// child device → parent device
  DependsOn,
}

/// Topology identifier (SHA256 of the canonical snapshot contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyDigest(String);

impl TopologyDigest {
  fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short digest (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for TopologyDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// Canonical form hashed into the digest
#[derive(Serialize)]
struct CanonicalSnapshot<'a> {
  devices: Vec<&'a Device>,
  circuits: Vec<&'a Circuit>,
  interfaces: Vec<&'a Interface>,
}

/// Read-only topology snapshot.
pub struct Topology {
  graph: DiGraph<TopologyNode, TopologyEdge>,

  /// Index: device id → node index
  device_to_node: BTreeMap<DeviceId, NodeIndex>,

  /// Index: circuit id → node index
  circuit_to_node: BTreeMap<CircuitId, NodeIndex>,

  /// Interfaces, sorted by id
  interfaces: Vec<Interface>,

  digest: TopologyDigest,

  /// Where the records came from
  source: String,
}

impl Topology {
  /// Read every record from `store` and index it.
  pub fn load(store: &dyn TopologyStore) -> ImpactResult<Self> {
    let source = store.describe();
    tracing::info!(source = %source, "loading topology");

    let devices = store.devices()?;
    let circuits = store.circuits()?;
    let interfaces = store.interfaces()?;

    let mut topology = Self::from_parts(devices, circuits, interfaces)?;
    topology.source = source;
    Ok(topology)
  }

  /// Build a topology from already-loaded records.
  ///
  /// Duplicate ids are rejected. References to devices that are not in the
  /// snapshot (dangling terminations, parents outside the export) are logged
  /// and dropped.
  pub fn from_parts(devices: Vec<Device>, circuits: Vec<Circuit>, mut interfaces: Vec<Interface>) -> ImpactResult<Self> {
    let mut graph = DiGraph::new();
    let mut device_to_node = BTreeMap::new();
    let mut circuit_to_node = BTreeMap::new();

    for device in devices {
      let id = device.id;
      let idx = graph.add_node(TopologyNode::Device(device));
      if device_to_node.insert(id, idx).is_some() {
        return Err(ImpactError::with_help(
          format!("Duplicate device id {} in topology", id),
          "Device ids must be unique. Re-export the snapshot.",
        ));
      }
    }

    for circuit in circuits {
      let id = circuit.id;
      let idx = graph.add_node(TopologyNode::Circuit(circuit));
      if circuit_to_node.insert(id, idx).is_some() {
        return Err(ImpactError::with_help(
          format!("Duplicate circuit id {} in topology", id),
          "Circuit ids must be unique. Re-export the snapshot.",
        ));
      }
    }

    // Termination edges
    for (&circuit_id, &circuit_idx) in &circuit_to_node {
      let device_ids: Vec<DeviceId> = match &graph[circuit_idx] {
        TopologyNode::Circuit(c) => c.devices().collect(),
        TopologyNode::Device(_) => continue,
      };
      for device_id in device_ids {
        match device_to_node.get(&device_id) {
          Some(&device_idx) => {
            graph.add_edge(circuit_idx, device_idx, TopologyEdge::Terminates);
          }
          None => tracing::warn!(circuit = circuit_id, device = device_id, "circuit terminates on unknown device"),
        }
      }
    }

    // Dependency edges
    for (&device_id, &device_idx) in &device_to_node {
      let parent = match &graph[device_idx] {
        TopologyNode::Device(d) => d.parent,
        TopologyNode::Circuit(_) => continue,
      };
      if let Some(parent_id) = parent {
        match device_to_node.get(&parent_id) {
          Some(&parent_idx) => {
            graph.add_edge(device_idx, parent_idx, TopologyEdge::DependsOn);
          }
          None => tracing::warn!(device = device_id, parent = parent_id, "device depends on unknown parent"),
        }
      }
    }

    interfaces.sort_by_key(|i| i.id);

    let mut topology = Self {
      graph,
      device_to_node,
      circuit_to_node,
      interfaces,
      digest: TopologyDigest(String::new()),
      source: "<memory>".to_string(),
    };
    topology.digest = topology.compute_digest()?;

    tracing::debug!(
      devices = topology.device_to_node.len(),
      circuits = topology.circuit_to_node.len(),
      interfaces = topology.interfaces.len(),
      digest = %topology.digest,
      "topology indexed"
    );

    Ok(topology)
  }

  fn compute_digest(&self) -> ImpactResult<TopologyDigest> {
    let canonical = CanonicalSnapshot {
      devices: self.devices().collect(),
      circuits: self.circuits().collect(),
      interfaces: self.interfaces.iter().collect(),
    };
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(TopologyDigest::from_contents(&bytes))
  }

  pub fn digest(&self) -> &TopologyDigest {
    &self.digest
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  /// All devices, ordered by id.
  pub fn devices(&self) -> impl Iterator<Item = &Device> + '_ {
    self.device_to_node.values().filter_map(|&idx| match &self.graph[idx] {
      TopologyNode::Device(d) => Some(d),
      TopologyNode::Circuit(_) => None,
    })
  }

  /// All circuits, ordered by id.
  pub fn circuits(&self) -> impl Iterator<Item = &Circuit> + '_ {
    self.circuit_to_node.values().filter_map(|&idx| match &self.graph[idx] {
      TopologyNode::Circuit(c) => Some(c),
      TopologyNode::Device(_) => None,
    })
  }

  /// All interfaces, ordered by id.
  pub fn interfaces(&self) -> &[Interface] {
    &self.interfaces
  }

  pub fn device(&self, id: DeviceId) -> Option<&Device> {
    match self.device_to_node.get(&id).map(|&idx| &self.graph[idx]) {
      Some(TopologyNode::Device(d)) => Some(d),
      _ => None,
    }
  }

  pub fn circuit(&self, id: CircuitId) -> Option<&Circuit> {
    match self.circuit_to_node.get(&id).map(|&idx| &self.graph[idx]) {
      Some(TopologyNode::Circuit(c)) => Some(c),
      _ => None,
    }
  }

  pub fn interface(&self, id: InterfaceId) -> Option<&Interface> {
    self
      .interfaces
      .binary_search_by_key(&id, |i| i.id)
      .ok()
      .map(|pos| &self.interfaces[pos])
  }

  pub fn contains_device(&self, id: DeviceId) -> bool {
    self.device_to_node.contains_key(&id)
  }

  /// Circuits that terminate directly on `device_id`.
  pub fn circuits_on(&self, device_id: DeviceId) -> ImpactResult<BTreeSet<CircuitId>> {
    let node_idx = self.find_device(device_id)?;

    let circuits = self
      .graph
      .edges_directed(node_idx, Direction::Incoming)
      .filter(|edge| *edge.weight() == TopologyEdge::Terminates)
      .filter_map(|edge| match &self.graph[edge.source()] {
        TopologyNode::Circuit(c) => Some(c.id),
        TopologyNode::Device(_) => None,
      })
      .collect();

    Ok(circuits)
  }

  /// Devices that transitively depend on `device_id` (children, grandchildren, ...).
  ///
  /// DFS over incoming `DependsOn` edges. The start device is never part of
  /// the result, even when a parent cycle leads back to it.
  pub fn transitive_dependents(&self, device_id: DeviceId) -> ImpactResult<BTreeSet<DeviceId>> {
    let start_node = self.find_device(device_id)?;

    let mut visited = HashSet::new();
    let mut stack = vec![start_node];
    let mut dependents = BTreeSet::new();

    while let Some(node_idx) = stack.pop() {
      if !visited.insert(node_idx) {
        continue;
      }

      for edge in self.graph.edges_directed(node_idx, Direction::Incoming) {
        if *edge.weight() != TopologyEdge::DependsOn {
          continue;
        }
        let child_idx = edge.source();
        if child_idx != start_node
          && let TopologyNode::Device(child) = &self.graph[child_idx]
        {
          dependents.insert(child.id);
        }
        stack.push(child_idx);
      }
    }

    Ok(dependents)
  }

  /// Devices matching a choice query, ordered by id.
  ///
  /// Empty query matches everything. Otherwise an exact id match or a
  /// case-insensitive substring of the name.
  pub fn search_devices(&self, query: &str) -> Vec<&Device> {
    let query = query.trim();
    if query.is_empty() {
      return self.devices().collect();
    }

    let needle = query.to_lowercase();
    let id_match = query.parse::<DeviceId>().ok();

    self
      .devices()
      .filter(|d| Some(d.id) == id_match || d.name.to_lowercase().contains(&needle))
      .collect()
  }

  fn find_device(&self, device_id: DeviceId) -> ImpactResult<NodeIndex> {
    self
      .device_to_node
      .get(&device_id)
      .copied()
      .ok_or(ImpactError::DeviceNotFound { id: device_id })
  }
}

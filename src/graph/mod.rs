//! Topology graph and outage impact analysis
//!
//! Built on petgraph directly: devices and circuits are our own node types,
//! the store only feeds records in.

pub mod impact;
pub mod topology;

pub use impact::{ImpactAnalysis, ResolveMode, Selection};
pub use topology::Topology;

//! CLI commands for netbox-impact
//!
//! ## Inspection
//! - **manifest**: Show the plugin manifest
//! - **devices**: List the devices the analysis form offers
//!
//! ## Analysis
//! - **analyze**: Circuits impacted by a device outage
//! - **score**: Weighted impact score for devices, circuits and interfaces
//! - **interactive**: Prompt-driven analysis + score session
//!
//! Commands that need topology data accept `&AnalysisContext` so the store is
//! read only once per run.

pub mod analyze;
pub mod devices;
pub mod interactive;
pub mod manifest;
pub mod score;

pub use analyze::run_analyze;
pub use devices::run_devices;
pub use interactive::run_interactive;
pub use manifest::run_manifest;
pub use score::run_score;

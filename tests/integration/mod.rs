//! Integration tests for netbox-impact

mod helpers;
mod test_analyze;
mod test_config;
mod test_devices;
mod test_manifest;
mod test_score;

//! Custom Resource Definitions consumed from the Machine Config Operator
//!
//! Both kinds are cluster-scoped and rendered by the MCO for Linux nodes.
//! This crate only ever reads them.

mod controller_config;
mod machine_config;

#[cfg(test)]
mod tests;

pub use controller_config::{ControllerConfig, ControllerConfigSpec};
pub use machine_config::{MachineConfig, MachineConfigSpec};

/// API group shared by all Machine Config Operator resources
pub const MACHINE_CONFIGURATION_GROUP: &str = "machineconfiguration.openshift.io";

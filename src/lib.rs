//! Windows Node Config: derive Windows worker configuration from Linux MachineConfigs
//!
//! This crate reads the MCO's rendered worker MachineConfig, translates the
//! parts Windows services need, generates the node's network configuration
//! script, and fingerprints the binaries delivered to the node.

pub mod crd;
pub mod error;
pub mod ignition;
pub mod payload;
pub mod telemetry;

pub use crate::error::{Error, Result};

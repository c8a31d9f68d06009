//! sawah: monitoring dashboard for a rice field irrigation device.
//!
//! The binary in `main.rs` wires these modules to clap subcommands; the
//! integration tests under `tests/` use them directly.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod events;
pub mod simulator;
pub mod web;

//! cellmark-server
//!
//! HTTP front of `cellmark-core`: router, configuration, and logging setup.
//! The binary in `main.rs` only wires these together.

pub mod config;
pub mod http;
pub mod telemetry;

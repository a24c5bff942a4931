//! Maritime operation tracker application.
//!
//! This crate wires the operation engine to a real-time loop thread, a
//! TOML configuration file, route resolution and a line-based console.

pub mod config;
pub mod console;
pub mod control;
pub mod operation_loop;
pub mod routes;
pub mod state;

pub use maritime_core as core;

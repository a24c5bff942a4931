//! Operation engine for the maritime operation tracker.
//!
//! Owns the virtual clock, drives the step state machine and the position
//! simulator, and produces `OperationSnapshot`s for the dashboard.

pub mod engine;
pub mod error;
pub mod machine;
pub mod map;
pub mod scheduler;
pub mod simulator;

pub use engine::{OperationEngine, SimConfig};
pub use error::OperationError;
pub use map::{HeadlessMap, MapSurface};
pub use maritime_core as core;

#[cfg(test)]
mod tests;

//! Core types and definitions for the maritime operation tracker.
//!
//! This crate defines the vocabulary shared across all other crates:
//! positions, operation steps, operator commands, map commands, log entries,
//! state snapshots, and constants. It has no dependency on any runtime.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

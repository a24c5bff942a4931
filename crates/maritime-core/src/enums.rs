//! Enumeration types used throughout the operation.

use serde::{Deserialize, Serialize};

/// Operation step (top-level state).
///
/// Declaration order is progression order: a running operation only ever
/// moves to a later variant, and only a reset returns to `NotStarted`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum OperationStep {
    #[default]
    NotStarted,
    EngineStarted,
    AwaitingVerification,
    EnteringRegion,
    Sailing,
    ReturningToHarbor,
    Completed,
}

impl OperationStep {
    /// The five steps shown to the operator, in order.
    pub const USER_STEPS: [OperationStep; 5] = [
        OperationStep::EngineStarted,
        OperationStep::AwaitingVerification,
        OperationStep::EnteringRegion,
        OperationStep::Sailing,
        OperationStep::ReturningToHarbor,
    ];

    /// Position in the progression: 0 before start, 1..=5 for the user
    /// steps, 6 once completed.
    pub fn ordinal(self) -> u8 {
        match self {
            OperationStep::NotStarted => 0,
            OperationStep::EngineStarted => 1,
            OperationStep::AwaitingVerification => 2,
            OperationStep::EnteringRegion => 3,
            OperationStep::Sailing => 4,
            OperationStep::ReturningToHarbor => 5,
            OperationStep::Completed => 6,
        }
    }

    /// Display name of the step.
    pub fn label(self) -> &'static str {
        match self {
            OperationStep::NotStarted => "Not Started",
            OperationStep::EngineStarted => "Start Engine",
            OperationStep::AwaitingVerification => "HIN Verification",
            OperationStep::EnteringRegion => "Entering the Region",
            OperationStep::Sailing => "Sailing",
            OperationStep::ReturningToHarbor => "Returning to Harbor",
            OperationStep::Completed => "Completed",
        }
    }

    /// Progress status of `self` relative to the current step.
    pub fn status_at(self, current: OperationStep) -> StepStatus {
        match self.ordinal().cmp(&current.ordinal()) {
            std::cmp::Ordering::Less => StepStatus::Done,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Pending,
        }
    }
}

/// Progress status of a step on the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Active,
    Done,
}

/// Direction of one leg of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leg {
    /// Harbor to destination.
    Outbound,
    /// Destination back to harbor.
    Return,
}

/// Marker style on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStyle {
    /// Blue starting-point marker.
    Source,
    /// Red operation-target marker.
    Destination,
    /// Pulsing vessel marker.
    Vessel,
}

/// Log entry severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    #[default]
    Info,
    Warning,
    Critical,
}

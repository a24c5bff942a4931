//! Operation state and the snapshot sent to the dashboard.

use serde::{Deserialize, Serialize};

use crate::constants::SOURCE_POSITION;
use crate::enums::*;
use crate::events::LogEntry;
use crate::types::Position;

/// Complete operation state.
///
/// Treated as an immutable value: every transition produces a new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationState {
    pub step: OperationStep,
    pub operation_started: bool,
    pub operation_completed: bool,
    pub vessel_position: Position,
    pub logs: Vec<LogEntry>,
    pub verified: bool,
    pub boundary_reached: bool,
    pub boundary_alert_visible: bool,
    pub hin_input_visible: bool,
    pub log_panel_visible: bool,
    /// Bumped on every reset. Scheduled work carries the generation it was
    /// scheduled under and is dropped if it no longer matches.
    pub generation: u64,
}

impl OperationState {
    /// Initial state with the vessel moored at `harbor`.
    pub fn new(harbor: Position) -> Self {
        Self {
            step: OperationStep::NotStarted,
            operation_started: false,
            operation_completed: false,
            vessel_position: harbor,
            logs: Vec::new(),
            verified: false,
            boundary_reached: false,
            boundary_alert_visible: false,
            hin_input_visible: false,
            log_panel_visible: false,
            generation: 0,
        }
    }
}

impl Default for OperationState {
    fn default() -> Self {
        Self::new(SOURCE_POSITION)
    }
}

/// State broadcast to the dashboard after each clock advance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub now_ms: u64,
    #[serde(flatten)]
    pub state: OperationState,
    pub steps: Vec<StepView>,
    pub active_leg: Option<LegView>,
}

impl OperationSnapshot {
    pub fn new(now_ms: u64, state: OperationState, active_leg: Option<LegView>) -> Self {
        let steps = OperationStep::USER_STEPS
            .iter()
            .map(|&step| StepView {
                number: step.ordinal(),
                name: step.label().to_string(),
                status: step.status_at(state.step),
            })
            .collect();
        Self {
            now_ms,
            state,
            steps,
            active_leg,
        }
    }
}

/// One row of the operation status panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub number: u8,
    pub name: String,
    pub status: StepStatus,
}

/// The leg currently being animated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegView {
    pub leg: Leg,
    /// 0.0 at departure, 1.0 on arrival.
    pub progress: f64,
}

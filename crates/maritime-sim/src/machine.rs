//! Operation step state machine.
//!
//! Pure reducer: takes the current state, a trigger and the clock, and
//! returns the next state plus the effects the engine must carry out. No
//! clock, map or scheduler access, so every transition is unit-testable on
//! plain data.

use maritime_core::constants::MISSING_HIN_LABEL;
use maritime_core::enums::{AlertLevel, Leg, OperationStep};
use maritime_core::events::LogEntry;
use maritime_core::state::OperationState;
use maritime_core::types::Position;

use crate::engine::SimConfig;
use crate::error::OperationError;
use crate::scheduler::Task;
use crate::simulator::LegEvent;

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Start { map_ready: bool },
    EngineReady,
    VerifyHin { code: String },
    Leg { leg: Leg, event: LegEvent },
    ReturnPauseElapsed,
    Reset,
    ToggleLogs,
    DismissBoundaryAlert,
}

impl Trigger {
    fn name(&self) -> &'static str {
        match self {
            Trigger::Start { .. } => "start",
            Trigger::EngineReady => "engine ready",
            Trigger::VerifyHin { .. } => "HIN verification",
            Trigger::Leg { .. } => "leg event",
            Trigger::ReturnPauseElapsed => "return pause",
            Trigger::Reset => "reset",
            Trigger::ToggleLogs => "toggle logs",
            Trigger::DismissBoundaryAlert => "dismiss alert",
        }
    }
}

/// Work the engine performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Schedule a task under the new state's generation.
    Schedule { delay_ms: u64, task: Task },
    /// Launch the position simulator for a leg.
    BeginLeg(Leg),
    /// Move the vessel marker and pan the map to it.
    TrackVessel(Position),
    /// Cancel the in-flight leg, drop the vessel marker, recenter the map.
    ClearVessel,
}

/// Result of an accepted trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: OperationState,
    pub effects: Vec<Effect>,
}

struct Builder {
    state: OperationState,
    effects: Vec<Effect>,
    now_ms: u64,
}

impl Builder {
    fn log(&mut self, level: AlertLevel, message: impl Into<String>) {
        self.state.logs.push(LogEntry {
            at_ms: self.now_ms,
            level,
            message: message.into(),
        });
    }

    fn info(&mut self, message: impl Into<String>) {
        self.log(AlertLevel::Info, message);
    }

    fn enter(&mut self, step: OperationStep) {
        debug_assert!(step > self.state.step, "steps only move forward");
        self.state.step = step;
    }

    fn finish(self) -> Transition {
        Transition {
            state: self.state,
            effects: self.effects,
        }
    }
}

/// Apply `trigger` to `state` at `now_ms`.
///
/// Errors are guard rejections: the caller keeps the old state.
pub fn reduce(
    state: &OperationState,
    trigger: Trigger,
    config: &SimConfig,
    now_ms: u64,
) -> Result<Transition, OperationError> {
    let out_of_sequence = OperationError::OutOfSequence {
        trigger: trigger.name(),
        step: state.step,
    };
    let mut b = Builder {
        state: state.clone(),
        effects: Vec::new(),
        now_ms,
    };

    match trigger {
        Trigger::Start { map_ready } => {
            if state.operation_completed {
                return Err(OperationError::AlreadyCompleted);
            }
            if state.operation_started {
                return Err(OperationError::AlreadyStarted);
            }
            if !map_ready {
                return Err(OperationError::MapUnavailable);
            }
            b.state.operation_started = true;
            b.enter(OperationStep::EngineStarted);
            b.info("Operation started. Engine starting...");
            b.effects.push(Effect::Schedule {
                delay_ms: config.engine_start_delay_ms,
                task: Task::EngineReady,
            });
        }

        Trigger::EngineReady => {
            if state.step != OperationStep::EngineStarted {
                return Err(out_of_sequence);
            }
            b.enter(OperationStep::AwaitingVerification);
            b.state.hin_input_visible = true;
            b.info("Engine started. HIN verification required to proceed.");
        }

        Trigger::VerifyHin { code } => {
            if state.step != OperationStep::AwaitingVerification {
                return Err(OperationError::NotAwaitingVerification(state.step));
            }
            if code == config.accepted_hin {
                b.state.verified = true;
                b.info(format!("HIN verification successful: {code} authenticated."));
                b.enter(OperationStep::EnteringRegion);
                b.info("HIN verified. Entering operational region...");
                b.effects.push(Effect::BeginLeg(Leg::Outbound));
            } else {
                let shown = if code.is_empty() {
                    MISSING_HIN_LABEL
                } else {
                    code.as_str()
                };
                b.log(
                    AlertLevel::Critical,
                    format!("HIN verification failed: {shown}. Operation halted."),
                );
            }
        }

        Trigger::Leg { leg, event } => {
            let expected = match leg {
                Leg::Outbound => matches!(
                    state.step,
                    OperationStep::EnteringRegion | OperationStep::Sailing
                ),
                Leg::Return => state.step == OperationStep::ReturningToHarbor,
            };
            if !expected {
                return Err(out_of_sequence);
            }
            apply_leg_event(&mut b, leg, event, config);
        }

        Trigger::ReturnPauseElapsed => {
            if state.step != OperationStep::Sailing {
                return Err(out_of_sequence);
            }
            b.enter(OperationStep::ReturningToHarbor);
            b.info("Operation complete. Returning to harbor...");
            b.effects.push(Effect::BeginLeg(Leg::Return));
        }

        Trigger::Reset => {
            let mut fresh = OperationState::new(config.source);
            fresh.generation = state.generation + 1;
            fresh.log_panel_visible = state.log_panel_visible;
            b.state = fresh;
            b.effects.push(Effect::ClearVessel);
        }

        Trigger::ToggleLogs => {
            b.state.log_panel_visible = !state.log_panel_visible;
        }

        Trigger::DismissBoundaryAlert => {
            b.state.boundary_alert_visible = false;
        }
    }

    Ok(b.finish())
}

fn apply_leg_event(b: &mut Builder, leg: Leg, event: LegEvent, config: &SimConfig) {
    match event {
        LegEvent::Progress { position, .. } => {
            b.state.vessel_position = position;
            b.effects.push(Effect::TrackVessel(position));
            if leg == Leg::Outbound && b.state.step == OperationStep::EnteringRegion {
                b.enter(OperationStep::Sailing);
                b.info("Sailing in progress. Monitoring position...");
            }
        }
        LegEvent::BoundaryCrossed { .. } => {
            if !b.state.boundary_reached {
                b.state.boundary_reached = true;
                b.state.boundary_alert_visible = true;
                b.log(
                    AlertLevel::Warning,
                    "ALERT: Approaching boundary (10km from destination). Preparing for return.",
                );
            }
        }
        LegEvent::Arrived { .. } => match leg {
            Leg::Outbound => {
                b.info("Reached destination. Beginning operation...");
                b.effects.push(Effect::Schedule {
                    delay_ms: config.return_pause_ms,
                    task: Task::ReturnPauseElapsed,
                });
            }
            Leg::Return => {
                b.enter(OperationStep::Completed);
                b.state.operation_completed = true;
                b.info("Returned to harbor. Operation completed successfully!");
            }
        },
    }
}

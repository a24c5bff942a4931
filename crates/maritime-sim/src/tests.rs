//! Tests for the operation engine: sequencing, timing, cancellation.

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use maritime_core::commands::OperatorCommand;
use maritime_core::constants::*;
use maritime_core::enums::*;
use maritime_core::events::MapCommand;
use maritime_core::state::OperationState;

use crate::engine::{OperationEngine, SimConfig, Verification};
use crate::error::OperationError;
use crate::map::HeadlessMap;
use crate::simulator::interpolate;

fn engine() -> OperationEngine {
    OperationEngine::headless(SimConfig::default())
}

/// Start the operation and wait for the verification prompt.
fn awaiting_verification() -> OperationEngine {
    let mut engine = engine();
    engine.start_operation().unwrap();
    engine.advance_by(ENGINE_START_DELAY_MS);
    assert_eq!(engine.state().step, OperationStep::AwaitingVerification);
    engine
}

/// Verified and one frame into the outbound leg.
fn sailing() -> OperationEngine {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();
    engine.advance_by(FRAME_INTERVAL_MS);
    assert_eq!(engine.state().step, OperationStep::Sailing);
    engine
}

fn assert_reset(state: &OperationState) {
    assert_eq!(state.step, OperationStep::NotStarted);
    assert_eq!(state.vessel_position, SOURCE_POSITION);
    assert!(state.logs.is_empty());
    assert!(!state.verified);
    assert!(!state.boundary_reached);
    assert!(!state.boundary_alert_visible);
    assert!(!state.hin_input_visible);
    assert!(!state.operation_started);
    assert!(!state.operation_completed);
}

// ---- End-to-end ----

#[test]
fn test_full_operation_scenario() {
    let mut engine = engine();

    engine.start_operation().unwrap();
    assert_eq!(engine.state().step, OperationStep::EngineStarted);

    engine.advance_by(ENGINE_START_DELAY_MS - 1);
    assert_eq!(engine.state().step, OperationStep::EngineStarted);
    engine.advance_by(1);
    assert_eq!(engine.state().step, OperationStep::AwaitingVerification);
    assert!(engine.state().hin_input_visible);

    let logs_before = engine.state().logs.len();
    assert_eq!(engine.verify_hin("wrong"), Ok(Verification::Rejected));
    assert_eq!(engine.state().step, OperationStep::AwaitingVerification);
    assert_eq!(engine.state().logs.len(), logs_before + 1);

    assert_eq!(engine.verify_hin(ACCEPTED_HIN), Ok(Verification::Accepted));
    assert_eq!(engine.state().step, OperationStep::EnteringRegion);
    assert!(engine.state().verified);

    engine.advance_by(LEG_DURATION_MS);
    assert_eq!(engine.state().step, OperationStep::Sailing);
    assert_eq!(engine.state().vessel_position, DESTINATION_POSITION);
    assert!(engine.state().boundary_reached);
    assert!(engine.active_leg().is_none(), "outbound leg finished");

    engine.advance_by(RETURN_PAUSE_MS - 1);
    assert_eq!(engine.state().step, OperationStep::Sailing);
    engine.advance_by(1);
    assert_eq!(engine.state().step, OperationStep::ReturningToHarbor);

    engine.advance_by(LEG_DURATION_MS);
    let state = engine.state();
    assert_eq!(state.step, OperationStep::Completed);
    assert!(state.operation_completed);
    assert_eq!(state.vessel_position, SOURCE_POSITION);
    assert_eq!(
        engine.now_ms(),
        ENGINE_START_DELAY_MS + 2 * LEG_DURATION_MS + RETURN_PAUSE_MS
    );

    let messages: Vec<&str> = state.logs.iter().map(|l| l.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Operation started. Engine starting...",
            "Engine started. HIN verification required to proceed.",
            "HIN verification failed: wrong. Operation halted.",
            "HIN verification successful: IN7784 authenticated.",
            "HIN verified. Entering operational region...",
            "Sailing in progress. Monitoring position...",
            "ALERT: Approaching boundary (10km from destination). Preparing for return.",
            "Reached destination. Beginning operation...",
            "Operation complete. Returning to harbor...",
            "Returned to harbor. Operation completed successfully!",
        ]
    );

    // Log timestamps never decrease.
    for pair in state.logs.windows(2) {
        assert!(pair[0].at_ms <= pair[1].at_ms);
    }
    assert_eq!(engine.pending_tasks(), 0);
}

#[test]
fn test_run_until_idle_finishes_operation() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();

    let frames = (LEG_DURATION_MS / FRAME_INTERVAL_MS) as usize;
    let ran = engine.run_until_idle(10_000);
    assert_eq!(ran, 2 * frames + 1, "two legs of frames plus the pause");
    assert_eq!(engine.state().step, OperationStep::Completed);
}

#[test]
fn test_steps_only_move_forward() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();

    let mut last = engine.state().step;
    while engine.state().step != OperationStep::Completed {
        engine.advance_by(FRAME_INTERVAL_MS);
        let step = engine.state().step;
        assert!(step >= last, "{step:?} after {last:?}");
        last = step;
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_script() {
    let script = |engine: &mut OperationEngine| {
        let mut snaps = Vec::new();
        engine.queue_command(OperatorCommand::StartOperation);
        for i in 0..2000u64 {
            if i == 200 {
                engine.queue_command(OperatorCommand::VerifyHin {
                    code: "IN7785".into(),
                });
                engine.queue_command(OperatorCommand::VerifyHin {
                    code: ACCEPTED_HIN.into(),
                });
            }
            let snap = engine.tick(FRAME_INTERVAL_MS);
            snaps.push(serde_json::to_string(&snap).unwrap());
        }
        snaps
    };

    let mut engine_a = engine();
    let mut engine_b = engine();
    assert_eq!(script(&mut engine_a), script(&mut engine_b));
    assert_eq!(engine_a.state().step, OperationStep::Completed);
}

// ---- Guards ----

#[test]
fn test_start_requires_ready_map() {
    let mut engine = OperationEngine::new(SimConfig::default(), HeadlessMap::unavailable());
    assert_eq!(engine.start_operation(), Err(OperationError::MapUnavailable));
    assert_reset(engine.state());
    assert_eq!(engine.pending_tasks(), 0);

    engine.map_mut().set_ready(true);
    engine.start_operation().unwrap();
    assert_eq!(engine.state().step, OperationStep::EngineStarted);

    // Landmarks are drawn once the map comes up.
    let commands = engine.map().commands();
    assert!(matches!(
        commands[0],
        MapCommand::PlaceMarker {
            style: MarkerStyle::Source,
            ..
        }
    ));
    assert!(matches!(
        commands[2],
        MapCommand::DrawBoundaryCircle { radius_m, .. } if radius_m == BOUNDARY_RADIUS_M
    ));
}

#[test]
fn test_start_is_idempotent_while_running() {
    let mut engine = engine();
    engine.start_operation().unwrap();
    assert_eq!(engine.start_operation(), Err(OperationError::AlreadyStarted));
    assert_eq!(engine.state().logs.len(), 1);
    assert_eq!(engine.pending_tasks(), 1);
}

#[test]
fn test_start_after_completion_is_ignored() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();
    engine.run_until_idle(10_000);

    let before = engine.state().clone();
    assert_eq!(
        engine.start_operation(),
        Err(OperationError::AlreadyCompleted)
    );
    assert_eq!(engine.state(), &before);
}

#[test]
fn test_verify_before_prompt_is_ignored() {
    let mut engine = engine();
    engine.start_operation().unwrap();
    assert_eq!(
        engine.verify_hin(ACCEPTED_HIN),
        Err(OperationError::NotAwaitingVerification(
            OperationStep::EngineStarted
        ))
    );
    assert!(!engine.state().verified);
    assert_eq!(engine.state().logs.len(), 1);
}

// ---- Verification ----

#[test]
fn test_wrong_codes_never_advance() {
    let mut rng = ChaCha8Rng::seed_from_u64(7784);
    let mut engine = awaiting_verification();

    for _ in 0..200 {
        let len = rng.gen_range(0..10);
        let code: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        if code == ACCEPTED_HIN {
            continue;
        }

        let logs_before = engine.state().logs.len();
        assert_eq!(engine.verify_hin(&code), Ok(Verification::Rejected));
        let state = engine.state();
        assert_eq!(state.step, OperationStep::AwaitingVerification);
        assert!(!state.verified);
        assert_eq!(state.logs.len(), logs_before + 1);

        let entry = state.logs.last().unwrap();
        let expected = if code.is_empty() {
            MISSING_HIN_LABEL
        } else {
            code.as_str()
        };
        assert!(entry.message.contains(expected), "{}", entry.message);
    }
    assert_eq!(engine.pending_tasks(), 0, "rejections schedule nothing");
}

#[test]
fn test_verification_accepted_once() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();
    assert_eq!(
        engine.verify_hin(ACCEPTED_HIN),
        Err(OperationError::NotAwaitingVerification(
            OperationStep::EnteringRegion
        ))
    );

    engine.advance_by(LEG_DURATION_MS / 2);
    assert!(engine.state().verified);
    let successes = engine
        .state()
        .logs
        .iter()
        .filter(|l| l.message.starts_with("HIN verification successful"))
        .count();
    assert_eq!(successes, 1);
}

// ---- Position simulation ----

#[test]
fn test_outbound_position_follows_interpolation() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();
    let leg_start = engine.now_ms();

    for _ in 0..100 {
        engine.advance_by(FRAME_INTERVAL_MS);
        let progress = (engine.now_ms() - leg_start) as f64 / LEG_DURATION_MS as f64;
        let expected = interpolate(SOURCE_POSITION, DESTINATION_POSITION, progress);
        assert_eq!(engine.state().vessel_position, expected);
        let leg = engine.active_leg().unwrap();
        assert_eq!(leg.leg, Leg::Outbound);
        assert!((leg.progress - progress).abs() < 1e-12);
    }
}

#[test]
fn test_boundary_reached_once_inside_radius() {
    let mut engine = sailing();
    let mut flips = 0;
    let mut was_reached = false;

    while engine.state().step == OperationStep::Sailing && engine.active_leg().is_some() {
        engine.advance_by(FRAME_INTERVAL_MS);
        let state = engine.state();
        if state.boundary_reached && !was_reached {
            flips += 1;
            let d = state.vessel_position.distance_to(&DESTINATION_POSITION);
            assert!(d <= BOUNDARY_RADIUS_M, "alert fired {d} m out");
        }
        was_reached = state.boundary_reached;
    }

    assert_eq!(flips, 1);
    let alerts = engine
        .state()
        .logs
        .iter()
        .filter(|l| l.level == AlertLevel::Warning)
        .count();
    assert_eq!(alerts, 1);
}

#[test]
fn test_return_leg_waits_for_outbound_arrival() {
    let mut engine = sailing();
    let mut arrived_at = None;
    let mut return_started_at = None;

    while engine.state().step != OperationStep::Completed {
        engine.advance_by(FRAME_INTERVAL_MS);
        if arrived_at.is_none() && engine.state().vessel_position == DESTINATION_POSITION {
            arrived_at = Some(engine.now_ms());
        }
        if let Some(leg) = engine.active_leg() {
            if leg.leg == Leg::Return && return_started_at.is_none() {
                assert!(arrived_at.is_some(), "return leg before arrival");
                return_started_at = Some(engine.now_ms());
            }
        }
    }

    let gap = return_started_at.unwrap() - arrived_at.unwrap();
    assert!(gap >= RETURN_PAUSE_MS, "pause of {gap} ms");
}

#[test]
fn test_map_unavailable_disables_boundary_detection() {
    let mut engine = awaiting_verification();
    engine.verify_hin(ACCEPTED_HIN).unwrap();
    engine.map_mut().set_ready(false);

    engine.run_until_idle(10_000);
    let state = engine.state();
    assert_eq!(state.step, OperationStep::Completed);
    assert!(!state.boundary_reached);
    assert!(!state.boundary_alert_visible);
}

#[test]
fn test_vessel_marker_follows_position() {
    let mut engine = sailing();
    engine.advance_by(LEG_DURATION_MS / 2);

    let vessel: Vec<_> = engine
        .map()
        .markers()
        .filter(|(_, _, style)| *style == MarkerStyle::Vessel)
        .collect();
    assert_eq!(vessel.len(), 1);
    assert_eq!(vessel[0].1, engine.state().vessel_position);
    assert_eq!(engine.map().center(), Some(engine.state().vessel_position));
}

// ---- Reset & cancellation ----

#[test]
fn test_reset_from_every_step() {
    let checkpoints = [
        0,
        ENGINE_START_DELAY_MS / 2,
        ENGINE_START_DELAY_MS,
        ENGINE_START_DELAY_MS + 16,
        ENGINE_START_DELAY_MS + LEG_DURATION_MS / 2,
        ENGINE_START_DELAY_MS + LEG_DURATION_MS + 1000,
        ENGINE_START_DELAY_MS + LEG_DURATION_MS + RETURN_PAUSE_MS + 500,
        ENGINE_START_DELAY_MS + 2 * LEG_DURATION_MS + RETURN_PAUSE_MS,
    ];

    for checkpoint in checkpoints {
        let mut engine = engine();
        engine.start_operation().unwrap();
        engine.advance_to(ENGINE_START_DELAY_MS.min(checkpoint));
        let _ = engine.verify_hin(ACCEPTED_HIN);
        engine.advance_to(checkpoint);

        engine.reset_operation();
        assert_reset(engine.state());
        assert!(engine.active_leg().is_none());
        let after_reset = engine.state().clone();

        // Nothing scheduled before the reset may touch state afterwards.
        engine.advance_by(2 * LEG_DURATION_MS + 2 * RETURN_PAUSE_MS);
        assert_eq!(engine.state(), &after_reset, "checkpoint {checkpoint}");
        assert_eq!(engine.pending_tasks(), 0);
    }
}

#[test]
fn test_reset_removes_vessel_and_recenters() {
    let mut engine = sailing();
    engine.map_mut().take_commands();
    engine.reset_operation();

    let commands = engine.map().commands();
    assert!(matches!(commands[0], MapCommand::RemoveMarker { .. }));
    assert_eq!(
        commands[1],
        MapCommand::SetView {
            center: SOURCE_POSITION,
            zoom: DEFAULT_ZOOM
        }
    );
    assert!(engine
        .map()
        .markers()
        .all(|(_, _, style)| style != MarkerStyle::Vessel));
}

#[test]
fn test_stale_frames_do_not_corrupt_restarted_run() {
    let mut engine = sailing();
    engine.advance_by(LEG_DURATION_MS / 2);
    assert!(engine.pending_tasks() > 0);

    // Reset and immediately restart; the old leg's next frame is still queued.
    engine.reset_operation();
    engine.start_operation().unwrap();
    let generation = engine.state().generation;
    assert_eq!(generation, 1);

    engine.advance_by(ENGINE_START_DELAY_MS);
    assert_eq!(engine.state().vessel_position, SOURCE_POSITION);
    assert_eq!(engine.state().step, OperationStep::AwaitingVerification);

    engine.verify_hin(ACCEPTED_HIN).unwrap();
    let leg_start = engine.now_ms();
    engine.advance_by(FRAME_INTERVAL_MS);
    let expected = interpolate(
        SOURCE_POSITION,
        DESTINATION_POSITION,
        FRAME_INTERVAL_MS as f64 / LEG_DURATION_MS as f64,
    );
    assert_eq!(engine.now_ms() - leg_start, FRAME_INTERVAL_MS);
    assert_eq!(engine.state().vessel_position, expected);
    assert!(!engine.state().boundary_reached);
}

#[test]
fn test_boundary_fires_again_after_reset_and_rerun() {
    let mut engine = sailing();
    engine.advance_by(LEG_DURATION_MS);
    assert!(engine.state().boundary_reached);

    engine.reset_operation();
    assert!(!engine.state().boundary_reached);

    engine.start_operation().unwrap();
    engine.advance_by(ENGINE_START_DELAY_MS);
    assert_eq!(engine.verify_hin(ACCEPTED_HIN), Ok(Verification::Accepted));
    engine.run_until_idle(10_000);

    let state = engine.state();
    assert_eq!(state.step, OperationStep::Completed);
    assert!(state.boundary_reached);
    let alerts = state
        .logs
        .iter()
        .filter(|l| l.level == AlertLevel::Warning)
        .count();
    assert_eq!(alerts, 1);
}

#[test]
fn test_reset_keeps_log_panel_preference() {
    let mut engine = sailing();
    engine.toggle_logs();
    engine.reset_operation();
    assert!(engine.state().log_panel_visible);
}

// ---- Commands ----

#[test]
fn test_queued_commands_apply_on_tick() {
    let mut engine = engine();
    engine.queue_commands([
        OperatorCommand::StartOperation,
        OperatorCommand::ToggleLogs,
    ]);
    assert_eq!(engine.state().step, OperationStep::NotStarted);

    let snap = engine.tick(0);
    assert_eq!(snap.state.step, OperationStep::EngineStarted);
    assert!(snap.state.log_panel_visible);
    assert_eq!(snap.steps[0].status, StepStatus::Active);
}

#[test]
fn test_dismiss_boundary_alert() {
    let mut engine = sailing();
    engine.advance_by(LEG_DURATION_MS);
    assert!(engine.state().boundary_alert_visible);

    engine
        .apply(OperatorCommand::DismissBoundaryAlert)
        .unwrap();
    assert!(!engine.state().boundary_alert_visible);
    assert!(engine.state().boundary_reached);
}

#[test]
fn test_presentation_toggles_work_in_any_step() {
    let mut engine = engine();
    engine.dismiss_boundary_alert();
    engine.toggle_logs();
    engine.toggle_logs();
    assert_eq!(engine.state(), &OperationState::default());
    assert!(engine.state().logs.is_empty());
}

// ---- Configuration edge cases ----

#[test]
fn test_zero_frame_interval_still_advances() {
    let mut engine = OperationEngine::headless(SimConfig {
        frame_interval_ms: 0,
        ..Default::default()
    });
    engine.start_operation().unwrap();
    engine.advance_by(ENGINE_START_DELAY_MS);
    engine.verify_hin(ACCEPTED_HIN).unwrap();

    let leg_start = engine.now_ms();
    engine.advance_by(100);
    assert_eq!(engine.now_ms(), leg_start + 100);
    let leg = engine.active_leg().unwrap();
    assert!((leg.progress - 100.0 / LEG_DURATION_MS as f64).abs() < 1e-12);

    let ran = engine.run_until_idle(100_000);
    assert!(ran < 100_000);
    assert_eq!(engine.state().step, OperationStep::Completed);
}

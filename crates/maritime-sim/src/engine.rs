//! Operation engine: the core of the tracker.
//!
//! `OperationEngine` owns the virtual clock, the map surface and the
//! in-flight leg. Commands and scheduled callbacks are fed through the pure
//! reducer in `machine`, and the engine carries out the resulting effects.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use maritime_core::commands::OperatorCommand;
use maritime_core::constants::*;
use maritime_core::enums::{Leg, MarkerStyle};
use maritime_core::events::MarkerId;
use maritime_core::state::{LegView, OperationSnapshot, OperationState};
use maritime_core::types::Position;

use crate::error::OperationError;
use crate::machine::{self, Effect, Trigger};
use crate::map::{HeadlessMap, MapSurface};
use crate::scheduler::{Scheduled, Scheduler, Task};
use crate::simulator::{AnimationRun, Boundary, PositionSimulator};

/// Configuration for a new engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Harbor the vessel departs from and returns to.
    pub source: Position,
    pub destination: Position,
    /// Alert radius around the destination (meters).
    pub boundary_radius_m: f64,
    pub engine_start_delay_ms: u64,
    pub leg_duration_ms: u64,
    pub return_pause_ms: u64,
    pub frame_interval_ms: u64,
    pub accepted_hin: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            source: SOURCE_POSITION,
            destination: DESTINATION_POSITION,
            boundary_radius_m: BOUNDARY_RADIUS_M,
            engine_start_delay_ms: ENGINE_START_DELAY_MS,
            leg_duration_ms: LEG_DURATION_MS,
            return_pause_ms: RETURN_PAUSE_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            accepted_hin: ACCEPTED_HIN.to_string(),
        }
    }
}

/// Outcome of a HIN submission that reached the verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Rejected,
}

/// The operation engine.
pub struct OperationEngine<M: MapSurface = HeadlessMap> {
    config: SimConfig,
    map: M,
    scheduler: Scheduler,
    state: OperationState,
    leg: Option<PositionSimulator>,
    vessel_marker: Option<MarkerId>,
    landmarks_drawn: bool,
    command_queue: VecDeque<OperatorCommand>,
}

impl OperationEngine<HeadlessMap> {
    /// Engine drawing on a ready in-memory map.
    pub fn headless(config: SimConfig) -> Self {
        Self::new(config, HeadlessMap::ready())
    }
}

impl<M: MapSurface> OperationEngine<M> {
    pub fn new(config: SimConfig, map: M) -> Self {
        let mut engine = Self {
            state: OperationState::new(config.source),
            config,
            map,
            scheduler: Scheduler::new(),
            leg: None,
            vessel_marker: None,
            landmarks_drawn: false,
            command_queue: VecDeque::new(),
        };
        engine.draw_landmarks();
        engine
    }

    // --- Operator actions ---

    /// Start the engine. No-op unless idle with a ready map.
    pub fn start_operation(&mut self) -> Result<(), OperationError> {
        self.draw_landmarks();
        let map_ready = self.map.is_ready();
        self.transition(Trigger::Start { map_ready })
    }

    /// Submit a hull identification number.
    ///
    /// A wrong code is logged and leaves the step unchanged.
    pub fn verify_hin(&mut self, code: &str) -> Result<Verification, OperationError> {
        self.transition(Trigger::VerifyHin {
            code: code.to_string(),
        })?;
        Ok(if self.state.verified {
            Verification::Accepted
        } else {
            Verification::Rejected
        })
    }

    /// Return to the initial state from anywhere, abandoning pending work.
    pub fn reset_operation(&mut self) {
        if let Err(err) = self.transition(Trigger::Reset) {
            // Reset has no guards.
            tracing::error!(%err, "reset rejected");
        }
    }

    pub fn toggle_logs(&mut self) {
        if let Err(err) = self.transition(Trigger::ToggleLogs) {
            tracing::error!(%err, "toggle logs rejected");
        }
    }

    pub fn dismiss_boundary_alert(&mut self) {
        if let Err(err) = self.transition(Trigger::DismissBoundaryAlert) {
            tracing::error!(%err, "dismiss alert rejected");
        }
    }

    /// Apply an operator command immediately.
    pub fn apply(&mut self, command: OperatorCommand) -> Result<(), OperationError> {
        match command {
            OperatorCommand::StartOperation => self.start_operation(),
            OperatorCommand::VerifyHin { code } => self.verify_hin(&code).map(|_| ()),
            OperatorCommand::ResetOperation => {
                self.reset_operation();
                Ok(())
            }
            OperatorCommand::ToggleLogs => {
                self.toggle_logs();
                Ok(())
            }
            OperatorCommand::DismissBoundaryAlert => {
                self.dismiss_boundary_alert();
                Ok(())
            }
        }
    }

    /// Queue an operator command for the next `tick`.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        self.command_queue.extend(commands);
    }

    // --- Clock ---

    /// Apply queued commands, advance the clock by `delta_ms` and return the
    /// resulting snapshot.
    pub fn tick(&mut self, delta_ms: u64) -> OperationSnapshot {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.apply(command) {
                tracing::debug!(%err, "command ignored");
            }
        }
        self.advance_by(delta_ms);
        self.snapshot()
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        let target = self.now_ms().saturating_add(delta_ms);
        self.advance_to(target);
    }

    /// Run every task due at or before `target_ms`, in order.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(scheduled) = self.scheduler.pop_due(target_ms) {
            self.dispatch(scheduled);
        }
        self.scheduler.settle_at(target_ms);
    }

    /// Run pending tasks until none are left or `max_tasks` have run.
    /// Returns the number of tasks run.
    pub fn run_until_idle(&mut self, max_tasks: usize) -> usize {
        let mut ran = 0;
        while ran < max_tasks {
            let Some(scheduled) = self.scheduler.pop_due(u64::MAX) else {
                break;
            };
            self.dispatch(scheduled);
            ran += 1;
        }
        ran
    }

    // --- Accessors ---

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn state(&self) -> &OperationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Tasks still queued, including stale ones awaiting disposal.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn active_leg(&self) -> Option<LegView> {
        self.leg.as_ref().map(|sim| LegView {
            leg: sim.leg(),
            progress: sim.progress(),
        })
    }

    pub fn snapshot(&self) -> OperationSnapshot {
        OperationSnapshot::new(self.now_ms(), self.state.clone(), self.active_leg())
    }

    // --- Internals ---

    /// Virtual time between animation frames. Never zero, so a leg always
    /// moves the clock forward.
    fn frame_step_ms(&self) -> u64 {
        self.config.frame_interval_ms.max(1)
    }

    /// Source and destination markers plus the boundary circle, drawn once
    /// the map is ready.
    fn draw_landmarks(&mut self) {
        if self.landmarks_drawn || !self.map.is_ready() {
            return;
        }
        self.map
            .place_marker(self.config.source, MarkerStyle::Source);
        self.map
            .place_marker(self.config.destination, MarkerStyle::Destination);
        self.map
            .draw_boundary_circle(self.config.destination, self.config.boundary_radius_m);
        self.landmarks_drawn = true;
    }

    fn transition(&mut self, trigger: Trigger) -> Result<(), OperationError> {
        let now_ms = self.now_ms();
        let from = self.state.step;
        let t = machine::reduce(&self.state, trigger, &self.config, now_ms)?;
        self.state = t.state;
        if self.state.step != from {
            tracing::info!(
                now_ms,
                from = ?from,
                to = ?self.state.step,
                generation = self.state.generation,
                "operation step changed"
            );
        }
        for effect in t.effects {
            self.perform(effect);
        }
        Ok(())
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule { delay_ms, task } => {
                self.scheduler
                    .schedule_after(delay_ms, self.state.generation, task);
            }
            Effect::BeginLeg(leg) => self.begin_leg(leg),
            Effect::TrackVessel(position) => {
                if let Some(id) = self.vessel_marker {
                    self.map.move_marker(id, position);
                }
                self.map.pan_to(position);
            }
            Effect::ClearVessel => {
                self.leg = None;
                if let Some(id) = self.vessel_marker.take() {
                    self.map.remove_marker(id);
                }
                self.map.set_view(self.config.source, DEFAULT_ZOOM);
            }
        }
    }

    fn begin_leg(&mut self, leg: Leg) {
        let (from, to, boundary) = match leg {
            Leg::Outbound => (
                self.config.source,
                self.config.destination,
                Some(Boundary {
                    center: self.config.destination,
                    radius_m: self.config.boundary_radius_m,
                }),
            ),
            Leg::Return => (self.config.destination, self.config.source, None),
        };

        if self.vessel_marker.is_none() {
            self.vessel_marker = Some(self.map.place_marker(from, MarkerStyle::Vessel));
        }

        let run = AnimationRun::new(leg, from, to, self.now_ms(), self.config.leg_duration_ms);
        self.leg = Some(PositionSimulator::new(run, boundary));
        let step = self.frame_step_ms();
        self.scheduler
            .schedule_after(step, self.state.generation, Task::Frame(leg));
        tracing::info!(now_ms = self.now_ms(), ?leg, "leg started");
    }

    fn dispatch(&mut self, scheduled: Scheduled) {
        if scheduled.generation != self.state.generation {
            tracing::debug!(
                task = ?scheduled.task,
                scheduled_generation = scheduled.generation,
                generation = self.state.generation,
                "dropping stale task"
            );
            return;
        }

        let result = match scheduled.task {
            Task::EngineReady => self.transition(Trigger::EngineReady),
            Task::ReturnPauseElapsed => self.transition(Trigger::ReturnPauseElapsed),
            Task::Frame(leg) => {
                self.frame(leg);
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::debug!(%err, task = ?scheduled.task, "scheduled task ignored");
        }
    }

    fn frame(&mut self, leg: Leg) {
        let Some(mut sim) = self.leg.take() else {
            tracing::debug!(?leg, "frame without an active leg");
            return;
        };
        if sim.leg() != leg {
            self.leg = Some(sim);
            return;
        }

        let now_ms = self.now_ms();
        let events = sim.tick(now_ms, &self.map);
        if !sim.is_finished() {
            self.leg = Some(sim);
            let step = self.frame_step_ms();
            self.scheduler
                .schedule_after(step, self.state.generation, Task::Frame(leg));
        }

        for event in events {
            if let Err(err) = self.transition(Trigger::Leg { leg, event }) {
                tracing::debug!(%err, ?event, "leg event ignored");
            }
        }
    }
}

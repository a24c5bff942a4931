//! Operation loop thread: paces the engine against the wall clock.
//!
//! The engine is created inside this thread so it never crosses threads.
//! Commands arrive via `mpsc` channel; after every frame the snapshot is
//! stored in shared state for polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use maritime_core::state::OperationSnapshot;
use maritime_sim::{OperationEngine, SimConfig};

use crate::state::{LoopCommand, LoopHandle};

/// Spawns the operation loop in a new thread.
///
/// Every frame advances the virtual clock by the real time elapsed since
/// the loop started, scaled by `speed`, so a late frame catches up instead
/// of stretching the operation.
pub fn spawn_operation_loop(
    config: SimConfig,
    speed: f64,
    latest_snapshot: Arc<Mutex<Option<OperationSnapshot>>>,
) -> std::io::Result<LoopHandle> {
    let (command_tx, command_rx) = mpsc::channel::<LoopCommand>();

    let thread = std::thread::Builder::new()
        .name("maritime-operation-loop".into())
        .spawn(move || {
            run_operation_loop(config, speed, command_rx, &latest_snapshot);
        })?;

    Ok(LoopHandle { command_tx, thread })
}

/// Speed multiplier actually used. Nonsensical values run in real time.
pub fn effective_speed(speed: f64) -> f64 {
    if speed > 0.001 && speed.is_finite() {
        speed
    } else {
        1.0
    }
}

/// Wall-clock duration of one frame at the given speed.
pub fn frame_duration(frame_interval_ms: u64, speed: f64) -> Duration {
    Duration::from_millis(frame_interval_ms.max(1)).div_f64(effective_speed(speed))
}

/// Maps wall-clock time onto the engine's virtual clock.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
    speed: f64,
    applied_ms: u64,
}

impl WallClock {
    pub fn new(origin: Instant, speed: f64) -> Self {
        Self {
            origin,
            speed: effective_speed(speed),
            applied_ms: 0,
        }
    }

    /// Virtual milliseconds owed at `now` that have not been applied yet.
    pub fn advance(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.origin);
        let target = (elapsed.as_nanos() as f64 * self.speed / 1_000_000.0) as u64;
        let delta = target.saturating_sub(self.applied_ms);
        self.applied_ms = self.applied_ms.max(target);
        delta
    }
}

/// The loop. Runs until Shutdown or channel disconnect.
fn run_operation_loop(
    config: SimConfig,
    speed: f64,
    command_rx: mpsc::Receiver<LoopCommand>,
    latest_snapshot: &Mutex<Option<OperationSnapshot>>,
) {
    let frame_ms = config.frame_interval_ms;
    let frame = frame_duration(frame_ms, speed);
    let mut engine = OperationEngine::headless(config);
    let start = Instant::now();
    let mut clock = WallClock::new(start, speed);
    let mut next_frame_time = start;
    tracing::info!(frame_ms, speed, "operation loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match command_rx.try_recv() {
                Ok(LoopCommand::Operator(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) => {
                    tracing::info!("operation loop shut down");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    tracing::info!("command channel closed, operation loop exiting");
                    return;
                }
            }
        }

        // 2. Apply commands and advance by the elapsed time
        let snapshot = engine.tick(clock.advance(Instant::now()));

        // 3. Publish for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next frame
        next_frame_time += frame;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else if now - next_frame_time > frame * 2 {
            // Too far behind: drop the missed sleeps. The clock still catches up.
            next_frame_time = now;
        }
    }
}

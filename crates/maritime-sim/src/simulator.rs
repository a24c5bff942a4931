//! Position simulator: fixed-duration linear travel between two points.
//!
//! One `PositionSimulator` animates one leg. Each frame yields the live
//! position, at most once a boundary crossing, and exactly once an arrival.
//! A finished simulator stays silent; the return leg gets a new one.

use maritime_core::enums::Leg;
use maritime_core::types::Position;

use crate::map::MapSurface;

/// Linear interpolation clamped to the segment.
///
/// Progress 0 returns `from` and progress 1 returns `to` exactly.
pub fn interpolate(from: Position, to: Position, progress: f64) -> Position {
    let t = progress.clamp(0.0, 1.0);
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    let start = from.as_dvec2();
    Position::from_dvec2(start + (to.as_dvec2() - start) * t)
}

/// One directional traversal over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRun {
    pub leg: Leg,
    pub from: Position,
    pub to: Position,
    pub started_at_ms: u64,
    pub duration_ms: u64,
}

impl AnimationRun {
    pub fn new(leg: Leg, from: Position, to: Position, started_at_ms: u64, duration_ms: u64) -> Self {
        Self {
            leg,
            from,
            to,
            started_at_ms,
            duration_ms,
        }
    }

    /// clamp((now - start) / duration, 0, 1). A zero duration is already done.
    pub fn progress_at(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        (elapsed as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn position_at(&self, now_ms: u64) -> Position {
        interpolate(self.from, self.to, self.progress_at(now_ms))
    }
}

/// Alert zone around a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub center: Position,
    pub radius_m: f64,
}

/// What a frame produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegEvent {
    Progress { position: Position, progress: f64 },
    BoundaryCrossed { position: Position, distance_m: f64 },
    Arrived { position: Position },
}

#[derive(Debug, Clone)]
pub struct PositionSimulator {
    run: AnimationRun,
    boundary: Option<Boundary>,
    boundary_reported: bool,
    last_progress: f64,
    finished: bool,
}

impl PositionSimulator {
    pub fn new(run: AnimationRun, boundary: Option<Boundary>) -> Self {
        Self {
            run,
            boundary,
            boundary_reported: false,
            last_progress: 0.0,
            finished: false,
        }
    }

    pub fn leg(&self) -> Leg {
        self.run.leg
    }

    pub fn run(&self) -> &AnimationRun {
        &self.run
    }

    /// Progress as of the last frame.
    pub fn progress(&self) -> f64 {
        self.last_progress
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `now_ms` and report what happened.
    ///
    /// The boundary is checked against `map`'s distance every frame until it
    /// fires. It is skipped while the map is not ready.
    pub fn tick<M: MapSurface + ?Sized>(&mut self, now_ms: u64, map: &M) -> Vec<LegEvent> {
        if self.finished {
            return Vec::new();
        }

        let progress = self.run.progress_at(now_ms);
        let position = interpolate(self.run.from, self.run.to, progress);
        self.last_progress = progress;

        let mut events = vec![LegEvent::Progress { position, progress }];

        if let Some(boundary) = self.boundary {
            if !self.boundary_reported && map.is_ready() {
                let distance_m = map.distance_between(position, boundary.center);
                if distance_m <= boundary.radius_m {
                    self.boundary_reported = true;
                    events.push(LegEvent::BoundaryCrossed {
                        position,
                        distance_m,
                    });
                }
            }
        }

        if progress >= 1.0 {
            self.finished = true;
            events.push(LegEvent::Arrived { position });
        }

        events
    }
}

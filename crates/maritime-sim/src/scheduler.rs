//! Single-threaded task queue over a virtual millisecond clock.
//!
//! Timers and animation frames are scheduled here instead of on real
//! timers, so tests can advance time deterministically. Tasks run in due
//! order, ties broken by scheduling order, and each task runs to completion
//! before the next is popped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use maritime_core::enums::Leg;

/// Deferred work understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Task {
    /// Engine warm-up finished; verification may begin.
    EngineReady,
    /// Next animation frame of a leg.
    Frame(Leg),
    /// Pause at the destination is over; head home.
    ReturnPauseElapsed,
}

/// A task with its due time and the generation it was scheduled under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub due_ms: u64,
    pub seq: u64,
    pub generation: u64,
    pub task: Task,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to run `delay_ms` after the current time.
    pub fn schedule_after(&mut self, delay_ms: u64, generation: u64, task: Task) {
        let scheduled = Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
            generation,
            task,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(scheduled));
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Scheduled> {
        let next = self.queue.peek()?.0;
        if next.due_ms > until_ms {
            return None;
        }
        self.queue.pop();
        self.now_ms = self.now_ms.max(next.due_ms);
        Some(next)
    }

    /// Move the clock forward to `ms`. The clock never runs backwards.
    pub fn settle_at(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }

    /// Due time of the earliest pending task.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(s)| s.due_ms)
    }

    /// Number of pending tasks, stale ones included.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

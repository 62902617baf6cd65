//! Simulation clock and pause bookkeeping.
//!
//! Timers throughout the workspace are absolute [`Ticks`] stamps read from a
//! [`Clock`]. When the surrounding simulation pauses an entity, its clock
//! keeps running; on resume the host reports an [`Unpaused`] event and every
//! timer is shifted forward by the paused duration.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::fixed::Ticks;

/// Monotonic source of the current simulation time.
pub trait Clock {
    fn now(&self) -> Ticks;
}

/// A clock advanced explicitly by the host driver.
///
/// Clones share the same underlying time, so a driver can keep one handle
/// and pass another into the system it drives.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Ticks>>,
}

impl ManualClock {
    pub fn new(start: Ticks) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward by `dt` ticks.
    pub fn advance(&self, dt: Ticks) {
        self.now.set(self.now.get().saturating_add(dt));
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, t: Ticks) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        self.now.get()
    }
}

/// Report that an entity resumed after being paused for `paused_for` ticks.
///
/// `sequence` identifies the pause/resume cycle; consumers use it to apply
/// each report exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpaused {
    pub sequence: u64,
    pub paused_for: Ticks,
}

/// Tracks pause/resume cycles and produces one [`Unpaused`] report per cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseTracker {
    paused_at: Option<Ticks>,
    cycles: u64,
}

impl PauseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a pause. Returns false if already paused.
    pub fn pause(&mut self, now: Ticks) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// End the current pause and return the report for it. Resuming while
    /// not paused yields `None`, so a duplicate resume never shifts timers.
    pub fn resume(&mut self, now: Ticks) -> Option<Unpaused> {
        let started = self.paused_at.take()?;
        self.cycles += 1;
        Some(Unpaused {
            sequence: self.cycles,
            paused_for: now.saturating_sub(started),
        })
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }
}

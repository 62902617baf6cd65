//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in every crate of the workspace that enables the
//! `test-utils` feature.

use std::collections::VecDeque;

use crate::clock::ManualClock;
use crate::fixed::Fixed64;
use crate::magnitude::MagnitudeVector;
use crate::rng::{RandomSource, SimRng};

// ===========================================================================
// Fixed-point helpers
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Build a magnitude vector from `(key, value)` pairs.
pub fn magnitudes(pairs: &[(&str, f64)]) -> MagnitudeVector {
    pairs.iter().map(|&(k, v)| (k, fixed(v))).collect()
}

// ===========================================================================
// Time and randomness
// ===========================================================================

pub fn clock_at(t: u64) -> ManualClock {
    ManualClock::new(t)
}

pub fn seeded_rng() -> SimRng {
    SimRng::new(0x5EED)
}

/// A random source that replays a fixed script of values.
///
/// Each call to `next_int` pops the next scripted value and clamps it into
/// the requested range. Once the script runs out it keeps returning `min`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    script: VecDeque<i32>,
    calls: usize,
}

impl ScriptedRng {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            calls: 0,
        }
    }

    /// Script a sequence of tiles; each tile consumes two draws (x then y).
    pub fn tiles(tiles: &[(i32, i32)]) -> Self {
        Self::new(tiles.iter().flat_map(|&(x, y)| [x, y]))
    }

    /// Number of `next_int` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl RandomSource for ScriptedRng {
    fn next_int(&mut self, min: i32, max: i32) -> i32 {
        self.calls += 1;
        if max <= min {
            return min;
        }
        match self.script.pop_front() {
            Some(v) => v.clamp(min, max - 1),
            None => min,
        }
    }
}

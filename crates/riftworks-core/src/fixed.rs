use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Used for every magnitude that accumulates over time. Addition and
/// subtraction are exact, so repeated accumulation never drifts.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time. All timers are absolute
/// tick stamps, never countdowns.
pub type Ticks = u64;

/// Tick rate assumed when durations are configured in seconds.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// Convert an f64 to Fixed64, or `None` if it is not finite or lies
/// outside the Q32.32 range. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Option<Fixed64> {
    Fixed64::checked_from_num(v)
}

/// Convert a duration in seconds to whole ticks at the given tick rate.
///
/// Rounds to the nearest tick; negative durations clamp to zero. Intended
/// for data loading only.
pub fn seconds_to_ticks(seconds: f64, ticks_per_second: u32) -> Ticks {
    let ticks = (seconds * f64::from(ticks_per_second)).round();
    if ticks <= 0.0 { 0 } else { ticks as Ticks }
}

//! Sparse keyed magnitudes ("chaos" scores).
//!
//! A [`MagnitudeVector`] maps category keys to [`Fixed64`] magnitudes. A key
//! that is not stored reads as zero, but an explicitly stored zero is still
//! an entry: equality and the comparison helpers look at the stored entry
//! set, not at implied zeros.
//!
//! Two families of combinators exist:
//!
//! - The operators (`+`, `-`) take the union of keys.
//! - [`MagnitudeVector::exclusive_add`] / [`MagnitudeVector::exclusive_subtract`]
//!   only touch keys the receiver already has.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;

/// Sparse mapping from category key to fixed-point magnitude.
///
/// Keys are kept in sorted order so iteration, display and hashing of the
/// vector are deterministic.
///
/// Entries share the Q32.32 range of [`Fixed64`], roughly ±2.1e9. The
/// arithmetic operators and [`total`](Self::total) overflow like the scalar
/// type does past that range; use [`checked_total`](Self::checked_total) or
/// [`checked_div`](Self::checked_div) when inputs are untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MagnitudeVector {
    entries: BTreeMap<String, Fixed64>,
}

impl MagnitudeVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all stored magnitudes.
    pub fn total(&self) -> Fixed64 {
        self.entries.values().fold(Fixed64::ZERO, |acc, &v| acc + v)
    }

    /// Sum of all stored magnitudes, or `None` if it leaves the Q32.32 range.
    pub fn checked_total(&self) -> Option<Fixed64> {
        self.entries.values().try_fold(Fixed64::ZERO, |acc, &v| acc.checked_add(v))
    }

    /// Whether the vector has no entries. A vector holding only zeros is
    /// not empty until [`trim_zeros`](Self::trim_zeros) runs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<Fixed64> {
        self.entries.get(key).copied()
    }

    /// Read a key, treating a missing entry as zero.
    pub fn get_or_zero(&self, key: &str) -> Fixed64 {
        self.get(key).unwrap_or(Fixed64::ZERO)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite an entry. Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Fixed64) -> Option<Fixed64> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Fixed64> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Fixed64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn entries(&self) -> &BTreeMap<String, Fixed64> {
        &self.entries
    }

    // -- Comparison --

    /// True if any key tracked by both vectors is strictly larger here.
    ///
    /// Keys missing from `other` are skipped, not compared against zero.
    pub fn any_worse_than(&self, other: &MagnitudeVector) -> bool {
        self.entries
            .iter()
            .any(|(key, &value)| other.entries.get(key).is_some_and(|&o| value > o))
    }

    /// True if every key here is either untracked by `other` or strictly
    /// smaller than `other`'s value.
    ///
    /// This is not `!any_worse_than(other)`: equal values fail this check
    /// without counting as worse, and untracked keys pass both.
    pub fn all_better_than(&self, other: &MagnitudeVector) -> bool {
        self.entries
            .iter()
            .all(|(key, &value)| other.entries.get(key).is_none_or(|&o| value < o))
    }

    // -- In-place --

    /// Remove every entry whose magnitude is exactly zero.
    pub fn trim_zeros(&mut self) {
        self.entries.retain(|_, v| *v != Fixed64::ZERO);
    }

    /// Clamp every entry into `[min, max]`. Keys are never added.
    ///
    /// `min` must be strictly less than `max`.
    pub fn clamp(&mut self, min: Fixed64, max: Fixed64) {
        debug_assert!(min < max, "clamp range is empty: min {min} >= max {max}");
        self.clamp_max(max);
        self.clamp_min(min);
    }

    /// Raise entries below `min` up to `min`. Only existing keys are touched.
    pub fn clamp_min(&mut self, min: Fixed64) {
        for value in self.entries.values_mut() {
            if *value < min {
                *value = min;
            }
        }
    }

    /// Lower entries above `max` down to `max`. Only existing keys are touched.
    pub fn clamp_max(&mut self, max: Fixed64) {
        for value in self.entries.values_mut() {
            if *value > max {
                *value = max;
            }
        }
    }

    // -- Copy-producing --

    /// Add `other`'s magnitudes to the keys this vector already has. Keys
    /// only present in `other` are dropped.
    pub fn exclusive_add(&self, other: &MagnitudeVector) -> MagnitudeVector {
        let mut result = self.clone();
        for (key, &value) in &other.entries {
            if let Some(existing) = result.entries.get_mut(key) {
                *existing += value;
            }
        }
        result
    }

    /// Subtract `other`'s magnitudes from the keys this vector already has.
    /// Keys only present in `other` are dropped.
    pub fn exclusive_subtract(&self, other: &MagnitudeVector) -> MagnitudeVector {
        let mut result = self.clone();
        for (key, &value) in &other.entries {
            if let Some(existing) = result.entries.get_mut(key) {
                *existing -= value;
            }
        }
        result
    }

    /// Scale every entry by `factor`.
    pub fn scale(&self, factor: Fixed64) -> MagnitudeVector {
        self.map_values(|v| v * factor)
    }

    /// Divide every entry by `divisor`, or `None` if `divisor` is zero.
    pub fn checked_div(&self, divisor: Fixed64) -> Option<MagnitudeVector> {
        if divisor == Fixed64::ZERO {
            return None;
        }
        Some(self.map_values(|v| v / divisor))
    }

    fn map_values(&self, f: impl Fn(Fixed64) -> Fixed64) -> MagnitudeVector {
        MagnitudeVector {
            entries: self
                .entries
                .iter()
                .map(|(k, &v)| (k.clone(), f(v)))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, Fixed64>> for MagnitudeVector {
    fn from(entries: BTreeMap<String, Fixed64>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>> FromIterator<(K, Fixed64)> for MagnitudeVector {
    fn from_iter<I: IntoIterator<Item = (K, Fixed64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl fmt::Display for MagnitudeVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

impl AddAssign<&MagnitudeVector> for MagnitudeVector {
    fn add_assign(&mut self, rhs: &MagnitudeVector) {
        for (key, &value) in &rhs.entries {
            *self.entries.entry(key.clone()).or_insert(Fixed64::ZERO) += value;
        }
    }
}

// Subtraction is spelled out rather than `a + (-b)` so a missing key on the
// left becomes `-value` without an intermediate allocation.
impl SubAssign<&MagnitudeVector> for MagnitudeVector {
    fn sub_assign(&mut self, rhs: &MagnitudeVector) {
        for (key, &value) in &rhs.entries {
            *self.entries.entry(key.clone()).or_insert(Fixed64::ZERO) -= value;
        }
    }
}

impl Add<&MagnitudeVector> for &MagnitudeVector {
    type Output = MagnitudeVector;

    fn add(self, rhs: &MagnitudeVector) -> MagnitudeVector {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl Add for MagnitudeVector {
    type Output = MagnitudeVector;

    fn add(mut self, rhs: MagnitudeVector) -> MagnitudeVector {
        self += &rhs;
        self
    }
}

impl Sub<&MagnitudeVector> for &MagnitudeVector {
    type Output = MagnitudeVector;

    fn sub(self, rhs: &MagnitudeVector) -> MagnitudeVector {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl Sub for MagnitudeVector {
    type Output = MagnitudeVector;

    fn sub(mut self, rhs: MagnitudeVector) -> MagnitudeVector {
        self -= &rhs;
        self
    }
}

impl Mul<Fixed64> for &MagnitudeVector {
    type Output = MagnitudeVector;

    fn mul(self, factor: Fixed64) -> MagnitudeVector {
        self.scale(factor)
    }
}

impl Mul<Fixed64> for MagnitudeVector {
    type Output = MagnitudeVector;

    fn mul(self, factor: Fixed64) -> MagnitudeVector {
        self.scale(factor)
    }
}

impl Mul<MagnitudeVector> for Fixed64 {
    type Output = MagnitudeVector;

    fn mul(self, vector: MagnitudeVector) -> MagnitudeVector {
        vector.scale(self)
    }
}

impl Mul<&MagnitudeVector> for Fixed64 {
    type Output = MagnitudeVector;

    fn mul(self, vector: &MagnitudeVector) -> MagnitudeVector {
        vector.scale(self)
    }
}

/// Panics on a zero divisor, like the scalar type. Use
/// [`MagnitudeVector::checked_div`] when the divisor is untrusted.
impl Div<Fixed64> for &MagnitudeVector {
    type Output = MagnitudeVector;

    fn div(self, divisor: Fixed64) -> MagnitudeVector {
        self.map_values(|v| v / divisor)
    }
}

impl Div<Fixed64> for MagnitudeVector {
    type Output = MagnitudeVector;

    fn div(self, divisor: Fixed64) -> MagnitudeVector {
        &self / divisor
    }
}

impl Neg for &MagnitudeVector {
    type Output = MagnitudeVector;

    fn neg(self) -> MagnitudeVector {
        self.scale(Fixed64::from_num(-1))
    }
}

impl Neg for MagnitudeVector {
    type Output = MagnitudeVector;

    fn neg(self) -> MagnitudeVector {
        -&self
    }
}

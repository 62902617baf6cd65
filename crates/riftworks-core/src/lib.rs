//! Riftworks Core -- shared primitives for the station simulation.
//!
//! This crate provides deterministic fixed-point arithmetic, typed ids, the
//! SplitMix64 random source, the simulation clock and pause bookkeeping,
//! sparse magnitude vectors, and the buffered event bus that every other
//! Riftworks crate builds on.
//!
//! # Key Types
//!
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`magnitude::MagnitudeVector`] -- sparse keyed magnitudes ("chaos")
//!   with exclusive and union combinators.
//! - [`rng::SimRng`] -- SplitMix64 generator behind the
//!   [`rng::RandomSource`] trait.
//! - [`clock::Clock`] / [`clock::PauseTracker`] -- absolute tick stamps and
//!   one-shot pause reports.
//! - [`event::EventBus`] -- typed event bus with buffered delivery.

pub mod clock;
pub mod event;
pub mod fixed;
pub mod id;
pub mod magnitude;
pub mod rng;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

//! Riftworks Station -- anomaly generators and cargo gift dispatch.
//!
//! A generator converts a fixed material cost plus an elapsed cooldown into
//! a timed production run. When the run ends, the per-tick driver searches
//! the station grid for a free tile and requests a spawn there.
//!
//! # Design
//!
//! - [`generator::GeneratorSystem`] owns every generator, the injected
//!   [`Clock`](riftworks_core::clock::Clock) and
//!   [`RandomSource`](riftworks_core::rng::RandomSource), and an event bus.
//! - Materials, power and grids belong to the host and are reached through
//!   the traits in [`env`], bundled per call in [`env::GeneratorEnv`].
//! - UI, audio, radio and admin logging are typed
//!   [`event::GeneratorEvent`]s; the host drains them once per tick.
//! - [`gift::GiftDispatcher`] places a manifest of gift orders into the
//!   cargo order book a batch at a time.

pub mod env;
pub mod event;
pub mod generator;
pub mod gift;
pub mod ui;

pub use env::{GeneratorEnv, GridLocator, MaterialStorage, MaterialStore, PowerQuery, StationGrids};
pub use event::{GeneratorEvent, GeneratorEventKind};
pub use generator::{Generator, GeneratorPhase, GeneratorSpec, GeneratorSystem};
pub use gift::{GiftDispatcher, GiftOrder, GiftRule, GiftTick, OrderBook, OrderDatabase};
pub use ui::{GeneratorUiState, UiStateError};

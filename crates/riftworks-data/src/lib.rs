//! Data-driven station configuration.
//!
//! Reads generator, gift and placement definitions from RON, TOML or JSON
//! files in a data directory and resolves them into the runtime types of
//! `riftworks-station` and `riftworks-spatial`.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, StationData, load_station_data, load_station_data_at_rate};

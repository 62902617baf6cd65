//! Serde data file structs for station content definitions.
//!
//! These structs define the on-disk format for generators, gift rules and
//! placement settings. Durations are written in seconds and converted to
//! ticks by the loader.

use std::collections::BTreeMap;

use riftworks_spatial::DEFAULT_MAX_ATTEMPTS;
use serde::Deserialize;

// ===========================================================================
// Generators
// ===========================================================================

/// An anomaly generator definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorData {
    pub name: String,
    #[serde(default = "default_material")]
    pub required_material: String,
    #[serde(default = "default_material_per_production")]
    pub material_per_production: u32,
    #[serde(default = "default_generation_seconds")]
    pub generation_seconds: f64,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: f64,
    #[serde(default = "default_spawner")]
    pub spawner_prototype: String,
    #[serde(default = "default_channel")]
    pub broadcast_channel: String,
    #[serde(default = "default_announcement")]
    pub announcement: String,
    #[serde(default = "default_generating_sound")]
    pub generating_sound: String,
    #[serde(default = "default_finished_sound")]
    pub finished_sound: String,
}

fn default_material() -> String {
    "Plasma".to_string()
}

fn default_material_per_production() -> u32 {
    1500
}

fn default_generation_seconds() -> f64 {
    8.0
}

fn default_cooldown_seconds() -> f64 {
    300.0
}

fn default_spawner() -> String {
    "RandomAnomalySpawner".to_string()
}

fn default_channel() -> String {
    "Science".to_string()
}

fn default_announcement() -> String {
    "The anomaly generator has finished generating.".to_string()
}

fn default_generating_sound() -> String {
    "anomaly_generate".to_string()
}

fn default_finished_sound() -> String {
    "anomaly_generate_finished".to_string()
}

// ===========================================================================
// Gifts
// ===========================================================================

/// A cargo gift rule in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct GiftRuleData {
    pub name: String,
    #[serde(default = "default_description", alias = "descr")]
    pub description: String,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_care_of", alias = "careof")]
    pub care_of: String,
    /// Product id to quantity.
    pub gifts: BTreeMap<String, u32>,
    #[serde(default = "default_order_space")]
    pub order_space_to_leave: u32,
    #[serde(default = "default_gift_seconds", alias = "time_until_next_gifts")]
    pub seconds_between_gifts: f64,
}

fn default_description() -> String {
    "A bundle of gifts".to_string()
}

fn default_sender() -> String {
    "NanoTrasen".to_string()
}

fn default_care_of() -> String {
    "The Cargo Dept.".to_string()
}

fn default_order_space() -> u32 {
    5
}

fn default_gift_seconds() -> f64 {
    10.0
}

// ===========================================================================
// Placement
// ===========================================================================

/// Placement search settings in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementData {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Factor applied to the spawn grid's bounds before searching.
    #[serde(default = "default_bounds_scale")]
    pub grid_bounds_scale: f64,
}

impl Default for PlacementData {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            grid_bounds_scale: default_bounds_scale(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_bounds_scale() -> f64 {
    1.0
}

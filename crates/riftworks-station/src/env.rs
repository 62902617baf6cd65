//! Host-side collaborators a generator reads from or writes to.
//!
//! The generator system never owns materials, power or grids. Each call
//! receives a [`GeneratorEnv`] of borrowed collaborators instead.

use std::collections::BTreeMap;

use riftworks_core::id::{GeneratorId, GridId};
use riftworks_spatial::{TileGrid, TileQuery};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Per-generator material containers.
pub trait MaterialStorage {
    /// Amount of `material` held by the generator. Unknown owners hold none.
    fn amount(&self, owner: GeneratorId, material: &str) -> u32;

    /// Add `delta` (negative to remove) of `material`. All-or-nothing:
    /// returns false and changes nothing if the result would be negative
    /// or exceed the container's capacity.
    fn try_change_amount(&mut self, owner: GeneratorId, material: &str, delta: i64) -> bool;
}

/// Whether a generator currently receives power.
pub trait PowerQuery {
    fn is_powered(&self, generator: GeneratorId) -> bool;
}

impl<F: Fn(GeneratorId) -> bool> PowerQuery for F {
    fn is_powered(&self, generator: GeneratorId) -> bool {
        self(generator)
    }
}

/// Resolves the grid a generator's spawns land on.
pub trait GridLocator {
    fn spawn_grid(&self, generator: GeneratorId) -> Option<(GridId, &dyn TileQuery)>;
}

/// Borrowed collaborators for one call into the generator system.
pub struct GeneratorEnv<'a> {
    pub materials: &'a mut dyn MaterialStorage,
    pub power: &'a dyn PowerQuery,
    pub grids: &'a dyn GridLocator,
}

// ---------------------------------------------------------------------------
// MaterialStore
// ---------------------------------------------------------------------------

/// A single material container with an optional total capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialStore {
    amounts: BTreeMap<String, u32>,
    capacity: Option<u32>,
}

impl MaterialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            amounts: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn amount(&self, material: &str) -> u32 {
        self.amounts.get(material).copied().unwrap_or(0)
    }

    /// Sum of every material held.
    pub fn total(&self) -> u64 {
        self.amounts.values().map(|&v| u64::from(v)).sum()
    }

    pub fn try_change_amount(&mut self, material: &str, delta: i64) -> bool {
        let current = self.amount(material);
        let Some(next) = i64::from(current).checked_add(delta) else {
            return false;
        };
        let Ok(next) = u32::try_from(next) else {
            return false;
        };
        if let Some(capacity) = self.capacity {
            let total = self.total() - u64::from(current) + u64::from(next);
            if total > u64::from(capacity) {
                return false;
            }
        }
        if next == 0 {
            self.amounts.remove(material);
        } else {
            self.amounts.insert(material.to_string(), next);
        }
        true
    }
}

impl MaterialStorage for SecondaryMap<GeneratorId, MaterialStore> {
    fn amount(&self, owner: GeneratorId, material: &str) -> u32 {
        self.get(owner).map_or(0, |store| store.amount(material))
    }

    fn try_change_amount(&mut self, owner: GeneratorId, material: &str, delta: i64) -> bool {
        self.get_mut(owner)
            .is_some_and(|store| store.try_change_amount(material, delta))
    }
}

// ---------------------------------------------------------------------------
// StationGrids
// ---------------------------------------------------------------------------

/// Grids known to the host, the subset that belongs to the station, and
/// which grid each generator sits on.
#[derive(Debug, Default)]
pub struct StationGrids {
    grids: SlotMap<GridId, TileGrid>,
    station: Vec<GridId>,
    placed_on: SecondaryMap<GeneratorId, GridId>,
}

impl StationGrids {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid that is not part of the station.
    pub fn add_grid(&mut self, grid: TileGrid) -> GridId {
        self.grids.insert(grid)
    }

    /// Register a grid as part of the station.
    pub fn add_station_grid(&mut self, grid: TileGrid) -> GridId {
        let id = self.grids.insert(grid);
        self.station.push(id);
        id
    }

    pub fn remove_grid(&mut self, id: GridId) -> Option<TileGrid> {
        self.station.retain(|&g| g != id);
        self.grids.remove(id)
    }

    pub fn grid(&self, id: GridId) -> Option<&TileGrid> {
        self.grids.get(id)
    }

    pub fn grid_mut(&mut self, id: GridId) -> Option<&mut TileGrid> {
        self.grids.get_mut(id)
    }

    /// Record that a generator sits on `grid`.
    pub fn place_generator(&mut self, generator: GeneratorId, grid: GridId) {
        self.placed_on.insert(generator, grid);
    }

    /// The station grid with the most floor tiles.
    pub fn largest_station_grid(&self) -> Option<GridId> {
        self.station
            .iter()
            .filter_map(|&id| self.grids.get(id).map(|grid| (id, grid.floor_count())))
            .max_by_key(|&(_, floor)| floor)
            .map(|(id, _)| id)
    }
}

impl GridLocator for StationGrids {
    /// The largest station grid when the station has one, else the grid the
    /// generator sits on.
    fn spawn_grid(&self, generator: GeneratorId) -> Option<(GridId, &dyn TileQuery)> {
        let id = self
            .largest_station_grid()
            .or_else(|| self.placed_on.get(generator).copied())?;
        let grid = self.grids.get(id)?;
        Some((id, grid as &dyn TileQuery))
    }
}

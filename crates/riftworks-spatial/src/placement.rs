//! Bounded randomized placement search.
//!
//! Draws random tiles inside a region, rejects tiles that are blocked or
//! hold a solid anchored occupant, and takes the first tile that passes.
//! When the attempt budget runs out the search falls back to the region's
//! reference point instead of failing.

use riftworks_core::fixed::Fixed64;
use riftworks_core::rng::RandomSource;
use serde::{Deserialize, Serialize};

use crate::{GridPosition, LocalPosition, Occupant, TileQuery, TileRect};

/// Attempts made before falling back to the reference point.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 25;

/// Tunables for searching a whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSettings {
    /// Random draws before falling back.
    pub max_attempts: u32,
    /// Factor applied to the grid bounds (about their centre) before
    /// drawing. Values below one keep placements away from the hull.
    pub bounds_scale: Fixed64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            bounds_scale: Fixed64::from_num(1),
        }
    }
}

/// Result of a placement search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementOutcome {
    /// A tile passed every check.
    Found {
        tile: GridPosition,
        position: LocalPosition,
        /// 1-based index of the draw that succeeded.
        attempts: u32,
    },
    /// No tile passed; `position` is the unvalidated reference point.
    Fallback { position: LocalPosition, attempts: u32 },
}

impl PlacementOutcome {
    /// Where the result should be materialized.
    pub fn position(&self) -> LocalPosition {
        match self {
            PlacementOutcome::Found { position, .. } | PlacementOutcome::Fallback { position, .. } => {
                *position
            }
        }
    }

    pub fn tile(&self) -> Option<GridPosition> {
        match self {
            PlacementOutcome::Found { tile, .. } => Some(*tile),
            PlacementOutcome::Fallback { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PlacementOutcome::Found { attempts, .. } | PlacementOutcome::Fallback { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PlacementOutcome::Fallback { .. })
    }
}

/// One placement search over a tile region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSearch {
    pub region: TileRect,
    pub reference: LocalPosition,
    pub tile_size: Fixed64,
    pub max_attempts: u32,
}

impl PlacementSearch {
    pub fn new(region: TileRect, reference: LocalPosition) -> Self {
        Self {
            region,
            reference,
            tile_size: Fixed64::from_num(1),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_tile_size(mut self, tile_size: Fixed64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Run the search. The first tile that is neither blocked nor occupied
    /// by a solid wins; there is no scoring among valid tiles.
    ///
    /// An empty region never draws and falls back immediately.
    pub fn run<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        is_blocked: impl Fn(GridPosition) -> bool,
        is_occupied_by_solid: impl Fn(GridPosition) -> bool,
    ) -> PlacementOutcome {
        if self.region.is_empty() {
            tracing::debug!(region = ?self.region, "placement region is empty, using reference point");
            return PlacementOutcome::Fallback {
                position: self.reference,
                attempts: 0,
            };
        }

        for attempt in 1..=self.max_attempts {
            let x = rng.next_int(self.region.left, self.region.right);
            let y = rng.next_int(self.region.bottom, self.region.top);
            let tile = GridPosition::new(x, y);

            if is_blocked(tile) || is_occupied_by_solid(tile) {
                continue;
            }

            return PlacementOutcome::Found {
                tile,
                position: tile.to_local(self.tile_size),
                attempts: attempt,
            };
        }

        tracing::debug!(
            region = ?self.region,
            attempts = self.max_attempts,
            "no valid tile found, using reference point"
        );
        PlacementOutcome::Fallback {
            position: self.reference,
            attempts: self.max_attempts,
        }
    }
}

/// Search a grid for a free tile.
///
/// The region is the grid bounds scaled by `settings.bounds_scale`; the
/// fallback is the grid's origin. A tile is blocked when it is out of
/// bounds or impassable to gas flow, and occupied when any anchored
/// occupant [blocks placement](Occupant::blocks_placement).
pub fn find_placement_on_grid<G, R>(grid: &G, settings: &PlacementSettings, rng: &mut R) -> PlacementOutcome
where
    G: TileQuery + ?Sized,
    R: RandomSource + ?Sized,
{
    PlacementSearch::new(grid.bounds().scaled(settings.bounds_scale), grid.origin())
        .with_tile_size(grid.tile_size())
        .with_max_attempts(settings.max_attempts)
        .run(
            rng,
            |tile| grid.is_out_of_bounds(tile) || grid.is_impassable_to_flow(tile),
            |tile| grid.anchored_occupants(tile).iter().any(Occupant::blocks_placement),
        )
}

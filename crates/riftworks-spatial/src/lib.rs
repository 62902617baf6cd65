//! Spatial grid module for tile queries and randomized placement.
//!
//! Provides grid coordinates, half-open tile rectangles, the [`TileQuery`]
//! trait the placement search reads from, and [`TileGrid`], a simple
//! in-memory grid implementing it.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{BitAnd, BitOr};

use riftworks_core::fixed::Fixed64;
use serde::{Deserialize, Serialize};

pub mod placement;
pub use placement::{
    DEFAULT_MAX_ATTEMPTS, PlacementOutcome, PlacementSearch, PlacementSettings,
    find_placement_on_grid,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A tile position on a grid, in grid-local integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Centre of this tile in grid-local coordinates.
    pub fn to_local(self, tile_size: Fixed64) -> LocalPosition {
        let half = Fixed64::from_num(0.5);
        LocalPosition {
            x: (Fixed64::from_num(self.x) + half) * tile_size,
            y: (Fixed64::from_num(self.y) + half) * tile_size,
        }
    }
}

/// A continuous position relative to a grid's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPosition {
    pub x: Fixed64,
    pub y: Fixed64,
}

impl LocalPosition {
    pub const ORIGIN: LocalPosition = LocalPosition {
        x: Fixed64::ZERO,
        y: Fixed64::ZERO,
    };

    pub fn new(x: Fixed64, y: Fixed64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for LocalPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned tile rectangle. Inclusive on the left/bottom edges,
/// exclusive on the right/top edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl TileRect {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// A rectangle with no tiles.
    pub fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn width(&self) -> u32 {
        (i64::from(self.right) - i64::from(self.left)).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (i64::from(self.top) - i64::from(self.bottom)).max(0) as u32
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// True if the rectangle contains no tiles.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, tile: GridPosition) -> bool {
        tile.x >= self.left && tile.x < self.right && tile.y >= self.bottom && tile.y < self.top
    }

    /// Smallest rectangle containing both this one and `tile`.
    pub fn expanded_to(&self, tile: GridPosition) -> Self {
        if self.is_empty() {
            return Self::new(tile.x, tile.y, tile.x + 1, tile.y + 1);
        }
        Self::new(
            self.left.min(tile.x),
            self.bottom.min(tile.y),
            self.right.max(tile.x + 1),
            self.top.max(tile.y + 1),
        )
    }

    /// Scale the rectangle about its centre. Edges are truncated toward zero
    /// after scaling. Non-positive factors produce an empty rectangle.
    pub fn scaled(&self, factor: Fixed64) -> Self {
        if factor <= Fixed64::ZERO || self.is_empty() {
            return Self::empty();
        }
        // Halve before combining so the centre and extents stay in range.
        let half = |v: i32| Fixed64::from_num(v) / Fixed64::from_num(2);
        let (left, right) = (half(self.left), half(self.right));
        let (bottom, top) = (half(self.bottom), half(self.top));
        let cx = left + right;
        let cy = bottom + top;
        let hw = right.saturating_sub(left).saturating_mul(factor);
        let hh = top.saturating_sub(bottom).saturating_mul(factor);
        let edge = |v: Fixed64| v.round_to_zero().saturating_to_num::<i32>();
        Self::new(
            edge(cx.saturating_sub(hw)),
            edge(cy.saturating_sub(hh)),
            edge(cx.saturating_add(hw)),
            edge(cy.saturating_add(hh)),
        )
    }

    /// Iterate over every tile in the rectangle, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = GridPosition> {
        let (left, right) = (self.left, self.right);
        (self.bottom..self.top).flat_map(move |y| (left..right).map(move |x| GridPosition::new(x, y)))
    }
}

// ---------------------------------------------------------------------------
// Occupants
// ---------------------------------------------------------------------------

/// How a physics body participates in collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    Static,
    Dynamic,
    Kinematic,
}

/// Bitmask of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const NONE: CollisionMask = CollisionMask(0);
    pub const OPAQUE: CollisionMask = CollisionMask(1 << 0);
    pub const IMPASSABLE: CollisionMask = CollisionMask(1 << 1);
    pub const MID_IMPASSABLE: CollisionMask = CollisionMask(1 << 2);
    pub const HIGH_IMPASSABLE: CollisionMask = CollisionMask(1 << 3);
    pub const LOW_IMPASSABLE: CollisionMask = CollisionMask(1 << 4);

    pub fn intersects(self, other: CollisionMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for CollisionMask {
    type Output = CollisionMask;

    fn bitor(self, rhs: CollisionMask) -> CollisionMask {
        CollisionMask(self.0 | rhs.0)
    }
}

impl BitAnd for CollisionMask {
    type Output = CollisionMask;

    fn bitand(self, rhs: CollisionMask) -> CollisionMask {
        CollisionMask(self.0 & rhs.0)
    }
}

/// An object anchored to a tile, as seen by the physics query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub body_type: BodyType,
    pub hard: bool,
    pub collision_layer: CollisionMask,
}

impl Occupant {
    /// A hard static wall-like body on the impassable layer.
    pub fn wall() -> Self {
        Self {
            body_type: BodyType::Static,
            hard: true,
            collision_layer: CollisionMask::OPAQUE | CollisionMask::IMPASSABLE,
        }
    }

    /// True if nothing can be placed on a tile this occupant is anchored to:
    /// a hard static body on the impassable layer.
    pub fn blocks_placement(&self) -> bool {
        self.body_type == BodyType::Static
            && self.hard
            && self.collision_layer.intersects(CollisionMask::IMPASSABLE)
    }
}

// ---------------------------------------------------------------------------
// TileQuery
// ---------------------------------------------------------------------------

/// Read-only view of a grid used by the placement search.
pub trait TileQuery {
    /// Bounding rectangle of the grid's tiles.
    fn bounds(&self) -> TileRect;

    /// The grid's own reference point, used when no tile can be validated.
    fn origin(&self) -> LocalPosition {
        LocalPosition::ORIGIN
    }

    /// Edge length of one tile in local units.
    fn tile_size(&self) -> Fixed64 {
        Fixed64::from_num(1)
    }

    /// True if the tile is outside playable space (no floor, open space).
    fn is_out_of_bounds(&self, tile: GridPosition) -> bool;

    /// True if gas cannot flow through the tile.
    fn is_impassable_to_flow(&self, tile: GridPosition) -> bool;

    /// Objects anchored to the tile.
    fn anchored_occupants(&self, tile: GridPosition) -> &[Occupant];
}

/// Errors from grid edits.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpatialError {
    #[error("no floor at ({}, {})", .0.x, .0.y)]
    NoFloor(GridPosition),
    #[error("tile ({}, {}) still has anchored occupants", .0.x, .0.y)]
    Occupied(GridPosition),
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// In-memory grid: a set of floor tiles, an air-blocked overlay, and the
/// occupants anchored to each tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    floor: BTreeSet<GridPosition>,
    air_blocked: BTreeSet<GridPosition>,
    anchored: BTreeMap<GridPosition, Vec<Occupant>>,
    tile_size: Fixed64,
    origin: LocalPosition,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl TileGrid {
    pub fn new() -> Self {
        Self {
            floor: BTreeSet::new(),
            air_blocked: BTreeSet::new(),
            anchored: BTreeMap::new(),
            tile_size: Fixed64::from_num(1),
            origin: LocalPosition::ORIGIN,
        }
    }

    /// A grid with every tile of `rect` floored.
    pub fn filled(rect: TileRect) -> Self {
        let mut grid = Self::new();
        grid.fill_floor(rect);
        grid
    }

    pub fn with_tile_size(mut self, tile_size: Fixed64) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_origin(mut self, origin: LocalPosition) -> Self {
        self.origin = origin;
        self
    }

    // -- Floor --

    pub fn set_floor(&mut self, tile: GridPosition) {
        self.floor.insert(tile);
    }

    pub fn fill_floor(&mut self, rect: TileRect) {
        self.floor.extend(rect.tiles());
    }

    /// Remove the floor under a tile. Fails while anything is anchored there.
    pub fn remove_floor(&mut self, tile: GridPosition) -> Result<(), SpatialError> {
        if self.anchored.get(&tile).is_some_and(|o| !o.is_empty()) {
            return Err(SpatialError::Occupied(tile));
        }
        self.floor.remove(&tile);
        self.air_blocked.remove(&tile);
        Ok(())
    }

    pub fn has_floor(&self, tile: GridPosition) -> bool {
        self.floor.contains(&tile)
    }

    pub fn floor_count(&self) -> usize {
        self.floor.len()
    }

    // -- Atmosphere --

    pub fn set_air_blocked(&mut self, tile: GridPosition, blocked: bool) {
        if blocked {
            self.air_blocked.insert(tile);
        } else {
            self.air_blocked.remove(&tile);
        }
    }

    // -- Anchoring --

    /// Anchor an occupant to a floored tile.
    pub fn anchor(&mut self, tile: GridPosition, occupant: Occupant) -> Result<(), SpatialError> {
        if !self.floor.contains(&tile) {
            return Err(SpatialError::NoFloor(tile));
        }
        self.anchored.entry(tile).or_default().push(occupant);
        Ok(())
    }

    /// Remove and return everything anchored to a tile.
    pub fn unanchor_all(&mut self, tile: GridPosition) -> Vec<Occupant> {
        self.anchored.remove(&tile).unwrap_or_default()
    }
}

impl TileQuery for TileGrid {
    fn bounds(&self) -> TileRect {
        self.floor
            .iter()
            .fold(TileRect::empty(), |rect, &tile| rect.expanded_to(tile))
    }

    fn origin(&self) -> LocalPosition {
        self.origin
    }

    fn tile_size(&self) -> Fixed64 {
        self.tile_size
    }

    fn is_out_of_bounds(&self, tile: GridPosition) -> bool {
        !self.floor.contains(&tile)
    }

    fn is_impassable_to_flow(&self, tile: GridPosition) -> bool {
        self.air_blocked.contains(&tile)
    }

    fn anchored_occupants(&self, tile: GridPosition) -> &[Occupant] {
        self.anchored.get(&tile).map(Vec::as_slice).unwrap_or(&[])
    }
}

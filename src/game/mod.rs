//! # Game Module
//!
//! Core game state, world representation, and the rules that mutate them.
//!
//! This module contains the fundamental building blocks of Burrow:
//! - Spatial model (tiles, rooms, maps, environments) and fog-of-war
//! - Entities, items, inventories and equipment
//! - The intent resolver, combat, item effects and enemy AI
//! - Quests and the central [`GameState`]

pub mod actions;
pub mod ai;
pub mod camera;
pub mod combat;
pub mod effects;
pub mod entities;
pub mod inventory;
pub mod items;
pub mod quests;
pub mod state;
pub mod world;

pub use actions::*;
pub use camera::*;
pub use combat::*;
pub use entities::*;
pub use items::*;
pub use quests::*;
pub use state::*;
pub use world::*;

use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 2D tile coordinate in an environment.
///
/// # Examples
///
/// ```
/// use burrow::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let around = pos.neighborhood();
/// assert_eq!(around.len(), 9); // The tile itself plus all 8 neighbours
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Converts a pixel coordinate to the tile containing it.
    pub fn from_pixels(px: i32, py: i32, tile_size: i32) -> Self {
        Self::new(px.div_euclid(tile_size), py.div_euclid(tile_size))
    }

    /// Top-left pixel of this tile.
    pub fn to_pixels(self, tile_size: i32) -> (i32, i32) {
        (self.x * tile_size, self.y * tile_size)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the 3x3 block centred on this position, row by row.
    pub fn neighborhood(self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(9);
        for dy in -1..=1 {
            for dx in -1..=1 {
                positions.push(Position::new(self.x + dx, self.y + dy));
            }
        }
        positions
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions for movement and facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a unit tile delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Converts a pixel-space movement request to a direction.
    ///
    /// Exactly one axis must be nonzero and it must be one tile long.
    pub fn from_pixel_delta(dx: i32, dy: i32, tile_size: i32) -> BurrowResult<Direction> {
        let invalid =
            || BurrowError::InvalidAction(format!("({dx}, {dy}) is not a single tile step"));
        if tile_size <= 0 || dx % tile_size != 0 || dy % tile_size != 0 {
            return Err(invalid());
        }
        Direction::from_delta(Position::new(dx / tile_size, dy / tile_size)).ok_or_else(invalid)
    }

    /// Returns all 4 directions.
    pub fn all() -> Vec<Direction> {
        vec![
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Identifier of an entity in [`GameState::entities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Identifier of an item in [`GameState::items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Index of a room in its map's room list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Hands out fresh entity and item ids.
///
/// Lives inside [`GameState`] and is serialized with it so ids stay unique
/// across save and load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_entity: u32,
    next_item: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub fn next_item(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }

    /// Whether `id` was handed out by this allocator.
    pub fn issued_entity(&self, id: EntityId) -> bool {
        id.0 < self.next_entity
    }

    pub fn issued_item(&self, id: ItemId) -> bool {
        id.0 < self.next_item
    }
}

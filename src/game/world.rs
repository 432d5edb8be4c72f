//! # World Representation
//!
//! Tiles, rooms, maps and the environments that own them.
//!
//! Cross references between tiles, rooms, entities and items are ids into the
//! owning collections, never pointers, so the whole world serializes as plain
//! data.

use super::{Camera, EntityId, ItemId, Position, RoomId};
use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual key of untouched dungeon rock.
pub const DEFAULT_WALL_KEY: &str = "wall_rock";
/// Visual key of generated dungeon floor.
pub const DEFAULT_FLOOR_KEY: &str = "floor_stone";

/// An axis-aligned rectangle, used to describe rooms.
///
/// # Examples
///
/// ```
/// use burrow::{Position, Rect};
///
/// let room = Rect::new(5, 5, 10, 8, "hall").unwrap();
/// assert_eq!(room.center(), Position::new(10, 9));
/// assert!(room.contains(Position::new(15, 13)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Still covered by fog-of-war
    pub hidden: bool,
    pub name: String,
}

impl Rect {
    /// Creates a hidden rectangle from its top-left corner and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32, name: impl Into<String>) -> BurrowResult<Self> {
        Self::from_corners(x, y, x + width, y + height, name)
    }

    /// Creates a hidden rectangle from two corners. Requires `x1 < x2` and `y1 < y2`.
    pub fn from_corners(
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        name: impl Into<String>,
    ) -> BurrowResult<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(BurrowError::InvalidState(format!(
                "degenerate rectangle ({x1}, {y1})-({x2}, {y2})"
            )));
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            hidden: true,
            name: name.into(),
        })
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Integer midpoint of the rectangle.
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Closed-interval overlap test on both axes, with each rectangle grown by
    /// `tolerance` tiles first. Rectangles sharing an edge intersect.
    pub fn intersects(&self, other: &Rect, tolerance: i32) -> bool {
        self.x1 - tolerance <= other.x2
            && self.x2 + tolerance >= other.x1
            && self.y1 - tolerance <= other.y2
            && self.y2 + tolerance >= other.y1
    }

    /// Inclusive containment test.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// Every position of the inclusive rectangle.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Position::new(x, y)))
    }

    /// Positions strictly inside the walls; these are carved as floor.
    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        ((self.y1 + 1)..self.y2)
            .flat_map(move |y| ((self.x1 + 1)..self.x2).map(move |x| Position::new(x, y)))
    }
}

/// One grid cell of a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub hidden: bool,
    pub unbreakable: bool,
    pub floor_key: String,
    pub wall_key: String,
    pub room: Option<RoomId>,
    pub entity: Option<EntityId>,
    pub item: Option<ItemId>,
}

impl Tile {
    /// A blocked, hidden rock tile.
    pub fn wall(floor_key: &str, wall_key: &str) -> Self {
        Self {
            blocked: true,
            hidden: true,
            unbreakable: false,
            floor_key: floor_key.to_string(),
            wall_key: wall_key.to_string(),
            room: None,
            entity: None,
            item: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Clears the tile so it can be walked on.
    pub fn carve(&mut self) {
        self.blocked = false;
    }
}

/// 2D tile grid plus the rooms carved into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    /// Tiles indexed as `tiles[y][x]`
    pub tiles: Vec<Vec<Tile>>,
    pub rooms: Vec<Rect>,
}

impl Map {
    /// Creates a map where every tile is blocked, hidden rock.
    pub fn new(width: u32, height: u32, floor_key: &str, wall_key: &str) -> Self {
        let tiles = (0..height)
            .map(|_| (0..width).map(|_| Tile::wall(floor_key, wall_key)).collect())
            .collect();
        Self {
            width,
            height,
            tiles,
            rooms: Vec::new(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Whether `pos` lies on the outermost ring of tiles.
    pub fn is_border(&self, pos: Position) -> bool {
        pos.x == 0
            || pos.y == 0
            || pos.x == self.width as i32 - 1
            || pos.y == self.height as i32 - 1
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Like [`Map::get_tile_mut`] but reports out-of-bounds access as an error.
    pub fn tile_mut(&mut self, pos: Position) -> BurrowResult<&mut Tile> {
        self.get_tile_mut(pos)
            .ok_or(BurrowError::MapBoundsViolation { x: pos.x, y: pos.y })
    }

    /// Blocked or outside the map.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get_tile(pos).map(|tile| tile.blocked).unwrap_or(true)
    }

    /// Neither blocked nor occupied.
    pub fn is_free(&self, pos: Position) -> bool {
        self.get_tile(pos)
            .map(|tile| !tile.blocked && tile.entity.is_none())
            .unwrap_or(false)
    }

    pub fn entity_at(&self, pos: Position) -> Option<EntityId> {
        self.get_tile(pos).and_then(|tile| tile.entity)
    }

    pub fn item_at(&self, pos: Position) -> Option<ItemId> {
        self.get_tile(pos).and_then(|tile| tile.item)
    }

    pub fn room(&self, id: RoomId) -> Option<&Rect> {
        self.rooms.get(id.0)
    }

    /// Adds a room to the room list and tags every tile of its inclusive
    /// rectangle with the new room id. Nothing is carved.
    pub fn add_room(&mut self, room: Rect) -> RoomId {
        let id = RoomId(self.rooms.len());
        let positions: Vec<Position> = room.positions().collect();
        for pos in positions {
            if let Some(tile) = self.get_tile_mut(pos) {
                tile.room = Some(id);
            }
        }
        self.rooms.push(room);
        id
    }

    /// Carves the interior of a room as floor.
    pub fn carve_room(&mut self, room: &Rect) {
        for pos in room.interior() {
            if let Some(tile) = self.get_tile_mut(pos) {
                tile.carve();
            }
        }
    }

    /// Carves a horizontal run of floor between `x1` and `x2` inclusive.
    pub fn carve_h_tunnel(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            let pos = Position::new(x, y);
            if self.is_border(pos) {
                continue;
            }
            if let Some(tile) = self.get_tile_mut(pos) {
                tile.carve();
                tile.unbreakable = false;
            }
        }
    }

    /// Carves a vertical run of floor between `y1` and `y2` inclusive.
    pub fn carve_v_tunnel(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            let pos = Position::new(x, y);
            if self.is_border(pos) {
                continue;
            }
            if let Some(tile) = self.get_tile_mut(pos) {
                tile.carve();
                tile.unbreakable = false;
            }
        }
    }

    /// Lifts the fog around `pos`.
    ///
    /// The 3x3 block centred on `pos` is always revealed. If `pos` belongs to a
    /// room that is still hidden, the whole room rectangle (walls included) is
    /// revealed too. Returns true when a room was revealed by this call.
    pub fn reveal(&mut self, pos: Position) -> bool {
        for neighbor in pos.neighborhood() {
            if let Some(tile) = self.get_tile_mut(neighbor) {
                tile.hidden = false;
            }
        }

        let room_id = match self.get_tile(pos).and_then(|tile| tile.room) {
            Some(id) => id,
            None => return false,
        };
        let room = match self.rooms.get_mut(room_id.0) {
            Some(room) if room.hidden => {
                room.hidden = false;
                room.clone()
            }
            _ => return false,
        };
        for room_pos in room.positions() {
            if let Some(tile) = self.get_tile_mut(room_pos) {
                tile.hidden = false;
            }
        }
        true
    }

    /// Clears fog from every tile and room.
    pub fn reveal_all(&mut self) {
        for tile in self.tiles.iter_mut().flat_map(|row| row.iter_mut()) {
            tile.hidden = false;
        }
        for room in &mut self.rooms {
            room.hidden = false;
        }
    }

    /// Number of walkable tiles.
    pub fn floor_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| !tile.blocked)
            .count()
    }

    /// Closest free tile to `origin`, searching outward ring by ring.
    pub fn nearest_free(&self, origin: Position) -> Option<Position> {
        if self.is_free(origin) {
            return Some(origin);
        }
        let max_radius = self.width.max(self.height) as i32;
        for radius in 1..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let pos = Position::new(origin.x + dx, origin.y + dy);
                    if self.is_free(pos) {
                        return Some(pos);
                    }
                }
            }
        }
        None
    }
}

/// Identity of an environment in the [`World`] registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentId {
    Garden,
    Home,
    /// Dungeon floor, 1-based
    Dungeon(u32),
}

impl EnvironmentId {
    /// Floor index; 0 for the hub environments.
    pub fn floor(self) -> u32 {
        match self {
            EnvironmentId::Dungeon(floor) => floor,
            _ => 0,
        }
    }

    pub fn is_dungeon(self) -> bool {
        matches!(self, EnvironmentId::Dungeon(_))
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentId::Garden => write!(f, "garden"),
            EnvironmentId::Home => write!(f, "home"),
            EnvironmentId::Dungeon(floor) => write!(f, "dungeon floor {floor}"),
        }
    }
}

/// A self-contained explorable world partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: String,
    pub map: Map,
    /// Live entities in this environment
    pub entities: Vec<EntityId>,
    /// Spawn and return point
    pub center: Position,
    pub camera: Camera,
}

impl Environment {
    pub fn new(id: EnvironmentId, name: impl Into<String>, map: Map, center: Position, camera: Camera) -> Self {
        Self {
            id,
            name: name.into(),
            map,
            entities: Vec::new(),
            center,
            camera,
        }
    }

    pub fn floor(&self) -> u32 {
        self.id.floor()
    }

    pub fn add_entity(&mut self, id: EntityId) {
        if !self.entities.contains(&id) {
            self.entities.push(id);
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.retain(|&other| other != id);
    }
}

/// Registry of every environment: the two hubs plus the dungeon floors.
///
/// Dungeon floors are append-only; once generated a floor stays for the rest
/// of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub garden: Environment,
    pub home: Environment,
    /// Floor N lives at index N - 1
    pub floors: Vec<Environment>,
}

impl World {
    pub fn new(garden: Environment, home: Environment) -> Self {
        Self {
            garden,
            home,
            floors: Vec::new(),
        }
    }

    pub fn get(&self, id: EnvironmentId) -> Option<&Environment> {
        match id {
            EnvironmentId::Garden => Some(&self.garden),
            EnvironmentId::Home => Some(&self.home),
            EnvironmentId::Dungeon(floor) => {
                let index = floor.checked_sub(1)?;
                self.floors.get(index as usize)
            }
        }
    }

    pub fn get_mut(&mut self, id: EnvironmentId) -> Option<&mut Environment> {
        match id {
            EnvironmentId::Garden => Some(&mut self.garden),
            EnvironmentId::Home => Some(&mut self.home),
            EnvironmentId::Dungeon(floor) => {
                let index = floor.checked_sub(1)?;
                self.floors.get_mut(index as usize)
            }
        }
    }

    /// Appends the next dungeon floor. Its id must be `Dungeon(floor_count + 1)`.
    pub fn push_floor(&mut self, environment: Environment) -> BurrowResult<()> {
        let expected = EnvironmentId::Dungeon(self.floors.len() as u32 + 1);
        if environment.id != expected {
            return Err(BurrowError::InvalidState(format!(
                "expected {expected}, got {}",
                environment.id
            )));
        }
        self.floors.push(environment);
        Ok(())
    }

    pub fn floor_count(&self) -> u32 {
        self.floors.len() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        std::iter::once(&self.garden)
            .chain(std::iter::once(&self.home))
            .chain(self.floors.iter())
    }
}

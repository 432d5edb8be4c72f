//! # Configuration
//!
//! Crate-wide constants and the tunable [`GameConfig`] / [`GenerationConfig`]
//! structs. Both are plain serde types so a JSON override file can replace any
//! subset of the defaults.

use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel edge length of one tile.
pub const TILE_SIZE: i32 = 32;

/// Number of inventory slots, one per letter a-z.
pub const INVENTORY_CAPACITY: usize = 26;

/// Visual key written into a tile after it has been dug out.
pub const CARVED_FLOOR_KEY: &str = "floor_carved";

/// Configuration for procedural generation.
///
/// Controls room sizing, how many rooms a floor attempts, and how large each
/// kind of environment is relative to the base tile map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base map width in tiles before the size multiplier
    pub tile_map_width: u32,
    /// Base map height in tiles before the size multiplier
    pub tile_map_height: u32,
    /// Minimum room edge length
    pub room_min_size: u32,
    /// Maximum room edge length
    pub room_max_size: u32,
    /// Room attempts per floor are this times the floor index
    pub base_rooms_per_floor: u32,
    /// Extra tiles of clearance two rooms must keep
    pub intersection_tolerance: i32,
    /// Size multiplier per dungeon floor (floor N uses N times this)
    pub floor_size_factor: u32,
    /// Size multiplier of the home map
    pub home_size_factor: u32,
    /// Size multiplier of the garden map
    pub garden_size_factor: u32,
    /// Chance that an inner wall tile resists ordinary digging
    pub unbreakable_chance: f64,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert!(config.room_min_size >= 3);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// ```
    pub fn new() -> Self {
        Self {
            tile_map_width: 20,
            tile_map_height: 15,
            room_min_size: 4,
            room_max_size: 10,
            base_rooms_per_floor: 6,
            intersection_tolerance: 0,
            floor_size_factor: 5,
            home_size_factor: 5,
            garden_size_factor: 1,
            unbreakable_chance: 0.05,
        }
    }

    /// Creates a configuration with smaller maps for tests.
    pub fn for_testing() -> Self {
        Self {
            tile_map_width: 12,
            tile_map_height: 10,
            room_min_size: 3,
            room_max_size: 6,
            base_rooms_per_floor: 4,
            intersection_tolerance: 0,
            floor_size_factor: 5,
            home_size_factor: 5,
            garden_size_factor: 1,
            unbreakable_chance: 0.0,
        }
    }

    /// Map dimensions for a given size multiplier.
    pub fn map_size(&self, multiplier: u32) -> (u32, u32) {
        (
            self.tile_map_width * multiplier,
            self.tile_map_height * multiplier,
        )
    }

    /// Size multiplier for dungeon floor `floor` (1-based).
    pub fn floor_multiplier(&self, floor: u32) -> u32 {
        self.floor_size_factor * floor.max(1)
    }

    /// Number of rooms a floor attempts to place.
    pub fn rooms_requested(&self, floor: u32) -> u32 {
        self.base_rooms_per_floor * floor
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gameplay tuning shared by the resolver, AI and item effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tile_size: i32,
    pub inventory_capacity: usize,
    pub level_up_base: u32,
    pub level_up_factor: u32,
    /// Enemies within this euclidean distance attack instead of moving
    pub ai_attack_range: f64,
    /// Half-width of the box A* may search around an enemy and its target
    pub ai_path_margin: i32,
    pub camera_width: u32,
    pub camera_height: u32,
    pub heal_amount: i32,
    pub lightning_damage: i32,
    pub lightning_range: f64,
    pub fireball_damage: i32,
    pub fireball_radius: f64,
    pub confuse_range: f64,
    pub confuse_turns: u32,
    pub generation: GenerationConfig,
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            tile_size: TILE_SIZE,
            inventory_capacity: INVENTORY_CAPACITY,
            level_up_base: 200,
            level_up_factor: 150,
            ai_attack_range: 1.5,
            ai_path_margin: 8,
            camera_width: 20,
            camera_height: 15,
            heal_amount: 40,
            lightning_damage: 40,
            lightning_range: 5.0,
            fireball_damage: 25,
            fireball_radius: 3.0,
            confuse_range: 8.0,
            confuse_turns: 10,
            generation: GenerationConfig::new(),
        }
    }

    /// Creates a configuration with small maps for tests.
    pub fn for_testing() -> Self {
        Self {
            generation: GenerationConfig::for_testing(),
            ..Self::new()
        }
    }

    /// Loads a JSON override file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> BurrowResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the generator or resolver cannot work with.
    pub fn validate(&self) -> BurrowResult<()> {
        let generation = &self.generation;
        if self.tile_size <= 0 {
            return Err(BurrowError::InvalidState(
                "tile_size must be positive".to_string(),
            ));
        }
        if generation.room_min_size < 3 || generation.room_min_size > generation.room_max_size {
            return Err(BurrowError::InvalidState(format!(
                "room size range {}..={} is invalid",
                generation.room_min_size, generation.room_max_size
            )));
        }
        let (width, height) = generation.map_size(generation.floor_multiplier(1));
        if generation.room_max_size + 2 >= width.min(height) {
            return Err(BurrowError::InvalidState(
                "rooms do not fit on the first dungeon floor".to_string(),
            ));
        }
        if self.inventory_capacity == 0 {
            return Err(BurrowError::InvalidState(
                "inventory_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Experience needed to leave `rank`.
    pub fn level_up_threshold(&self, rank: u32) -> u32 {
        self.level_up_base + rank * self.level_up_factor
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

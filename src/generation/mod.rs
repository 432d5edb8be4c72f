//! # Generation Module
//!
//! Procedural content generation for dungeon floors plus the fixed layouts of
//! the home and the garden.
//!
//! Generators return a [`GeneratedEnvironment`]: the environment with its map
//! already linked to the entities and items that were placed on it. The game
//! state then moves those entities and items into its arenas.

pub mod dungeon;
pub mod encounters;
pub mod hub;
pub mod items;
pub mod tables;

pub use dungeon::*;
pub use encounters::*;
pub use hub::*;
pub use items::*;
pub use tables::*;

use crate::game::{Entity, Environment, IdAllocator, Item, Position, Rect};
use crate::{BurrowResult, GameConfig};
use rand::rngs::StdRng;
use rand::Rng;

/// An environment fresh from a generator, together with the entities and
/// items it references.
#[derive(Debug, Clone)]
pub struct GeneratedEnvironment {
    pub environment: Environment,
    pub entities: Vec<Entity>,
    pub items: Vec<Item>,
}

/// Trait for procedural generators.
///
/// Ids come from the caller's allocator so generated content never collides
/// with what already exists in the game.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GameConfig, rng: &mut StdRng, ids: &mut IdAllocator) -> BurrowResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GameConfig) -> BurrowResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// A random tile strictly inside the walls of `room`, or `None` if the room
/// has no interior.
pub fn random_interior_position<R: Rng + ?Sized>(room: &Rect, rng: &mut R) -> Option<Position> {
    if room.width() < 2 || room.height() < 2 {
        return None;
    }
    let x = rng.gen_range((room.x1 + 1)..room.x2);
    let y = rng.gen_range((room.y1 + 1)..room.y2);
    Some(Position::new(x, y))
}

/// Utility functions for generation algorithms.
pub mod utils {
    use crate::game::Map;
    use crate::{BurrowError, BurrowResult};

    /// Validates that a floor has somewhere to stand.
    pub fn validate_floor(map: &Map) -> BurrowResult<()> {
        if map.floor_count() == 0 {
            return Err(BurrowError::GenerationFailed(
                "Floor has no walkable tiles".to_string(),
            ));
        }
        Ok(())
    }
}

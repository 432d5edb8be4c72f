//! # Burrow
//!
//! Simulation core for a tile-based action RPG: a player digs and fights through
//! procedurally generated dungeon floors below a persistent home and garden.
//!
//! ## Architecture Overview
//!
//! - **Game State**: one explicit [`GameState`] owns every environment, entity,
//!   item and quest; nothing lives in globals
//! - **Spatial Model**: tiles, rooms, maps and environments with id-based
//!   cross references instead of back pointers
//! - **Resolver**: directional intents become moves, turns, attacks, digs or
//!   dialogue
//! - **Generation System**: room-and-tunnel dungeon floors plus the fixed home
//!   and garden layouts
//! - **Shell**: collaborator traits for rendering, input and audio, and a
//!   small ASCII front end used by the binary
//!
//! The simulation is single threaded and tick driven. Every gameplay failure
//! degrades to a narrated no-op; only loading a corrupt snapshot is fatal.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod shell;
pub mod utils;

pub use config::{GameConfig, GenerationConfig};
pub use game::*;
pub use generation::{
    from_dungeon_level, generate_dungeon_floor, generate_garden, generate_home,
    weighted_choice, GeneratedEnvironment, Generator, RoomTunnelGenerator, Transition,
};
pub use input::*;
pub use rendering::{frame_lines, glyph_for, map_lines, AsciiRenderer};
pub use shell::*;

/// Core error type for the Burrow engine.
#[derive(thiserror::Error, Debug)]
pub enum BurrowError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A generated room overlapped an existing one
    #[error("Room placement rejected: {0}")]
    InvalidPlacement(String),

    /// Inventory has no free slot
    #[error("Your inventory is full ({capacity} items)")]
    InventoryFull { capacity: usize },

    /// Dropping onto a tile that already holds an item
    #[error("There is already something here")]
    OccupiedGroundTile,

    /// Casting without anything in the spell slot
    #[error("Nothing is equipped in the {0} slot")]
    EmptyEquipSlot(String),

    /// Targeted effect found nothing to hit
    #[error("No target in range")]
    NoTargetInRange,

    /// A position outside the map was requested
    #[error("Position ({x}, {y}) is outside the map")]
    MapBoundsViolation { x: i32, y: i32 },

    /// Persisted state could not be restored
    #[error("Failed to load game: {0}")]
    LoadFailure(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

impl BurrowError {
    /// Whether the simulation can continue after this error by reporting it
    /// to the player and treating the action as a no-op.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BurrowError::InvalidPlacement(_)
                | BurrowError::InventoryFull { .. }
                | BurrowError::OccupiedGroundTile
                | BurrowError::EmptyEquipSlot(_)
                | BurrowError::NoTargetInRange
                | BurrowError::MapBoundsViolation { .. }
                | BurrowError::InvalidAction(_)
        )
    }
}

/// Result type used throughout the Burrow codebase.
pub type BurrowResult<T> = Result<T, BurrowError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Utilities Module
//!
//! Helpers shared by the game systems that do not belong to any one of them.

pub mod pathfinding;

pub use self::pathfinding::*;

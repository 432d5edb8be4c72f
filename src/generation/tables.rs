//! # Spawn Tables
//!
//! Floor-dependent values and cumulative-weight random draws used to populate
//! dungeon floors.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A value that takes effect from `level` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub level: u32,
    pub value: u32,
}

impl Transition {
    pub const fn new(level: u32, value: u32) -> Self {
        Self { level, value }
    }
}

/// Value of the highest transition whose level does not exceed `level`, or
/// 0 when `level` is below every transition. `table` must be sorted by level.
///
/// # Examples
///
/// ```
/// use burrow::{from_dungeon_level, Transition};
///
/// let table = [Transition::new(1, 2), Transition::new(4, 3), Transition::new(6, 5)];
/// assert_eq!(from_dungeon_level(&table, 0), 0);
/// assert_eq!(from_dungeon_level(&table, 3), 2);
/// assert_eq!(from_dungeon_level(&table, 4), 3);
/// assert_eq!(from_dungeon_level(&table, 10), 5);
/// ```
pub fn from_dungeon_level(table: &[Transition], level: u32) -> u32 {
    table
        .iter()
        .rev()
        .find(|transition| level >= transition.level)
        .map_or(0, |transition| transition.value)
}

/// Draws one choice with probability proportional to its weight.
///
/// A uniform integer in `[1, total]` is drawn and the first choice whose
/// cumulative weight reaches it wins. Returns `None` for an empty table or
/// one whose weights are all zero.
pub fn weighted_choice<T: Copy, R: Rng + ?Sized>(choices: &[(T, u32)], rng: &mut R) -> Option<T> {
    let total: u32 = choices.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return None;
    }
    let draw = rng.gen_range(1..=total);
    let mut running = 0;
    for (choice, weight) in choices {
        running += weight;
        if running >= draw {
            return Some(*choice);
        }
    }
    None
}

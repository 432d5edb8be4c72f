//! # Encounter Generation
//!
//! Monster placement for dungeon rooms. Stronger monsters become common the
//! deeper the floor.

use super::{random_interior_position, weighted_choice, from_dungeon_level, Transition};
use crate::game::{Entity, EntityArchetype, EnvironmentId, IdAllocator, Map, Rect};
use crate::GameConfig;
use log::trace;
use rand::rngs::StdRng;
use rand::Rng;

/// Upper bound of monsters per room, by floor.
pub const MAX_MONSTERS_PER_ROOM: [Transition; 3] = [
    Transition::new(1, 2),
    Transition::new(4, 3),
    Transition::new(6, 5),
];

/// Weighted monster kinds available on `floor`.
pub fn monster_table(floor: u32) -> Vec<(EntityArchetype, u32)> {
    vec![
        (EntityArchetype::Rat, 80),
        (EntityArchetype::Slime, from_dungeon_level(&[Transition::new(2, 30)], floor)),
        (
            EntityArchetype::Orc,
            from_dungeon_level(&[Transition::new(2, 15), Transition::new(4, 30), Transition::new(6, 60)], floor),
        ),
        (
            EntityArchetype::Troll,
            from_dungeon_level(&[Transition::new(3, 15), Transition::new(5, 30), Transition::new(7, 60)], floor),
        ),
    ]
}

/// Places monsters on free interior tiles of `room`, linking each to its
/// tile. Tiles that are blocked or already occupied are skipped.
pub fn place_monsters(
    map: &mut Map,
    room: &Rect,
    floor: u32,
    config: &GameConfig,
    rng: &mut StdRng,
    ids: &mut IdAllocator,
) -> Vec<Entity> {
    let max = from_dungeon_level(&MAX_MONSTERS_PER_ROOM, floor);
    let count = rng.gen_range(0..=max);
    let table = monster_table(floor);
    let mut monsters = Vec::new();

    for _ in 0..count {
        let Some(pos) = random_interior_position(room, rng) else {
            break;
        };
        if !map.is_free(pos) {
            trace!("Skipping monster spawn on busy tile {pos} of {}", EnvironmentId::Dungeon(floor));
            continue;
        }
        let Some(archetype) = weighted_choice(&table, rng) else {
            break;
        };
        let entity = Entity::new(ids.next_entity(), archetype, pos, config.inventory_capacity);
        if let Some(tile) = map.get_tile_mut(pos) {
            tile.entity = Some(entity.id);
        }
        monsters.push(entity);
    }
    monsters
}

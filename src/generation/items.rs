//! # Item Generation
//!
//! Loot placement for dungeon rooms.

use super::{from_dungeon_level, random_interior_position, weighted_choice, Transition};
use crate::game::{EnvironmentId, IdAllocator, Item, ItemArchetype, ItemLocation, Map, Rect};
use rand::rngs::StdRng;
use rand::Rng;

/// Upper bound of items per room, by floor.
pub const MAX_ITEMS_PER_ROOM: [Transition; 2] = [Transition::new(1, 1), Transition::new(4, 2)];

/// Weighted item kinds available on `floor`.
pub fn item_table(floor: u32) -> Vec<(ItemArchetype, u32)> {
    vec![
        (ItemArchetype::HealingPotion, 35),
        (ItemArchetype::LightningScroll, from_dungeon_level(&[Transition::new(2, 25)], floor)),
        (ItemArchetype::FireballScroll, from_dungeon_level(&[Transition::new(3, 25)], floor)),
        (ItemArchetype::ConfuseScroll, from_dungeon_level(&[Transition::new(2, 10)], floor)),
        (ItemArchetype::Dagger, from_dungeon_level(&[Transition::new(1, 10), Transition::new(3, 0)], floor)),
        (ItemArchetype::Sword, from_dungeon_level(&[Transition::new(4, 5)], floor)),
        (ItemArchetype::Helmet, from_dungeon_level(&[Transition::new(2, 10)], floor)),
        (ItemArchetype::LeatherArmor, from_dungeon_level(&[Transition::new(3, 10)], floor)),
        (ItemArchetype::Boots, from_dungeon_level(&[Transition::new(2, 10)], floor)),
        (ItemArchetype::GoldenShovel, from_dungeon_level(&[Transition::new(5, 3)], floor)),
    ]
}

/// Lays items on free interior tiles of `room` that hold no item yet.
pub fn place_items(
    map: &mut Map,
    room: &Rect,
    floor: u32,
    rng: &mut StdRng,
    ids: &mut IdAllocator,
) -> Vec<Item> {
    let max = from_dungeon_level(&MAX_ITEMS_PER_ROOM, floor);
    let count = rng.gen_range(0..=max);
    let table = item_table(floor);
    let mut items = Vec::new();

    for _ in 0..count {
        let Some(pos) = random_interior_position(room, rng) else {
            break;
        };
        if map.is_blocked(pos) || map.item_at(pos).is_some() {
            continue;
        }
        let Some(archetype) = weighted_choice(&table, rng) else {
            break;
        };
        let location = ItemLocation::Ground(EnvironmentId::Dungeon(floor), pos);
        let item = Item::new(ids.next_item(), archetype, location);
        if let Some(tile) = map.get_tile_mut(pos) {
            tile.item = Some(item.id);
        }
        items.push(item);
    }
    items
}

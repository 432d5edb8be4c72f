//! # Entities
//!
//! Players, monsters and NPCs: fighter stats, inventory and equipment.
//!
//! Entities are built from a closed set of archetypes. Each archetype is a
//! named constructor returning a fully populated [`Entity`], so no entity is
//! ever assembled from a loose attribute map.

use super::{Direction, Item, ItemCategory, ItemId, Position, Slot};
use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What part an entity plays in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Enemy,
    Npc,
}

/// Behavior evaluated by the AI each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Idle,
    /// Walks after the player but never attacks
    Follow,
    /// Chases and attacks the player
    Aggressive,
}

/// What happens when an entity's HP reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathKind {
    None,
    Player,
    Monster,
}

/// Every kind of entity the game knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityArchetype {
    Player,
    Rat,
    Slime,
    Orc,
    Troll,
    Gardener,
    Cat,
}

/// Items carried by an entity, grouped by category.
///
/// Each item appears at most once across all categories. The listing order
/// (category order, then pick-up order) maps onto the letters a-z.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    items: BTreeMap<ItemCategory, Vec<ItemId>>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.values().any(|ids| ids.contains(&id))
    }

    /// Adds an item under `category`. Fails when full or already present.
    pub fn insert(&mut self, category: ItemCategory, id: ItemId) -> BurrowResult<()> {
        if self.contains(id) {
            return Err(BurrowError::InvalidAction(format!(
                "{id} is already carried"
            )));
        }
        if self.is_full() {
            return Err(BurrowError::InventoryFull {
                capacity: self.capacity,
            });
        }
        self.items.entry(category).or_default().push(id);
        Ok(())
    }

    /// Removes an item. Returns whether it was present.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let mut removed = false;
        for ids in self.items.values_mut() {
            let before = ids.len();
            ids.retain(|&other| other != id);
            removed |= ids.len() != before;
        }
        self.items.retain(|_, ids| !ids.is_empty());
        removed
    }

    pub fn category(&self, category: ItemCategory) -> &[ItemId] {
        self.items
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All items in listing order.
    pub fn listing(&self) -> Vec<ItemId> {
        self.items.values().flatten().copied().collect()
    }

    /// Item shown under `letter` in the listing.
    pub fn by_letter(&self, letter: char) -> Option<ItemId> {
        let letter = letter.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return None;
        }
        self.listing().get((letter as u8 - b'a') as usize).copied()
    }

    /// Letter under which `id` is listed.
    pub fn letter_of(&self, id: ItemId) -> Option<char> {
        self.listing()
            .iter()
            .position(|&other| other == id)
            .and_then(|index| u8::try_from(index).ok())
            .filter(|&index| index < 26)
            .map(|index| (b'a' + index) as char)
    }
}

/// A player, monster or NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: super::EntityId,
    pub name: String,
    pub role: Role,
    pub archetype: EntityArchetype,
    pub position: Position,
    pub facing: Direction,
    pub hp: i32,
    pub base_max_hp: i32,
    pub base_attack: i32,
    pub base_defense: i32,
    /// Base plus equipment bonuses
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp: u32,
    pub rank: u32,
    /// Experience granted to whoever kills this entity
    pub exp_reward: u32,
    pub inventory: Inventory,
    pub equipment: BTreeMap<Slot, ItemId>,
    pub behavior: Behavior,
    pub death: DeathKind,
    pub alive: bool,
    pub confused_turns: u32,
    pub dialogue: Vec<String>,
    pub dialogue_index: usize,
    pub sprite: String,
}

impl Entity {
    /// Builds an entity of the given archetype at `position`.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Entity, EntityArchetype, EntityId, Position, Role};
    ///
    /// let orc = Entity::new(EntityId(3), EntityArchetype::Orc, Position::new(4, 4), 26);
    /// assert_eq!(orc.role, Role::Enemy);
    /// assert_eq!(orc.hp, orc.max_hp);
    /// ```
    pub fn new(
        id: super::EntityId,
        archetype: EntityArchetype,
        position: Position,
        inventory_capacity: usize,
    ) -> Self {
        let base = Self {
            id,
            name: String::new(),
            role: Role::Enemy,
            archetype,
            position,
            facing: Direction::South,
            hp: 1,
            base_max_hp: 1,
            base_attack: 0,
            base_defense: 0,
            max_hp: 1,
            attack: 0,
            defense: 0,
            exp: 0,
            rank: 1,
            exp_reward: 0,
            inventory: Inventory::new(inventory_capacity),
            equipment: BTreeMap::new(),
            behavior: Behavior::Aggressive,
            death: DeathKind::Monster,
            alive: true,
            confused_turns: 0,
            dialogue: Vec::new(),
            dialogue_index: 0,
            sprite: String::new(),
        };

        match archetype {
            EntityArchetype::Player => Self {
                name: "player".to_string(),
                role: Role::Player,
                behavior: Behavior::Idle,
                death: DeathKind::Player,
                sprite: "player".to_string(),
                ..base.with_stats(100, 2, 1, 0)
            },
            EntityArchetype::Rat => Self {
                name: "rat".to_string(),
                sprite: "monster_rat".to_string(),
                ..base.with_stats(6, 3, 0, 15)
            },
            EntityArchetype::Slime => Self {
                name: "slime".to_string(),
                sprite: "monster_slime".to_string(),
                ..base.with_stats(12, 4, 1, 30)
            },
            EntityArchetype::Orc => Self {
                name: "orc".to_string(),
                sprite: "monster_orc".to_string(),
                ..base.with_stats(20, 5, 1, 50)
            },
            EntityArchetype::Troll => Self {
                name: "troll".to_string(),
                sprite: "monster_troll".to_string(),
                ..base.with_stats(30, 8, 2, 120)
            },
            EntityArchetype::Gardener => Self {
                name: "gardener".to_string(),
                role: Role::Npc,
                behavior: Behavior::Idle,
                death: DeathKind::None,
                dialogue: vec![
                    "Morning! The turnips are coming along nicely.".to_string(),
                    "They say the rock under the house goes down forever.".to_string(),
                    "Take the shovel from the hall if you go below.".to_string(),
                ],
                sprite: "npc_gardener".to_string(),
                ..base.with_stats(10, 0, 0, 0)
            },
            EntityArchetype::Cat => Self {
                name: "cat".to_string(),
                role: Role::Npc,
                behavior: Behavior::Follow,
                death: DeathKind::None,
                dialogue: vec!["Mrrp.".to_string()],
                sprite: "npc_cat".to_string(),
                ..base.with_stats(5, 0, 0, 0)
            },
        }
    }

    fn with_stats(self, hp: i32, attack: i32, defense: i32, exp_reward: u32) -> Self {
        Self {
            hp,
            base_max_hp: hp,
            base_attack: attack,
            base_defense: defense,
            max_hp: hp,
            attack,
            defense,
            exp_reward,
            ..self
        }
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    /// Whether this entity takes part in combat at all.
    pub fn is_fighter(&self) -> bool {
        self.role != Role::Npc
    }

    /// Rebuilds `max_hp`, `attack` and `defense` from base values plus every
    /// equipped item, then clamps current HP to the new maximum.
    pub fn recompute_stats(&mut self, items: &BTreeMap<ItemId, Item>) {
        let equipped = self.equipment.values().filter_map(|id| items.get(id));
        let (mut hp_bonus, mut attack_bonus, mut defense_bonus) = (0, 0, 0);
        for item in equipped {
            hp_bonus += item.hp_bonus;
            attack_bonus += item.attack_bonus;
            defense_bonus += item.defense_bonus;
        }
        self.max_hp = self.base_max_hp + hp_bonus;
        self.attack = self.base_attack + attack_bonus;
        self.defense = self.base_defense + defense_bonus;
        self.hp = self.hp.min(self.max_hp);
    }

    /// Item equipped in `slot`.
    pub fn equipped_in(&self, slot: Slot) -> Option<ItemId> {
        self.equipment.get(&slot).copied()
    }

    /// Restores up to `amount` HP without passing the maximum. Returns the
    /// amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Subtracts `damage` HP, floored at zero. Returns true if this blow
    /// brought the entity to zero.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if damage <= 0 || self.hp <= 0 {
            return false;
        }
        self.hp = (self.hp - damage).max(0);
        self.hp == 0
    }

    /// Next dialogue line, cycling through the NPC's lines.
    pub fn next_line(&mut self) -> Option<String> {
        if self.dialogue.is_empty() {
            return None;
        }
        let line = self.dialogue[self.dialogue_index % self.dialogue.len()].clone();
        self.dialogue_index = (self.dialogue_index + 1) % self.dialogue.len();
        Some(line)
    }
}

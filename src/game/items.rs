//! # Items
//!
//! Item data, equipment slots and the archetype table every item is built
//! from.

use super::{EntityId, EnvironmentId, ItemId, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad item grouping, also the key of an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Weapon,
    Armor,
    Potion,
    Scroll,
    Other,
}

/// Equipment slot an item occupies while equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    Hand,
    Head,
    Body,
    Feet,
    /// Holds the scroll cast by the quick-cast action
    Spell,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Hand => "hand",
            Slot::Head => "head",
            Slot::Body => "body",
            Slot::Feet => "feet",
            Slot::Spell => "spell",
        };
        f.write_str(name)
    }
}

/// How well an item digs through rock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigPower {
    None,
    /// Digs ordinary rock
    Normal,
    /// Also digs unbreakable rock
    Super,
}

/// Consumable behavior of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    None,
    Heal,
    Lightning,
    Fireball,
    Confuse,
}

/// Where standing on a fixture item can take the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Portal {
    /// One floor deeper (from the home: the first floor)
    Descend,
    Home,
    Garden,
}

/// The single place an item currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemLocation {
    Ground(EnvironmentId, Position),
    Inventory(EntityId),
    /// Consumed or broken; kept only until removed from the item arena
    Destroyed,
}

/// Every kind of item the game knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemArchetype {
    Shovel,
    GoldenShovel,
    Dagger,
    Sword,
    Helmet,
    LeatherArmor,
    Boots,
    HealingPotion,
    LightningScroll,
    FireballScroll,
    ConfuseScroll,
    Turnip,
    Stairs,
    HomeDoor,
    GardenDoor,
}

/// A single item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub archetype: ItemArchetype,
    pub category: ItemCategory,
    pub slot: Option<Slot>,
    pub equippable: bool,
    pub equipped: bool,
    pub hidden: bool,
    /// Fixtures such as stairs cannot be picked up
    pub portable: bool,
    pub hp_bonus: i32,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    /// Remaining uses of a digging tool
    pub durability: Option<u32>,
    pub dig: DigPower,
    pub effect: EffectKind,
    pub portal: Option<Portal>,
    pub sprite: String,
    pub location: ItemLocation,
}

impl Item {
    /// Builds an item of the given archetype lying at `location`.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Item, ItemArchetype, ItemId, ItemLocation, Slot};
    ///
    /// let shovel = Item::new(ItemId(0), ItemArchetype::Shovel, ItemLocation::Destroyed);
    /// assert_eq!(shovel.slot, Some(Slot::Hand));
    /// assert!(shovel.can_dig());
    /// ```
    pub fn new(id: ItemId, archetype: ItemArchetype, location: ItemLocation) -> Self {
        let base = Self {
            id,
            name: String::new(),
            archetype,
            category: ItemCategory::Other,
            slot: None,
            equippable: false,
            equipped: false,
            hidden: false,
            portable: true,
            hp_bonus: 0,
            attack_bonus: 0,
            defense_bonus: 0,
            durability: None,
            dig: DigPower::None,
            effect: EffectKind::None,
            portal: None,
            sprite: String::new(),
            location,
        };

        match archetype {
            ItemArchetype::Shovel => Self {
                name: "shovel".to_string(),
                category: ItemCategory::Weapon,
                slot: Some(Slot::Hand),
                equippable: true,
                attack_bonus: 1,
                durability: Some(25),
                dig: DigPower::Normal,
                sprite: "item_shovel".to_string(),
                ..base
            },
            ItemArchetype::GoldenShovel => Self {
                name: "golden shovel".to_string(),
                category: ItemCategory::Weapon,
                slot: Some(Slot::Hand),
                equippable: true,
                attack_bonus: 2,
                durability: Some(60),
                dig: DigPower::Super,
                sprite: "item_golden_shovel".to_string(),
                ..base
            },
            ItemArchetype::Dagger => Self {
                name: "dagger".to_string(),
                category: ItemCategory::Weapon,
                slot: Some(Slot::Hand),
                equippable: true,
                attack_bonus: 2,
                sprite: "item_dagger".to_string(),
                ..base
            },
            ItemArchetype::Sword => Self {
                name: "sword".to_string(),
                category: ItemCategory::Weapon,
                slot: Some(Slot::Hand),
                equippable: true,
                attack_bonus: 4,
                sprite: "item_sword".to_string(),
                ..base
            },
            ItemArchetype::Helmet => Self {
                name: "helmet".to_string(),
                category: ItemCategory::Armor,
                slot: Some(Slot::Head),
                equippable: true,
                defense_bonus: 1,
                sprite: "item_helmet".to_string(),
                ..base
            },
            ItemArchetype::LeatherArmor => Self {
                name: "leather armor".to_string(),
                category: ItemCategory::Armor,
                slot: Some(Slot::Body),
                equippable: true,
                hp_bonus: 10,
                defense_bonus: 2,
                sprite: "item_leather_armor".to_string(),
                ..base
            },
            ItemArchetype::Boots => Self {
                name: "boots".to_string(),
                category: ItemCategory::Armor,
                slot: Some(Slot::Feet),
                equippable: true,
                defense_bonus: 1,
                sprite: "item_boots".to_string(),
                ..base
            },
            ItemArchetype::HealingPotion => Self {
                name: "healing potion".to_string(),
                category: ItemCategory::Potion,
                effect: EffectKind::Heal,
                sprite: "item_potion_red".to_string(),
                ..base
            },
            ItemArchetype::LightningScroll => Self {
                name: "scroll of lightning bolt".to_string(),
                category: ItemCategory::Scroll,
                slot: Some(Slot::Spell),
                equippable: true,
                effect: EffectKind::Lightning,
                sprite: "item_scroll".to_string(),
                ..base
            },
            ItemArchetype::FireballScroll => Self {
                name: "scroll of fireball".to_string(),
                category: ItemCategory::Scroll,
                slot: Some(Slot::Spell),
                equippable: true,
                effect: EffectKind::Fireball,
                sprite: "item_scroll".to_string(),
                ..base
            },
            ItemArchetype::ConfuseScroll => Self {
                name: "scroll of confusion".to_string(),
                category: ItemCategory::Scroll,
                slot: Some(Slot::Spell),
                equippable: true,
                effect: EffectKind::Confuse,
                sprite: "item_scroll".to_string(),
                ..base
            },
            ItemArchetype::Turnip => Self {
                name: "turnip".to_string(),
                sprite: "item_turnip".to_string(),
                ..base
            },
            ItemArchetype::Stairs => Self {
                name: "stairs".to_string(),
                portable: false,
                portal: Some(Portal::Descend),
                sprite: "fixture_stairs".to_string(),
                ..base
            },
            ItemArchetype::HomeDoor => Self {
                name: "door to the house".to_string(),
                portable: false,
                portal: Some(Portal::Home),
                sprite: "fixture_door".to_string(),
                ..base
            },
            ItemArchetype::GardenDoor => Self {
                name: "door to the garden".to_string(),
                portable: false,
                portal: Some(Portal::Garden),
                sprite: "fixture_door".to_string(),
                ..base
            },
        }
    }

    pub fn can_dig(&self) -> bool {
        self.dig != DigPower::None
    }

    pub fn is_consumable(&self) -> bool {
        self.effect != EffectKind::None
    }

    /// Lowers durability by one use. Returns true when the tool just broke.
    pub fn wear(&mut self) -> bool {
        match self.durability.as_mut() {
            Some(durability) => {
                *durability = durability.saturating_sub(1);
                *durability == 0
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(archetype: ItemArchetype) -> Item {
        Item::new(ItemId(1), archetype, ItemLocation::Destroyed)
    }

    #[test]
    fn test_equippable_items_have_slots() {
        let archetypes = [
            ItemArchetype::Shovel,
            ItemArchetype::GoldenShovel,
            ItemArchetype::Dagger,
            ItemArchetype::Sword,
            ItemArchetype::Helmet,
            ItemArchetype::LeatherArmor,
            ItemArchetype::Boots,
            ItemArchetype::LightningScroll,
            ItemArchetype::FireballScroll,
            ItemArchetype::ConfuseScroll,
        ];
        for archetype in archetypes {
            let item = make(archetype);
            assert!(item.equippable, "{archetype:?}");
            assert!(item.slot.is_some(), "{archetype:?}");
        }
    }

    #[test]
    fn test_fixtures_are_not_portable() {
        for archetype in [
            ItemArchetype::Stairs,
            ItemArchetype::HomeDoor,
            ItemArchetype::GardenDoor,
        ] {
            let item = make(archetype);
            assert!(!item.portable);
            assert!(item.portal.is_some());
        }
        assert!(make(ItemArchetype::Turnip).portable);
    }

    #[test]
    fn test_dig_power() {
        assert_eq!(make(ItemArchetype::Shovel).dig, DigPower::Normal);
        assert_eq!(make(ItemArchetype::GoldenShovel).dig, DigPower::Super);
        assert!(!make(ItemArchetype::Sword).can_dig());
    }

    #[test]
    fn test_wear_breaks_at_zero() {
        let mut shovel = make(ItemArchetype::Shovel);
        shovel.durability = Some(2);
        assert!(!shovel.wear());
        assert!(shovel.wear());
        assert_eq!(shovel.durability, Some(0));

        let mut sword = make(ItemArchetype::Sword);
        assert!(!sword.wear());
    }

    #[test]
    fn test_consumables() {
        assert!(make(ItemArchetype::HealingPotion).is_consumable());
        assert!(make(ItemArchetype::FireballScroll).is_consumable());
        assert!(!make(ItemArchetype::Helmet).is_consumable());
    }
}

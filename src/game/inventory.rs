//! # Inventory Actions
//!
//! Picking up, dropping, equipping and dequipping items. Every equipment
//! change recomputes the owner's derived stats.

use super::{EntityId, GameEvent, GameState, ItemId, ItemLocation, MessageImportance};
use crate::{BurrowError, BurrowResult};
use log::debug;

impl GameState {
    fn owned_item(&self, owner: EntityId, item: ItemId) -> BurrowResult<()> {
        if self.entity(owner)?.inventory.contains(item) {
            Ok(())
        } else {
            Err(BurrowError::InvalidAction(
                "You are not carrying that.".to_string(),
            ))
        }
    }

    /// Equips a carried item into its slot, first dequipping whatever the
    /// slot holds.
    pub fn equip(
        &mut self,
        owner: EntityId,
        item_id: ItemId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        self.owned_item(owner, item_id)?;
        let item = self.item(item_id)?;
        let slot = match (item.equippable, item.slot) {
            (true, Some(slot)) => slot,
            _ => {
                return Err(BurrowError::InvalidAction(format!(
                    "The {} cannot be equipped.",
                    item.name
                )))
            }
        };
        if item.equipped {
            return Ok(());
        }

        if let Some(previous) = self.entity(owner)?.equipped_in(slot) {
            self.dequip(owner, previous, events)?;
        }

        let item = self.item_mut(item_id)?;
        item.equipped = true;
        let name = item.name.clone();
        let entity = self
            .entities
            .get_mut(&owner)
            .ok_or_else(|| BurrowError::InvalidState(format!("{owner} not found")))?;
        entity.equipment.insert(slot, item_id);
        entity.recompute_stats(&self.items);
        let is_player = entity.is_player();

        events.push(GameEvent::ItemEquipped {
            entity: owner,
            item: item_id,
            slot,
        });
        if is_player {
            self.say(format!("Equipped {name} on {slot}."), MessageImportance::Info);
        }
        Ok(())
    }

    /// Takes an equipped item off. HP is clamped to the lowered maximum.
    pub fn dequip(
        &mut self,
        owner: EntityId,
        item_id: ItemId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        self.owned_item(owner, item_id)?;
        let item = self.item_mut(item_id)?;
        let slot = match (item.equipped, item.slot) {
            (true, Some(slot)) => slot,
            _ => {
                return Err(BurrowError::InvalidAction(format!(
                    "The {} is not equipped.",
                    item.name
                )))
            }
        };
        item.equipped = false;
        let name = item.name.clone();

        let entity = self
            .entities
            .get_mut(&owner)
            .ok_or_else(|| BurrowError::InvalidState(format!("{owner} not found")))?;
        entity.equipment.remove(&slot);
        entity.recompute_stats(&self.items);
        let is_player = entity.is_player();

        events.push(GameEvent::ItemDequipped {
            entity: owner,
            item: item_id,
            slot,
        });
        if is_player {
            self.say(format!("Dequipped {name} from {slot}."), MessageImportance::Info);
        }
        Ok(())
    }

    /// Equips the item if it is off, dequips it if it is on.
    pub fn toggle_equip(
        &mut self,
        owner: EntityId,
        item_id: ItemId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        if self.item(item_id)?.equipped {
            self.dequip(owner, item_id, events)
        } else {
            self.equip(owner, item_id, events)
        }
    }

    /// Picks up the item lying under `owner`. Equippable items go straight
    /// into an empty slot.
    pub fn pick_up(&mut self, owner: EntityId, events: &mut Vec<GameEvent>) -> BurrowResult<ItemId> {
        let pos = self.entity(owner)?.position;
        let current = self.current;
        let item_id = self
            .current_env()?
            .map
            .item_at(pos)
            .ok_or_else(|| BurrowError::InvalidAction("There is nothing here to pick up.".to_string()))?;

        let item = self.item(item_id)?;
        if !item.portable {
            return Err(BurrowError::InvalidAction(format!(
                "The {} cannot be picked up.",
                item.name
            )));
        }
        let (category, name, auto_equip) = (
            item.category,
            item.name.clone(),
            item.equippable && item.slot.is_some(),
        );
        let slot = item.slot;

        let entity = self.entity_mut(owner)?;
        entity.inventory.insert(category, item_id)?;
        let is_player = entity.is_player();

        self.current_env_mut()?.map.tile_mut(pos)?.item = None;
        self.item_mut(item_id)?.location = ItemLocation::Inventory(owner);
        events.push(GameEvent::ItemPickedUp {
            entity: owner,
            item: item_id,
        });
        if is_player {
            self.say(format!("You picked up a {name}!"), MessageImportance::Info);
        }
        debug!("{owner} picked up {item_id} in {current}");

        let slot_empty = slot
            .map(|slot| self.entities.get(&owner).and_then(|e| e.equipped_in(slot)).is_none())
            .unwrap_or(false);
        if auto_equip && slot_empty {
            self.equip(owner, item_id, events)?;
        }
        Ok(item_id)
    }

    /// Drops a carried item onto the owner's tile, dequipping it first.
    pub fn drop_item(
        &mut self,
        owner: EntityId,
        item_id: ItemId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        self.owned_item(owner, item_id)?;
        let pos = self.entity(owner)?.position;
        let current = self.current;
        if self.current_env()?.map.item_at(pos).is_some() {
            return Err(BurrowError::OccupiedGroundTile);
        }

        if self.item(item_id)?.equipped {
            self.dequip(owner, item_id, events)?;
        }

        let entity = self.entity_mut(owner)?;
        entity.inventory.remove(item_id);
        let is_player = entity.is_player();
        self.current_env_mut()?.map.tile_mut(pos)?.item = Some(item_id);
        let item = self.item_mut(item_id)?;
        item.location = ItemLocation::Ground(current, pos);
        let name = item.name.clone();

        events.push(GameEvent::ItemDropped {
            entity: owner,
            item: item_id,
        });
        if is_player {
            self.say(format!("You dropped a {name}."), MessageImportance::Info);
        }
        Ok(())
    }

    /// Removes a carried item from the game for good.
    pub(crate) fn destroy_item(
        &mut self,
        owner: EntityId,
        item_id: ItemId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        if self.item(item_id)?.equipped {
            self.dequip(owner, item_id, events)?;
        }
        self.entity_mut(owner)?.inventory.remove(item_id);
        if let Some(mut item) = self.items.remove(&item_id) {
            item.location = ItemLocation::Destroyed;
            debug!("{} ({}) destroyed", item_id, item.name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, Item, ItemArchetype, Slot};

    fn state() -> GameState {
        GameState::with_config(GameConfig::for_testing(), 99).unwrap()
    }

    /// Puts a fresh item straight into the player's pack.
    fn give(game_state: &mut GameState, archetype: ItemArchetype) -> ItemId {
        let player = game_state.player_id;
        let id = game_state.ids.next_item();
        let item = Item::new(id, archetype, ItemLocation::Inventory(player));
        let category = item.category;
        game_state.items.insert(id, item);
        game_state
            .player_mut()
            .unwrap()
            .inventory
            .insert(category, id)
            .unwrap();
        id
    }

    /// Lays a fresh item under the player.
    fn lay(game_state: &mut GameState, archetype: ItemArchetype) -> ItemId {
        let pos = game_state.player().unwrap().position;
        let current = game_state.current;
        let id = game_state.ids.next_item();
        game_state
            .items
            .insert(id, Item::new(id, archetype, ItemLocation::Ground(current, pos)));
        game_state.current_env_mut().unwrap().map.tile_mut(pos).unwrap().item = Some(id);
        id
    }

    #[test]
    fn test_equip_changes_stats() {
        let mut game_state = state();
        let player = game_state.player_id;
        let armor = give(&mut game_state, ItemArchetype::LeatherArmor);
        let mut events = Vec::new();

        game_state.equip(player, armor, &mut events).unwrap();
        let entity = game_state.player().unwrap();
        assert_eq!(entity.max_hp, 110);
        assert_eq!(entity.defense, 3);
        assert_eq!(entity.equipped_in(Slot::Body), Some(armor));

        game_state.dequip(player, armor, &mut events).unwrap();
        let entity = game_state.player().unwrap();
        assert_eq!(entity.max_hp, 100);
        assert_eq!(entity.defense, 1);
        assert!(entity.equipment.is_empty());
        game_state.check_invariants().unwrap();
    }

    #[test]
    fn test_dequip_clamps_hp() {
        let mut game_state = state();
        let player = game_state.player_id;
        let armor = give(&mut game_state, ItemArchetype::LeatherArmor);
        let mut events = Vec::new();

        game_state.equip(player, armor, &mut events).unwrap();
        game_state.player_mut().unwrap().hp = 110;
        game_state.dequip(player, armor, &mut events).unwrap();
        assert_eq!(game_state.player().unwrap().hp, 100);
    }

    #[test]
    fn test_equip_swaps_slot_occupant() {
        let mut game_state = state();
        let player = game_state.player_id;
        let dagger = give(&mut game_state, ItemArchetype::Dagger);
        let sword = give(&mut game_state, ItemArchetype::Sword);
        let mut events = Vec::new();

        game_state.equip(player, dagger, &mut events).unwrap();
        game_state.equip(player, sword, &mut events).unwrap();
        assert!(!game_state.item(dagger).unwrap().equipped);
        assert!(game_state.item(sword).unwrap().equipped);
        assert_eq!(game_state.player().unwrap().attack, 6);
        assert!(events.contains(&GameEvent::ItemDequipped {
            entity: player,
            item: dagger,
            slot: Slot::Hand,
        }));
    }

    #[test]
    fn test_equip_rejects_non_equippable() {
        let mut game_state = state();
        let player = game_state.player_id;
        let potion = give(&mut game_state, ItemArchetype::HealingPotion);
        let err = game_state.equip(player, potion, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BurrowError::InvalidAction(_)));
    }

    #[test]
    fn test_pick_up_auto_equips() {
        let mut game_state = state();
        let player = game_state.player_id;
        let helmet = lay(&mut game_state, ItemArchetype::Helmet);
        let mut events = Vec::new();

        game_state.pick_up(player, &mut events).unwrap();
        assert!(game_state.item(helmet).unwrap().equipped);
        assert_eq!(
            game_state.item(helmet).unwrap().location,
            ItemLocation::Inventory(player)
        );
        let pos = game_state.player().unwrap().position;
        assert_eq!(game_state.current_env().unwrap().map.item_at(pos), None);
        game_state.check_invariants().unwrap();
    }

    #[test]
    fn test_pick_up_full_inventory_changes_nothing() {
        let mut game_state = state();
        let player = game_state.player_id;
        let capacity = game_state.config.inventory_capacity;
        for _ in 0..capacity {
            give(&mut game_state, ItemArchetype::Turnip);
        }
        let turnip = lay(&mut game_state, ItemArchetype::Turnip);

        let err = game_state.pick_up(player, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BurrowError::InventoryFull { .. }));
        let pos = game_state.player().unwrap().position;
        assert_eq!(game_state.current_env().unwrap().map.item_at(pos), Some(turnip));
        assert_eq!(game_state.player().unwrap().inventory.len(), capacity);
    }

    #[test]
    fn test_pick_up_nothing() {
        let mut game_state = state();
        let player = game_state.player_id;
        let pos = game_state.player().unwrap().position;
        game_state.current_env_mut().unwrap().map.tile_mut(pos).unwrap().item = None;
        assert!(game_state.pick_up(player, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_drop_onto_occupied_tile() {
        let mut game_state = state();
        let player = game_state.player_id;
        let sword = give(&mut game_state, ItemArchetype::Sword);
        lay(&mut game_state, ItemArchetype::Turnip);

        let err = game_state.drop_item(player, sword, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, BurrowError::OccupiedGroundTile));
        assert!(game_state.player().unwrap().inventory.contains(sword));
    }

    #[test]
    fn test_drop_dequips_first() {
        let mut game_state = state();
        let player = game_state.player_id;
        let pos = game_state.player().unwrap().position;
        game_state.current_env_mut().unwrap().map.tile_mut(pos).unwrap().item = None;
        let sword = give(&mut game_state, ItemArchetype::Sword);
        let mut events = Vec::new();

        game_state.equip(player, sword, &mut events).unwrap();
        game_state.drop_item(player, sword, &mut events).unwrap();
        let item = game_state.item(sword).unwrap();
        assert!(!item.equipped);
        assert_eq!(item.location, ItemLocation::Ground(game_state.current, pos));
        assert_eq!(game_state.player().unwrap().attack, 2);
        game_state.check_invariants().unwrap();
    }
}

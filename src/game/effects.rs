//! # Item Effects
//!
//! Potions and scrolls. A consumable is destroyed only after its effect
//! actually happened; a cancelled or targetless use leaves it in the pack.

use super::{EffectKind, EntityId, GameEvent, GameState, ItemId, MessageImportance, Position, Role, Slot};
use crate::{BurrowError, BurrowResult};
use log::debug;

impl GameState {
    /// Uses a carried item. Items without an effect toggle their equipment
    /// state instead.
    pub fn use_item(
        &mut self,
        user: EntityId,
        item_id: ItemId,
        target: Option<Position>,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        if !self.entity(user)?.inventory.contains(item_id) {
            return Err(BurrowError::InvalidAction(
                "You are not carrying that.".to_string(),
            ));
        }
        let item = self.item(item_id)?;
        let (effect, name, equippable) = (item.effect, item.name.clone(), item.equippable);

        match effect {
            EffectKind::None if equippable => {
                return self.toggle_equip(user, item_id, events);
            }
            EffectKind::None => {
                return Err(BurrowError::InvalidAction(format!(
                    "The {name} cannot be used."
                )));
            }
            EffectKind::Heal => self.cast_heal(user)?,
            EffectKind::Lightning => self.cast_lightning(user, events)?,
            EffectKind::Fireball => self.cast_fireball(user, target, events)?,
            EffectKind::Confuse => self.cast_confuse(user, target)?,
        }

        events.push(GameEvent::ItemUsed {
            entity: user,
            item: item_id,
        });
        debug!("{user} used {item_id} ({name})");
        // The user may have died from its own fireball and taken the pack along
        if self.entities.contains_key(&user) {
            self.destroy_item(user, item_id, events)?;
        }
        Ok(())
    }

    /// Uses whatever scroll sits in the spell slot.
    pub fn cast_spell(
        &mut self,
        caster: EntityId,
        target: Option<Position>,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        let scroll = self
            .entity(caster)?
            .equipped_in(Slot::Spell)
            .ok_or_else(|| BurrowError::EmptyEquipSlot(Slot::Spell.to_string()))?;
        self.use_item(caster, scroll, target, events)
    }

    fn cast_heal(&mut self, user: EntityId) -> BurrowResult<()> {
        let amount = self.config.heal_amount;
        let entity = self.entity_mut(user)?;
        if entity.hp >= entity.max_hp {
            return Err(BurrowError::InvalidAction(
                "You are already at full health.".to_string(),
            ));
        }
        entity.heal(amount);
        self.say("Your wounds start to feel better!", MessageImportance::Info);
        Ok(())
    }

    fn cast_lightning(&mut self, caster: EntityId, events: &mut Vec<GameEvent>) -> BurrowResult<()> {
        let range = self.config.lightning_range;
        let damage = self.config.lightning_damage;
        let target = self
            .closest_visible_enemy(caster, range)?
            .ok_or(BurrowError::NoTargetInRange)?;
        let name = self.entity(target)?.name.clone();
        self.say(
            format!("A lightning bolt strikes the {name} with a loud thunder! The damage is {damage} hit points."),
            MessageImportance::Combat,
        );
        self.apply_damage(target, damage, Some(caster), events)?;
        Ok(())
    }

    /// Damages every fighter within the blast radius of `target`, the caster
    /// included. `None` means targeting was cancelled.
    fn cast_fireball(
        &mut self,
        caster: EntityId,
        target: Option<Position>,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        let center = target.ok_or(BurrowError::NoTargetInRange)?;
        let visible = self
            .current_env()?
            .map
            .get_tile(center)
            .map(|tile| tile.is_visible())
            .unwrap_or(false);
        if !visible {
            return Err(BurrowError::NoTargetInRange);
        }

        let radius = self.config.fireball_radius;
        let damage = self.config.fireball_damage;
        self.say(
            format!("The fireball explodes, burning everything within {radius} tiles!"),
            MessageImportance::Combat,
        );

        let victims: Vec<EntityId> = self
            .current_env()?
            .entities
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|entity| entity.alive && entity.is_fighter())
            .filter(|entity| entity.position.euclidean_distance(center) <= radius)
            .map(|entity| entity.id)
            .collect();
        for victim in victims {
            if let Some(entity) = self.entities.get(&victim) {
                let name = entity.name.clone();
                self.say(
                    format!("The {name} gets burned for {damage} hit points."),
                    MessageImportance::Combat,
                );
            }
            self.apply_damage(victim, damage, Some(caster), events)?;
        }
        Ok(())
    }

    fn cast_confuse(&mut self, caster: EntityId, target: Option<Position>) -> BurrowResult<()> {
        let range = self.config.confuse_range;
        let chosen = match target {
            Some(pos) => self
                .current_env()?
                .map
                .entity_at(pos)
                .filter(|id| self.is_visible_enemy(*id)),
            None => self.closest_visible_enemy(caster, range)?,
        };
        let target = chosen.ok_or(BurrowError::NoTargetInRange)?;

        let turns = self.config.confuse_turns;
        let entity = self.entity_mut(target)?;
        entity.confused_turns = turns;
        let name = entity.name.clone();
        self.say(
            format!("The eyes of the {name} look vacant, as it starts to stumble around!"),
            MessageImportance::Combat,
        );
        Ok(())
    }

    fn is_visible_enemy(&self, id: EntityId) -> bool {
        let entity = match self.entities.get(&id) {
            Some(entity) if entity.alive && entity.role == Role::Enemy => entity,
            _ => return false,
        };
        self.current_env()
            .ok()
            .and_then(|env| env.map.get_tile(entity.position))
            .map(|tile| tile.is_visible())
            .unwrap_or(false)
    }

    /// Nearest living enemy on a revealed tile within `range` of `origin`.
    /// Ties go to the lowest id.
    pub fn closest_visible_enemy(&self, origin: EntityId, range: f64) -> BurrowResult<Option<EntityId>> {
        let from = self.entity(origin)?.position;
        let mut best: Option<(f64, EntityId)> = None;
        for id in self.entities_with_role(Role::Enemy) {
            if !self.is_visible_enemy(id) {
                continue;
            }
            let distance = self.entity(id)?.position.euclidean_distance(from);
            if distance > range {
                continue;
            }
            if best.map(|(closest, _)| distance < closest).unwrap_or(true) {
                best = Some((distance, id));
            }
        }
        Ok(best.map(|(_, id)| id))
    }
}

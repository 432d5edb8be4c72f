//! # Combat
//!
//! Melee attacks, damage application, death handling and experience.

use super::{DeathKind, EntityId, GameEvent, GameState, MessageImportance};
use crate::{BurrowError, BurrowResult};
use log::{debug, info};

/// Max HP gained per rank.
pub const RANK_HP_GAIN: i32 = 10;
/// Attack gained per rank.
pub const RANK_ATTACK_GAIN: i32 = 1;
/// Defense gained per rank.
pub const RANK_DEFENSE_GAIN: i32 = 1;

/// Result of a single melee attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackReport {
    /// Damage dealt; 0 when the blow had no effect
    pub damage: i32,
    pub killed: bool,
}

/// Damage of a melee blow. Never negative.
///
/// # Examples
///
/// ```
/// use burrow::melee_damage;
///
/// assert_eq!(melee_damage(5, 2), 3);
/// assert_eq!(melee_damage(1, 4), 0);
/// ```
pub fn melee_damage(attack: i32, defense: i32) -> i32 {
    (attack - defense).max(0)
}

/// Applies accumulated experience, ranking up as often as the thresholds
/// allow. Each threshold is subtracted from `exp` as it is crossed.
///
/// Returns the new `(exp, rank)`.
pub fn apply_level_ups(mut exp: u32, mut rank: u32, base: u32, factor: u32) -> (u32, u32) {
    loop {
        let threshold = base + rank * factor;
        if threshold == 0 || exp < threshold {
            return (exp, rank);
        }
        exp -= threshold;
        rank += 1;
    }
}

impl GameState {
    /// `attacker` strikes `defender` once.
    pub fn attack(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<AttackReport> {
        let (attacker_name, attack) = {
            let entity = self.entity(attacker)?;
            (entity.name.clone(), entity.attack)
        };
        let (defender_name, defense) = {
            let entity = self.entity(defender)?;
            (entity.name.clone(), entity.defense)
        };

        let damage = melee_damage(attack, defense);
        events.push(GameEvent::Attacked {
            attacker,
            defender,
            damage,
        });

        if damage == 0 {
            self.say(
                format!("The {attacker_name} attacks the {defender_name} but it has no effect!"),
                MessageImportance::Combat,
            );
            return Ok(AttackReport {
                damage,
                killed: false,
            });
        }

        self.say(
            format!("The {attacker_name} attacks the {defender_name} for {damage} hit points."),
            MessageImportance::Combat,
        );
        let killed = self.apply_damage(defender, damage, Some(attacker), events)?;
        Ok(AttackReport { damage, killed })
    }

    /// Subtracts HP from `target` and runs its death handling if this was the
    /// killing blow. Returns whether the target died.
    pub fn apply_damage(
        &mut self,
        target: EntityId,
        damage: i32,
        source: Option<EntityId>,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<bool> {
        let entity = self.entity_mut(target)?;
        if !entity.alive || damage <= 0 {
            return Ok(false);
        }
        let killed = entity.take_damage(damage);
        events.push(GameEvent::EntityDamaged {
            entity: target,
            damage,
            source,
        });

        if killed {
            self.handle_death(target, source, events)?;
        }
        Ok(killed)
    }

    fn handle_death(
        &mut self,
        victim: EntityId,
        killer: Option<EntityId>,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        let (name, death, reward) = {
            let entity = self.entity_mut(victim)?;
            entity.alive = false;
            entity.confused_turns = 0;
            (entity.name.clone(), entity.death, entity.exp_reward)
        };
        events.push(GameEvent::EntityDied {
            entity: victim,
            killer,
        });

        match death {
            DeathKind::Player => {
                // The body stays on its tile for the renderer
                self.completion_state = super::GameCompletionState::PlayerDied;
                self.say("You died!", MessageImportance::Critical);
                info!("Player died on turn {}", self.turn_number);
            }
            DeathKind::Monster => {
                self.remove_from_environment(self.current, victim)?;
                self.entities.remove(&victim);
                self.say(
                    format!("The {name} is dead! You gain {reward} experience points."),
                    MessageImportance::Combat,
                );
                debug!("{victim} ({name}) died");
                self.award_experience(self.player_id, reward, events)?;
            }
            DeathKind::None => {
                self.remove_from_environment(self.current, victim)?;
                self.entities.remove(&victim);
                self.say(format!("The {name} is gone."), MessageImportance::Info);
            }
        }
        Ok(())
    }

    /// Grants experience and applies any rank-ups it pays for. Each rank
    /// raises the base stats and heals by the max HP gained.
    pub fn award_experience(
        &mut self,
        id: EntityId,
        amount: u32,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<u32> {
        let (base, factor) = (self.config.level_up_base, self.config.level_up_factor);
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))?;
        if amount == 0 {
            return Ok(0);
        }

        let (exp, rank) = apply_level_ups(entity.exp + amount, entity.rank, base, factor);
        let gained = rank - entity.rank;
        entity.exp = exp;
        entity.rank = rank;
        if gained == 0 {
            return Ok(0);
        }

        let hp_gain = RANK_HP_GAIN * gained as i32;
        entity.base_max_hp += hp_gain;
        entity.base_attack += RANK_ATTACK_GAIN * gained as i32;
        entity.base_defense += RANK_DEFENSE_GAIN * gained as i32;
        entity.recompute_stats(&self.items);
        entity.heal(hp_gain);

        events.push(GameEvent::LeveledUp { entity: id, rank });
        self.say(
            format!("Your battle skills grow stronger! You reached rank {rank}!"),
            MessageImportance::Info,
        );
        info!("{id} reached rank {rank}");
        Ok(gained)
    }
}

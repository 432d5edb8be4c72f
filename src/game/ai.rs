//! # Enemy AI
//!
//! Runs once after every turn the player spends. Entities of the current
//! environment act one at a time in id order, each seeing the effects of
//! those that acted before it.

use super::{Behavior, Direction, EntityId, GameEvent, GameState, MessageImportance, Position};
use crate::utils::{greedy_step, next_step};
use crate::BurrowResult;
use log::trace;
use rand::seq::SliceRandom;

impl GameState {
    /// Lets every non-player entity of the current environment act.
    pub fn run_ai(&mut self) -> BurrowResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        let mut actors: Vec<EntityId> = self
            .current_env()?
            .entities
            .iter()
            .copied()
            .filter(|id| *id != self.player_id)
            .collect();
        actors.sort();

        for id in actors {
            if !self.is_player_alive() {
                break;
            }
            // Killed earlier this turn
            let Some(entity) = self.entities.get(&id) else {
                continue;
            };
            if !entity.alive {
                continue;
            }
            let visible = self
                .current_env()?
                .map
                .get_tile(entity.position)
                .map(|tile| tile.is_visible())
                .unwrap_or(false);
            if !visible {
                continue;
            }
            self.take_turn(id, &mut events)?;
        }
        Ok(events)
    }

    fn take_turn(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> BurrowResult<()> {
        let (position, behavior, confused) = {
            let entity = self.entity(id)?;
            (entity.position, entity.behavior, entity.confused_turns)
        };

        if confused > 0 {
            return self.stumble(id, events);
        }

        let player_pos = self.entity(self.player_id)?.position;
        let distance = position.euclidean_distance(player_pos);
        match behavior {
            Behavior::Idle => {}
            Behavior::Follow => {
                if distance > self.config.ai_attack_range {
                    self.step_towards(id, player_pos, events)?;
                }
            }
            Behavior::Aggressive => {
                if distance > self.config.ai_attack_range {
                    self.step_towards(id, player_pos, events)?;
                } else if self.is_player_alive() {
                    let player = self.player_id;
                    self.attack(id, player, events)?;
                }
            }
        }
        Ok(())
    }

    /// Random cardinal step while confused.
    fn stumble(&mut self, id: EntityId, events: &mut Vec<GameEvent>) -> BurrowResult<()> {
        let direction = Direction::all()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::South);
        let resolution = self.resolve_intent(id, direction)?;
        events.extend(resolution.events);

        let entity = self.entity_mut(id)?;
        entity.confused_turns = entity.confused_turns.saturating_sub(1);
        if entity.confused_turns == 0 {
            let name = entity.name.clone();
            self.say(
                format!("The {name} is no longer confused!"),
                MessageImportance::Combat,
            );
        }
        Ok(())
    }

    fn step_towards(&mut self, id: EntityId, goal: Position, events: &mut Vec<GameEvent>) -> BurrowResult<()> {
        let from = self.entity(id)?.position;
        let map = &self.current_env()?.map;
        let step = next_step(map, from, goal, self.config.ai_path_margin)
            .or_else(|| greedy_step(map, from, goal));

        let Some(step) = step else {
            trace!("{id} has no step towards {goal}");
            return Ok(());
        };
        let Some(direction) = Direction::from_delta(step - from) else {
            return Ok(());
        };
        let resolution = self.resolve_intent(id, direction)?;
        events.extend(resolution.events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, EntityArchetype, EnvironmentId, GameConfig, Role};

    fn dungeon_state() -> GameState {
        let mut game_state = GameState::with_config(GameConfig::for_testing(), 31).unwrap();
        game_state.travel_to(EnvironmentId::Dungeon(1)).unwrap();
        for id in game_state.entities_with_role(Role::Enemy) {
            let current = game_state.current;
            game_state.remove_from_environment(current, id).unwrap();
            game_state.entities.remove(&id);
        }
        game_state.current_env_mut().unwrap().map.reveal_all();
        game_state
    }

    fn spawn(game_state: &mut GameState, archetype: EntityArchetype, pos: Position) -> EntityId {
        let id = game_state.ids.next_entity();
        game_state
            .entities
            .insert(id, Entity::new(id, archetype, pos, 26));
        let current = game_state.current;
        game_state.place_entity(current, id, pos).unwrap();
        id
    }

    /// Carves a straight, revealed, unoccupied line of `distance` tiles away
    /// from the player in every direction that stays inside the border, and
    /// returns the far end of each line.
    fn open_lines(game_state: &mut GameState, distance: i32) -> Vec<Position> {
        let origin = game_state.player().unwrap().position;
        let map = &mut game_state.current_env_mut().unwrap().map;
        let mut ends = Vec::new();
        for direction in Direction::all() {
            let delta = direction.to_delta();
            let line: Vec<Position> = (1..=distance)
                .map(|step| Position::new(origin.x + delta.x * step, origin.y + delta.y * step))
                .collect();
            let usable = line.iter().all(|pos| {
                !map.is_border(*pos) && map.get_tile(*pos).map(|tile| tile.entity.is_none()).unwrap_or(false)
            });
            if !usable {
                continue;
            }
            for pos in &line {
                let tile = map.get_tile_mut(*pos).unwrap();
                tile.blocked = false;
                tile.hidden = false;
            }
            ends.extend(line.last().copied());
        }
        ends
    }

    fn open_line(game_state: &mut GameState, distance: i32) -> Position {
        open_lines(game_state, distance)
            .first()
            .copied()
            .expect("a straight line should fit inside the border")
    }

    #[test]
    fn test_adjacent_enemy_attacks() {
        let mut game_state = dungeon_state();
        let spot = open_line(&mut game_state, 1);
        let orc = spawn(&mut game_state, EntityArchetype::Orc, spot);

        let events = game_state.run_ai().unwrap();
        // Orc attack 5 against player defense 1
        assert!(events.contains(&GameEvent::Attacked {
            attacker: orc,
            defender: game_state.player_id,
            damage: 4,
        }));
        assert_eq!(game_state.player().unwrap().hp, 96);
    }

    #[test]
    fn test_distant_enemy_approaches() {
        let mut game_state = dungeon_state();
        let spot = open_line(&mut game_state, 3);
        let rat = spawn(&mut game_state, EntityArchetype::Rat, spot);
        let player_pos = game_state.player().unwrap().position;
        let before = spot.manhattan_distance(player_pos);

        game_state.run_ai().unwrap();
        let after = game_state.entity(rat).unwrap().position.manhattan_distance(player_pos);
        assert_eq!(after, before - 1);
        game_state.check_invariants().unwrap();
    }

    #[test]
    fn test_hidden_enemy_waits() {
        let mut game_state = dungeon_state();
        let spot = open_line(&mut game_state, 3);
        let rat = spawn(&mut game_state, EntityArchetype::Rat, spot);
        game_state
            .current_env_mut()
            .unwrap()
            .map
            .get_tile_mut(spot)
            .unwrap()
            .hidden = true;

        assert!(game_state.run_ai().unwrap().is_empty());
        assert_eq!(game_state.entity(rat).unwrap().position, spot);
    }

    #[test]
    fn test_confusion_wears_off() {
        let mut game_state = dungeon_state();
        let spot = open_line(&mut game_state, 1);
        let troll = spawn(&mut game_state, EntityArchetype::Troll, spot);
        game_state.entity_mut(troll).unwrap().confused_turns = 2;

        game_state.run_ai().unwrap();
        game_state.run_ai().unwrap();
        assert_eq!(game_state.entity(troll).unwrap().confused_turns, 0);
        // Confused monsters never attack
        assert_eq!(game_state.player().unwrap().hp, 100);
    }

    #[test]
    fn test_enemies_act_in_id_order_against_live_state() {
        let mut game_state = dungeon_state();
        let player_pos = game_state.player().unwrap().position;
        let spots = open_lines(&mut game_state, 1);
        let &[near, other, ..] = spots.as_slice() else {
            panic!("player should have two open neighbours, got {spots:?}");
        };
        assert_eq!(near.manhattan_distance(player_pos), 1);
        assert_eq!(other.manhattan_distance(player_pos), 1);

        let first = spawn(&mut game_state, EntityArchetype::Troll, near);
        let second = spawn(&mut game_state, EntityArchetype::Troll, other);
        assert!(first < second);
        game_state.player_mut().unwrap().hp = 5;

        let events = game_state.run_ai().unwrap();
        // The first troll kills the player, the second one never swings
        let attacks: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, GameEvent::Attacked { .. }))
            .collect();
        assert_eq!(attacks.len(), 1);
        assert!(matches!(attacks[0], GameEvent::Attacked { attacker, .. } if *attacker == first));
        assert!(!game_state.is_player_alive());
    }

    #[test]
    fn test_both_adjacent_enemies_swing_at_a_sturdy_player() {
        let mut game_state = dungeon_state();
        let spots = open_lines(&mut game_state, 1);
        let &[near, other, ..] = spots.as_slice() else {
            panic!("player should have two open neighbours, got {spots:?}");
        };
        let first = spawn(&mut game_state, EntityArchetype::Troll, near);
        let second = spawn(&mut game_state, EntityArchetype::Troll, other);

        let events = game_state.run_ai().unwrap();
        let attackers: Vec<EntityId> = events
            .iter()
            .filter_map(|event| match event {
                GameEvent::Attacked { attacker, .. } => Some(*attacker),
                _ => None,
            })
            .collect();
        assert_eq!(attackers, vec![first, second]);
        // Troll attack 8 against player defense 1, twice
        assert_eq!(game_state.player().unwrap().hp, 86);
    }
}

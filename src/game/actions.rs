//! # Actions
//!
//! Player intents and the movement/interaction resolver.
//!
//! A directional intent is resolved against the tile in front of the actor:
//! talk to an NPC, attack a fighter, walk onto free ground, dig into rock
//! with a suitable tool, or bump into something. The player first turns to
//! face a new direction; only a second press in the same direction moves,
//! digs or bumps. Attacks and dialogue happen on the first press.

use super::{
    DigPower, Direction, EntityId, EnvironmentId, GameEvent, GameState, ItemId, MessageImportance,
    Position, Role, Slot,
};
use crate::config::CARVED_FLOOR_KEY;
use crate::{BurrowError, BurrowResult};
use log::debug;
use serde::{Deserialize, Serialize};

/// What the player wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Step, dig, attack or talk in a direction
    Move(Direction),
    /// Pick up the item underfoot
    PickUp,
    Drop(ItemId),
    /// Use a carried item; the target is only read by targeted spells
    Use {
        item: ItemId,
        target: Option<Position>,
    },
    Equip(ItemId),
    Dequip(ItemId),
    /// Cast the scroll in the spell slot
    Cast { target: Option<Position> },
    /// Take the stairs or door underfoot
    AdvanceFloor,
    ReturnHome,
    Wait,
}

/// What a directional intent turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Moved { from: Position, to: Position },
    /// Only the facing changed
    Turned(Direction),
    Attacked { target: EntityId, damage: i32, killed: bool },
    Dug { position: Position, tool_broke: bool },
    Dialogue { speaker: EntityId },
    Blocked,
}

impl Outcome {
    /// Whether the actor ended up on a different tile.
    pub fn displaced(&self) -> bool {
        matches!(self, Outcome::Moved { .. } | Outcome::Dug { .. })
    }

    /// Whether the outcome costs the actor its turn.
    pub fn spends_turn(&self) -> bool {
        matches!(
            self,
            Outcome::Moved { .. } | Outcome::Attacked { .. } | Outcome::Dug { .. }
        )
    }
}

/// Outcome of one resolved directional intent with the events it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub events: Vec<GameEvent>,
}

/// Result of applying a player intent.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub events: Vec<GameEvent>,
    /// Enemies act after a spent turn
    pub spent_turn: bool,
}

impl ActionReport {
    fn spent(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            spent_turn: true,
        }
    }

    fn free(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            spent_turn: false,
        }
    }
}

enum Step {
    Walk,
    Dig,
    Bump,
}

impl GameState {
    /// Applies a player intent. Errors are returned unchanged; [`GameState::tick`]
    /// decides which ones are recoverable.
    pub fn apply_intent(&mut self, intent: Intent) -> BurrowResult<ActionReport> {
        let player = self.player_id;
        let mut events = Vec::new();
        match intent {
            Intent::Move(direction) => {
                let resolution = self.resolve_intent(player, direction)?;
                let spent = resolution.outcome.spends_turn();
                Ok(ActionReport {
                    events: resolution.events,
                    spent_turn: spent,
                })
            }
            Intent::PickUp => {
                self.pick_up(player, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::Drop(item) => {
                self.drop_item(player, item, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::Use { item, target } => {
                self.use_item(player, item, target, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::Equip(item) => {
                self.equip(player, item, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::Dequip(item) => {
                self.dequip(player, item, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::Cast { target } => {
                self.cast_spell(player, target, &mut events)?;
                Ok(ActionReport::spent(events))
            }
            Intent::AdvanceFloor => Ok(ActionReport::free(self.advance_floor()?)),
            Intent::ReturnHome => Ok(ActionReport::free(self.return_home()?)),
            Intent::Wait => Ok(ActionReport::spent(events)),
        }
    }

    /// Resolves one directional intent for `actor` in the current
    /// environment.
    ///
    /// Only the player talks, attacks on bump, digs and turns before moving.
    /// Other actors walk onto free tiles or are blocked.
    pub fn resolve_intent(&mut self, actor: EntityId, direction: Direction) -> BurrowResult<Resolution> {
        let (origin, is_player, facing) = {
            let entity = self.entity(actor)?;
            (entity.position, entity.is_player(), entity.facing)
        };
        let target = origin + direction.to_delta();
        let current = self.current;
        let map = &self.current_env()?.map;

        let occupant = map.entity_at(target).filter(|&id| id != actor);
        if let (Some(other), true) = (occupant, is_player) {
            let role = self.entity(other)?.role;
            if role == Role::Npc {
                return self.talk(actor, other, direction);
            }
            if current != EnvironmentId::Home && self.entity(other)?.alive {
                return self.melee(actor, other, direction);
            }
        }

        let step = if occupant.is_some() {
            Step::Bump
        } else if !map.is_blocked(target) {
            Step::Walk
        } else if is_player && self.can_dig(actor, target)? {
            Step::Dig
        } else {
            Step::Bump
        };

        let mut events = Vec::new();
        if is_player && facing != direction {
            self.entity_mut(actor)?.facing = direction;
            events.push(GameEvent::EntityTurned {
                entity: actor,
                facing: direction,
            });
            return Ok(Resolution {
                outcome: Outcome::Turned(direction),
                events,
            });
        }
        self.entity_mut(actor)?.facing = direction;

        let outcome = match step {
            Step::Walk => {
                self.move_entity(actor, target, &mut events)?;
                Outcome::Moved { from: origin, to: target }
            }
            Step::Dig => {
                let tool_broke = self.dig(actor, target, &mut events)?;
                Outcome::Dug {
                    position: target,
                    tool_broke,
                }
            }
            Step::Bump => {
                if is_player {
                    self.say("Something blocks the way.", MessageImportance::Info);
                }
                Outcome::Blocked
            }
        };
        Ok(Resolution { outcome, events })
    }

    fn talk(&mut self, actor: EntityId, speaker: EntityId, direction: Direction) -> BurrowResult<Resolution> {
        self.entity_mut(actor)?.facing = direction;
        let npc = self.entity_mut(speaker)?;
        npc.facing = direction.opposite();
        let name = npc.name.clone();
        let line = npc.next_line().unwrap_or_else(|| "...".to_string());

        self.say(format!("{name}: {line}"), MessageImportance::Info);
        Ok(Resolution {
            outcome: Outcome::Dialogue { speaker },
            events: vec![GameEvent::Dialogue { speaker, line }],
        })
    }

    fn melee(&mut self, actor: EntityId, target: EntityId, direction: Direction) -> BurrowResult<Resolution> {
        self.entity_mut(actor)?.facing = direction;
        let mut events = Vec::new();
        let report = self.attack(actor, target, &mut events)?;
        Ok(Resolution {
            outcome: Outcome::Attacked {
                target,
                damage: report.damage,
                killed: report.killed,
            },
            events,
        })
    }

    /// Whether `actor`'s hand tool can break the rock at `pos`.
    fn can_dig(&self, actor: EntityId, pos: Position) -> BurrowResult<bool> {
        let tile = match self.current_env()?.map.get_tile(pos) {
            Some(tile) if tile.blocked => tile,
            _ => return Ok(false),
        };
        let tool = match self.entity(actor)?.equipped_in(Slot::Hand) {
            Some(id) => self.item(id)?,
            None => return Ok(false),
        };
        if tool.durability == Some(0) {
            return Ok(false);
        }
        Ok(match tool.dig {
            DigPower::None => false,
            DigPower::Normal => !tile.unbreakable,
            DigPower::Super => true,
        })
    }

    /// Carves `pos`, moves the digger in and wears the tool. Returns true if
    /// the tool broke.
    fn dig(&mut self, actor: EntityId, pos: Position, events: &mut Vec<GameEvent>) -> BurrowResult<bool> {
        let tool = self
            .entity(actor)?
            .equipped_in(Slot::Hand)
            .ok_or_else(|| BurrowError::EmptyEquipSlot(Slot::Hand.to_string()))?;

        let tile = self.current_env_mut()?.map.tile_mut(pos)?;
        tile.carve();
        tile.unbreakable = false;
        tile.floor_key = CARVED_FLOOR_KEY.to_string();
        events.push(GameEvent::TileDug { position: pos });
        self.move_entity(actor, pos, events)?;

        let item = self.item_mut(tool)?;
        let broke = item.wear();
        let name = item.name.clone();
        if broke {
            events.push(GameEvent::ToolBroke {
                entity: actor,
                item: tool,
            });
            self.destroy_item(actor, tool, events)?;
            self.say(format!("Your {name} breaks!"), MessageImportance::Warning);
        }
        debug!("{actor} dug {pos}");
        Ok(broke)
    }
}

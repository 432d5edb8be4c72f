//! # Game State Module
//!
//! Central game state management and coordination between all game systems.
//!
//! [`GameState`] owns every environment, entity, item and quest. Systems never
//! hold references into each other; they look things up by id through the
//! state. One call to [`GameState::tick`] resolves the player's intent, runs
//! the enemies of the active environment, and returns what happened.

use super::{
    known, Entity, EntityArchetype, EntityId, Environment, EnvironmentId, IdAllocator,
    Intent, Item, ItemArchetype, ItemId, ItemLocation, Portal, Position, QuestId, QuestProgress,
    Questlog, Role, RoomId, Slot, TaskId, World,
};
use crate::generation::{generate_dungeon_floor, generate_garden, generate_home, GeneratedEnvironment};
use crate::{BurrowError, BurrowResult, GameConfig};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Something that happened during a tick.
///
/// Events are returned to the shell (audio cues, animations) and feed the
/// statistics and quest tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntityMoved {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    EntityTurned {
        entity: EntityId,
        facing: super::Direction,
    },
    /// `damage` of 0 means the blow had no effect
    Attacked {
        attacker: EntityId,
        defender: EntityId,
        damage: i32,
    },
    EntityDamaged {
        entity: EntityId,
        damage: i32,
        source: Option<EntityId>,
    },
    EntityDied {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    LeveledUp {
        entity: EntityId,
        rank: u32,
    },
    TileDug {
        position: Position,
    },
    ToolBroke {
        entity: EntityId,
        item: ItemId,
    },
    RoomRevealed {
        environment: EnvironmentId,
        room: RoomId,
    },
    ItemPickedUp {
        entity: EntityId,
        item: ItemId,
    },
    ItemDropped {
        entity: EntityId,
        item: ItemId,
    },
    ItemEquipped {
        entity: EntityId,
        item: ItemId,
        slot: Slot,
    },
    ItemDequipped {
        entity: EntityId,
        item: ItemId,
        slot: Slot,
    },
    ItemUsed {
        entity: EntityId,
        item: ItemId,
    },
    Dialogue {
        speaker: EntityId,
        line: String,
    },
    FloorGenerated {
        floor: u32,
    },
    EnvironmentChanged {
        from: EnvironmentId,
        to: EnvironmentId,
    },
    QuestUpdated {
        quest: QuestId,
        task: TaskId,
        quest_completed: bool,
    },
    /// A recoverable failure that turned the action into a no-op
    ActionFailed {
        reason: String,
    },
}

/// How prominently a narration line should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageImportance {
    Info,
    Combat,
    Warning,
    Critical,
}

/// One narrated line waiting for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub importance: MessageImportance,
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of enemies defeated
    pub enemies_defeated: u32,
    /// Number of items collected
    pub items_collected: u32,
    /// Total damage dealt by the player
    pub damage_dealt: u64,
    /// Total damage taken by the player
    pub damage_taken: u64,
    /// Number of times the player has died
    pub deaths: u32,
    /// Deepest floor reached
    pub max_depth_reached: u32,
    /// Total steps taken by the player
    pub steps_taken: u64,
    /// Rooms revealed
    pub rooms_discovered: u32,
    /// Rock tiles dug out
    pub tiles_dug: u32,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent, player: EntityId) {
        match event {
            GameEvent::EntityMoved { entity, .. } if *entity == player => {
                self.steps_taken += 1;
            }
            GameEvent::EntityDamaged { entity, damage, source } => {
                if *entity == player {
                    self.damage_taken += *damage as u64;
                } else if *source == Some(player) {
                    self.damage_dealt += *damage as u64;
                }
            }
            GameEvent::EntityDied { entity, .. } => {
                if *entity == player {
                    self.deaths += 1;
                } else {
                    self.enemies_defeated += 1;
                }
            }
            GameEvent::ItemPickedUp { entity, .. } if *entity == player => {
                self.items_collected += 1;
            }
            GameEvent::RoomRevealed { .. } => {
                self.rooms_discovered += 1;
            }
            GameEvent::TileDug { .. } => {
                self.tiles_dug += 1;
            }
            GameEvent::EnvironmentChanged { to, .. } => {
                self.max_depth_reached = self.max_depth_reached.max(to.floor());
            }
            _ => {}
        }
    }
}

/// Game completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCompletionState {
    /// Game is still in progress
    Playing,
    /// Player died
    PlayerDied,
}

fn unseeded_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// Central game state containing all game data and systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    /// Garden, home and every dungeon floor generated so far
    pub world: World,
    /// Environment the player is in
    pub current: EnvironmentId,
    /// Every live entity, indexed by ID
    pub entities: BTreeMap<EntityId, Entity>,
    /// Every existing item, indexed by ID
    pub items: BTreeMap<ItemId, Item>,
    pub player_id: EntityId,
    pub questlog: Questlog,
    pub ids: IdAllocator,
    /// Number of turns the player has spent
    pub turn_number: u64,
    /// Narration not yet shown by the renderer
    pub messages: Vec<Message>,
    pub statistics: GameStatistics,
    pub completion_state: GameCompletionState,
    /// Random number generator seed
    pub rng_seed: u64,
    #[serde(skip, default = "unseeded_rng")]
    pub rng: StdRng,
}

impl GameState {
    /// Creates a new game with the default configuration: the garden and home
    /// are built and the player stands in the middle of the home.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{EnvironmentId, GameState};
    ///
    /// let game_state = GameState::new(12345).unwrap();
    /// assert_eq!(game_state.turn_number, 0);
    /// assert_eq!(game_state.current, EnvironmentId::Home);
    /// assert!(game_state.player().is_some());
    /// ```
    pub fn new(seed: u64) -> BurrowResult<Self> {
        Self::with_config(GameConfig::default(), seed)
    }

    /// Creates a new game with an explicit configuration.
    pub fn with_config(config: GameConfig, seed: u64) -> BurrowResult<Self> {
        config.validate()?;

        let mut ids = IdAllocator::new();
        let garden = generate_garden(&config, &mut ids)?;
        let home = generate_home(&config, &mut ids)?;
        let player = Entity::new(
            ids.next_entity(),
            EntityArchetype::Player,
            home.environment.center,
            config.inventory_capacity,
        );
        let player_id = player.id;
        let spawn = home.environment.center;

        let GeneratedEnvironment {
            environment: garden_env,
            entities: garden_entities,
            items: garden_items,
        } = garden;
        let GeneratedEnvironment {
            environment: home_env,
            entities: home_entities,
            items: home_items,
        } = home;

        let mut state = Self {
            config,
            world: World::new(garden_env, home_env),
            current: EnvironmentId::Home,
            entities: BTreeMap::new(),
            items: BTreeMap::new(),
            player_id,
            questlog: Questlog::starting(),
            ids,
            turn_number: 0,
            messages: Vec::new(),
            statistics: GameStatistics::new(),
            completion_state: GameCompletionState::Playing,
            rng_seed: seed,
            rng: StdRng::seed_from_u64(seed),
        };
        state.install(garden_entities, garden_items);
        state.install(home_entities, home_items);
        state.entities.insert(player_id, player);

        let spawn = state
            .world
            .home
            .map
            .nearest_free(spawn)
            .ok_or_else(|| BurrowError::InvalidState("no free tile in the home".to_string()))?;
        state.place_entity(EnvironmentId::Home, player_id, spawn)?;
        state.refresh_player_view(&mut Vec::new())?;
        state.say(
            "Welcome home. Something stirs beneath the floorboards.",
            MessageImportance::Info,
        );

        info!("New game started with seed {seed}");
        Ok(state)
    }

    /// Moves generated entities and items into the arenas. The generator has
    /// already linked them to their tiles.
    fn install(&mut self, entities: Vec<Entity>, items: Vec<Item>) {
        for entity in entities {
            self.entities.insert(entity.id, entity);
        }
        for item in items {
            self.items.insert(item.id, item);
        }
    }

    /// Gets the player entity.
    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(&self.player_id)
    }

    /// Gets the player entity mutably.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.get_mut(&self.player_id)
    }

    pub fn entity(&self, id: EntityId) -> BurrowResult<&Entity> {
        self.entities
            .get(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))
    }

    pub fn entity_mut(&mut self, id: EntityId) -> BurrowResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))
    }

    pub fn item(&self, id: ItemId) -> BurrowResult<&Item> {
        self.items
            .get(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))
    }

    pub fn item_mut(&mut self, id: ItemId) -> BurrowResult<&mut Item> {
        self.items
            .get_mut(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))
    }

    /// The environment the player is in.
    pub fn current_env(&self) -> BurrowResult<&Environment> {
        self.world
            .get(self.current)
            .ok_or_else(|| BurrowError::InvalidState(format!("{} does not exist", self.current)))
    }

    pub fn current_env_mut(&mut self) -> BurrowResult<&mut Environment> {
        let current = self.current;
        self.world
            .get_mut(current)
            .ok_or_else(|| BurrowError::InvalidState(format!("{current} does not exist")))
    }

    pub fn is_player_alive(&self) -> bool {
        self.player().map(|player| player.alive).unwrap_or(false)
    }

    pub fn is_game_over(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    /// Queues a narration line.
    pub fn say(&mut self, text: impl Into<String>, importance: MessageImportance) {
        self.messages.push(Message {
            text: text.into(),
            importance,
        });
    }

    /// Hands all queued narration to the caller.
    pub fn drain_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Puts an entity onto a free tile of an environment.
    pub fn place_entity(&mut self, env_id: EnvironmentId, id: EntityId, pos: Position) -> BurrowResult<()> {
        let env = self
            .world
            .get_mut(env_id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{env_id} does not exist")))?;
        let tile = env.map.tile_mut(pos)?;
        if tile.blocked || tile.entity.is_some() {
            return Err(BurrowError::InvalidState(format!(
                "cannot place {id} on {pos} in {env_id}"
            )));
        }
        tile.entity = Some(id);
        env.add_entity(id);

        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{id} not found")))?;
        entity.position = pos;
        Ok(())
    }

    /// Takes an entity off its tile and out of the environment's entity list.
    pub fn remove_from_environment(&mut self, env_id: EnvironmentId, id: EntityId) -> BurrowResult<()> {
        let pos = self.entity(id)?.position;
        let env = self
            .world
            .get_mut(env_id)
            .ok_or_else(|| BurrowError::InvalidState(format!("{env_id} does not exist")))?;
        if let Some(tile) = env.map.get_tile_mut(pos) {
            if tile.entity == Some(id) {
                tile.entity = None;
            }
        }
        env.remove_entity(id);
        Ok(())
    }

    /// Moves an entity within the current environment. The caller has
    /// already checked that `to` is free.
    pub(crate) fn move_entity(
        &mut self,
        id: EntityId,
        to: Position,
        events: &mut Vec<GameEvent>,
    ) -> BurrowResult<()> {
        let from = self.entity(id)?.position;
        let current = self.current;
        let env = self
            .world
            .get_mut(current)
            .ok_or_else(|| BurrowError::InvalidState(format!("{current} does not exist")))?;

        let destination = env.map.tile_mut(to)?;
        if destination.blocked || destination.entity.is_some() {
            return Err(BurrowError::InvalidState(format!("{to} is not free")));
        }
        destination.entity = Some(id);
        if let Some(source) = env.map.get_tile_mut(from) {
            if source.entity == Some(id) {
                source.entity = None;
            }
        }

        let entity = self.entity_mut(id)?;
        entity.position = to;
        let is_player = entity.is_player();
        events.push(GameEvent::EntityMoved { entity: id, from, to });

        if is_player {
            self.refresh_player_view(events)?;
        }
        Ok(())
    }

    /// Reveals the fog around the player and recenters the camera.
    pub(crate) fn refresh_player_view(&mut self, events: &mut Vec<GameEvent>) -> BurrowResult<()> {
        let pos = self
            .player()
            .map(|player| player.position)
            .ok_or_else(|| BurrowError::InvalidState("No player found".to_string()))?;
        let current = self.current;
        let env = self.current_env_mut()?;
        if env.map.reveal(pos) {
            if let Some(room) = env.map.get_tile(pos).and_then(|tile| tile.room) {
                events.push(GameEvent::RoomRevealed {
                    environment: current,
                    room,
                });
            }
        }
        let (width, height) = (env.map.width, env.map.height);
        env.camera.follow(pos, width, height);
        Ok(())
    }

    /// Travels the player to another environment, generating the next dungeon
    /// floor if it does not exist yet.
    pub fn travel_to(&mut self, target: EnvironmentId) -> BurrowResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        let origin = self.current;
        if target == origin {
            return Err(BurrowError::InvalidAction(format!("You are already in the {target}.")));
        }

        if let EnvironmentId::Dungeon(floor) = target {
            let existing = self.world.floor_count();
            if floor == 0 || floor > existing + 1 {
                return Err(BurrowError::InvalidAction(format!(
                    "floor {floor} cannot be reached from here"
                )));
            }
            if floor == existing + 1 {
                self.generate_next_floor()?;
                events.push(GameEvent::FloorGenerated { floor });
            }
        }

        self.remove_from_environment(origin, self.player_id)?;
        let destination = self
            .world
            .get(target)
            .ok_or_else(|| BurrowError::InvalidState(format!("{target} does not exist")))?;
        let spawn = destination.map.nearest_free(destination.center).ok_or_else(|| {
            BurrowError::InvalidState(format!("no free tile to arrive on in {target}"))
        })?;

        self.current = target;
        self.place_entity(target, self.player_id, spawn)?;
        self.refresh_player_view(&mut events)?;
        events.push(GameEvent::EnvironmentChanged { from: origin, to: target });

        let name = self.current_env()?.name.clone();
        self.say(format!("Entered {name}."), MessageImportance::Info);
        info!("Player moved from {origin} to {target}");
        Ok(events)
    }

    /// Generates and appends the next dungeon floor.
    fn generate_next_floor(&mut self) -> BurrowResult<()> {
        let previous = self.world.floor_count();
        let generated = generate_dungeon_floor(&self.config, previous, &mut self.rng, &mut self.ids)?;
        debug!(
            "Generated floor {} with {} rooms, {} entities, {} items",
            previous + 1,
            generated.environment.map.rooms.len(),
            generated.entities.len(),
            generated.items.len()
        );
        let GeneratedEnvironment {
            environment,
            entities,
            items,
        } = generated;
        self.world.push_floor(environment)?;
        self.install(entities, items);
        Ok(())
    }

    /// Uses the portal fixture (stairs, door) the player is standing on.
    pub fn advance_floor(&mut self) -> BurrowResult<Vec<GameEvent>> {
        let player = self
            .player()
            .ok_or_else(|| BurrowError::InvalidState("No player found".to_string()))?;
        let pos = player.position;
        let portal = self
            .current_env()?
            .map
            .item_at(pos)
            .and_then(|id| self.items.get(&id))
            .and_then(|item| item.portal)
            .ok_or_else(|| BurrowError::InvalidAction("There are no stairs here.".to_string()))?;

        let target = match portal {
            Portal::Descend => EnvironmentId::Dungeon(self.current.floor() + 1),
            Portal::Home => EnvironmentId::Home,
            Portal::Garden => EnvironmentId::Garden,
        };
        self.travel_to(target)
    }

    /// Returns the player to the home's centre from anywhere.
    pub fn return_home(&mut self) -> BurrowResult<Vec<GameEvent>> {
        self.travel_to(EnvironmentId::Home)
    }

    /// Runs one simulation tick for a player intent.
    ///
    /// The intent is resolved first; if it spent the player's turn, every
    /// enemy of the current environment then acts. Recoverable failures are
    /// narrated and reported as [`GameEvent::ActionFailed`] instead of being
    /// returned as errors.
    pub fn tick(&mut self, intent: Intent) -> BurrowResult<Vec<GameEvent>> {
        if self.is_game_over() {
            self.say("You are dead. Start a new game.", MessageImportance::Critical);
            return Ok(Vec::new());
        }

        let mut events = Vec::new();
        let spent_turn = match self.apply_intent(intent) {
            Ok(report) => {
                events.extend(report.events);
                report.spent_turn
            }
            Err(err) if err.is_recoverable() => {
                warn!("Action {intent:?} failed: {err}");
                self.say(err.to_string(), MessageImportance::Warning);
                events.push(GameEvent::ActionFailed {
                    reason: err.to_string(),
                });
                false
            }
            Err(err) => return Err(err),
        };

        if spent_turn {
            self.turn_number += 1;
            if self.is_player_alive() {
                let ai_events = self.run_ai()?;
                events.extend(ai_events);
            }
        }

        let quest_events = self.process_events(&events)?;
        events.extend(quest_events);
        Ok(events)
    }

    /// Feeds events into statistics and quest tracking. Returns any quest
    /// events that resulted.
    fn process_events(&mut self, events: &[GameEvent]) -> BurrowResult<Vec<GameEvent>> {
        let mut triggers: Vec<(QuestId, TaskId)> = Vec::new();
        for event in events {
            self.statistics.update_from_event(event, self.player_id);
            match event {
                GameEvent::ItemPickedUp { entity, item } if *entity == self.player_id => {
                    let archetype = self.items.get(item).map(|item| item.archetype);
                    if archetype == Some(ItemArchetype::Shovel) {
                        triggers.push((known::INTO_THE_DEPTHS, known::TAKE_SHOVEL));
                    }
                }
                GameEvent::EnvironmentChanged { to, .. } => {
                    if to.floor() >= 1 {
                        triggers.push((known::INTO_THE_DEPTHS, known::REACH_FLOOR_ONE));
                    }
                    if to.floor() >= 3 {
                        triggers.push((known::INTO_THE_DEPTHS, known::REACH_FLOOR_THREE));
                    }
                }
                GameEvent::Dialogue { speaker, .. } => {
                    let archetype = self.entities.get(speaker).map(|entity| entity.archetype);
                    if archetype == Some(EntityArchetype::Gardener) {
                        triggers.push((known::GARDEN_CHORES, known::TALK_TO_GARDENER));
                    }
                }
                _ => {}
            }
        }

        let mut quest_events = Vec::new();
        for (quest, task) in triggers {
            let progress = self.questlog.update(quest, task)?;
            if progress == QuestProgress::Unchanged {
                continue;
            }
            let quest_completed = progress == QuestProgress::QuestCompleted;
            if let Some(entry) = self.questlog.get(quest) {
                let text = if quest_completed {
                    format!("Quest complete: {}", entry.name)
                } else {
                    format!("Quest updated: {}", entry.name)
                };
                self.say(text, MessageImportance::Info);
            }
            quest_events.push(GameEvent::QuestUpdated {
                quest,
                task,
                quest_completed,
            });
        }
        Ok(quest_events)
    }

    /// Saves the game state to JSON.
    pub fn save_to_json(&self) -> BurrowResult<String> {
        serde_json::to_string_pretty(self).map_err(BurrowError::from)
    }

    /// Loads game state from JSON.
    ///
    /// Any parse error or broken invariant is reported as
    /// [`BurrowError::LoadFailure`]; no partially restored state is returned.
    pub fn load_from_json(json: &str) -> BurrowResult<Self> {
        let mut state: GameState =
            serde_json::from_str(json).map_err(|err| BurrowError::LoadFailure(err.to_string()))?;
        state
            .check_invariants()
            .map_err(|err| BurrowError::LoadFailure(err.to_string()))?;
        state.rng = StdRng::seed_from_u64(state.rng_seed ^ state.turn_number);
        Ok(state)
    }

    /// Writes a JSON snapshot to `path`.
    pub fn save_to_file(&self, path: &Path) -> BurrowResult<()> {
        let json = self.save_to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a JSON snapshot from `path`.
    pub fn load_from_file(path: &Path) -> BurrowResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| BurrowError::LoadFailure(format!("{}: {err}", path.display())))?;
        Self::load_from_json(&json)
    }

    /// Checks the cross-reference invariants between tiles, environments,
    /// entities and items.
    pub fn check_invariants(&self) -> BurrowResult<()> {
        let broken = |text: String| Err(BurrowError::InvalidState(text));

        let player = self.entity(self.player_id)?;
        if !player.is_player() {
            return broken(format!("{} is not the player", self.player_id));
        }
        let current = self.current_env()?;
        if !current.entities.contains(&self.player_id) {
            return broken(format!("player is not listed in {}", self.current));
        }

        for env in self.world.iter() {
            for id in &env.entities {
                let entity = self.entity(*id)?;
                match env.map.get_tile(entity.position) {
                    Some(tile) if tile.entity == Some(*id) && !tile.blocked => {}
                    _ => return broken(format!("{id} is not on its tile in {}", env.id)),
                }
            }
            for (y, row) in env.map.tiles.iter().enumerate() {
                for (x, tile) in row.iter().enumerate() {
                    let pos = Position::new(x as i32, y as i32);
                    if let Some(id) = tile.entity {
                        if tile.blocked {
                            return broken(format!("{id} stands on blocked tile {pos}"));
                        }
                        if !env.entities.contains(&id) || self.entity(id)?.position != pos {
                            return broken(format!("tile {pos} in {} points at stray {id}", env.id));
                        }
                    }
                    if let Some(id) = tile.item {
                        if self.item(id)?.location != ItemLocation::Ground(env.id, pos) {
                            return broken(format!("tile {pos} in {} points at stray {id}", env.id));
                        }
                    }
                }
            }
        }

        for item in self.items.values() {
            match item.location {
                ItemLocation::Ground(env_id, pos) => {
                    let on_tile = self
                        .world
                        .get(env_id)
                        .and_then(|env| env.map.get_tile(pos))
                        .map(|tile| tile.item == Some(item.id))
                        .unwrap_or(false);
                    if !on_tile {
                        return broken(format!("{} is not on its tile", item.id));
                    }
                }
                ItemLocation::Inventory(owner) => {
                    if !self.entity(owner)?.inventory.contains(item.id) {
                        return broken(format!("{} is not in its owner's inventory", item.id));
                    }
                }
                ItemLocation::Destroyed => {
                    return broken(format!("destroyed {} still exists", item.id));
                }
            }
        }

        for entity in self.entities.values() {
            if entity.inventory.len() > entity.inventory.capacity {
                return broken(format!("{} carries too much", entity.id));
            }
            for id in entity.inventory.listing() {
                if self.item(id)?.location != ItemLocation::Inventory(entity.id) {
                    return broken(format!("{id} is listed by {} but lives elsewhere", entity.id));
                }
            }
            for (slot, id) in &entity.equipment {
                let item = self.item(*id)?;
                if !entity.inventory.contains(*id) || !item.equipped || item.slot != Some(*slot) {
                    return broken(format!("{id} is badly equipped on {}", entity.id));
                }
            }
            let mut recomputed = entity.clone();
            recomputed.recompute_stats(&self.items);
            if (recomputed.max_hp, recomputed.attack, recomputed.defense)
                != (entity.max_hp, entity.attack, entity.defense)
            {
                return broken(format!("{} has stale stats", entity.id));
            }
        }
        Ok(())
    }

    /// Living entities of the current environment with the given role, in id
    /// order.
    pub fn entities_with_role(&self, role: Role) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .current_env()
            .map(|env| env.entities.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                self.entities
                    .get(id)
                    .map(|entity| entity.alive && entity.role == role)
                    .unwrap_or(false)
            })
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    pub(crate) fn new_state() -> GameState {
        GameState::with_config(GameConfig::for_testing(), 12345).unwrap()
    }

    #[test]
    fn test_game_state_creation() {
        let game_state = new_state();
        assert_eq!(game_state.turn_number, 0);
        assert_eq!(game_state.current, EnvironmentId::Home);
        assert_eq!(game_state.world.floor_count(), 0);
        assert!(game_state.is_player_alive());
        game_state.check_invariants().unwrap();
    }

    #[test]
    fn test_player_starts_in_revealed_home() {
        let game_state = new_state();
        let player = game_state.player().unwrap();
        let home = game_state.current_env().unwrap();
        assert_eq!(home.map.entity_at(player.position), Some(game_state.player_id));
        assert!(home.map.get_tile(player.position).unwrap().is_visible());
        assert!(home.camera.contains(player.position));
    }

    #[test]
    fn test_travel_generates_floors_in_order() {
        let mut game_state = new_state();
        assert!(game_state.travel_to(EnvironmentId::Dungeon(2)).is_err());

        let events = game_state.travel_to(EnvironmentId::Dungeon(1)).unwrap();
        assert!(events.contains(&GameEvent::FloorGenerated { floor: 1 }));
        assert!(events.contains(&GameEvent::EnvironmentChanged {
            from: EnvironmentId::Home,
            to: EnvironmentId::Dungeon(1),
        }));
        assert_eq!(game_state.current, EnvironmentId::Dungeon(1));
        assert!(!game_state.world.home.entities.contains(&game_state.player_id));
        game_state.check_invariants().unwrap();

        // Going back home and down again reuses the floor
        game_state.return_home().unwrap();
        let events = game_state.travel_to(EnvironmentId::Dungeon(1)).unwrap();
        assert!(!events.iter().any(|event| matches!(event, GameEvent::FloorGenerated { .. })));
        assert_eq!(game_state.world.floor_count(), 1);
    }

    #[test]
    fn test_travel_to_same_environment_is_rejected() {
        let mut game_state = new_state();
        let err = game_state.travel_to(EnvironmentId::Home).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_advance_floor_requires_portal() {
        let mut game_state = new_state();
        let err = game_state.advance_floor().unwrap_err();
        assert!(matches!(err, BurrowError::InvalidAction(_)));
    }

    #[test]
    fn test_tick_converts_recoverable_errors() {
        let mut game_state = new_state();
        let events = game_state.tick(Intent::AdvanceFloor).unwrap();
        assert!(matches!(events.as_slice(), [GameEvent::ActionFailed { .. }]));
        assert_eq!(game_state.turn_number, 0);
        let messages = game_state.drain_messages();
        assert!(messages
            .iter()
            .any(|message| message.text == "There are no stairs here."));
        assert!(game_state.messages.is_empty());
    }

    #[test]
    fn test_wait_spends_a_turn() {
        let mut game_state = new_state();
        game_state.tick(Intent::Wait).unwrap();
        game_state.tick(Intent::Wait).unwrap();
        assert_eq!(game_state.turn_number, 2);
    }

    #[test]
    fn test_statistics_update() {
        let player = EntityId(0);
        let mut stats = GameStatistics::new();

        stats.update_from_event(
            &GameEvent::EntityMoved {
                entity: player,
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            },
            player,
        );
        stats.update_from_event(
            &GameEvent::EntityMoved {
                entity: EntityId(5),
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            },
            player,
        );
        assert_eq!(stats.steps_taken, 1);

        stats.update_from_event(
            &GameEvent::EntityDamaged {
                entity: EntityId(5),
                damage: 25,
                source: Some(player),
            },
            player,
        );
        stats.update_from_event(
            &GameEvent::EntityDamaged {
                entity: player,
                damage: 4,
                source: Some(EntityId(5)),
            },
            player,
        );
        assert_eq!(stats.damage_dealt, 25);
        assert_eq!(stats.damage_taken, 4);

        stats.update_from_event(
            &GameEvent::EnvironmentChanged {
                from: EnvironmentId::Home,
                to: EnvironmentId::Dungeon(3),
            },
            player,
        );
        assert_eq!(stats.max_depth_reached, 3);
    }

    #[test]
    fn test_game_state_serialization() {
        let mut game_state = new_state();
        game_state.travel_to(EnvironmentId::Dungeon(1)).unwrap();
        let json = game_state.save_to_json().unwrap();

        // Should be valid JSON
        let _: serde_json::Value = serde_json::from_str(&json).unwrap();

        let loaded = GameState::load_from_json(&json).unwrap();
        assert_eq!(loaded.current, EnvironmentId::Dungeon(1));
        assert_eq!(loaded.world, game_state.world);
        assert_eq!(loaded.entities, game_state.entities);
        assert_eq!(loaded.items, game_state.items);
        assert_eq!(loaded.questlog, game_state.questlog);
    }

    #[test]
    fn test_load_rejects_corrupt_json() {
        let err = GameState::load_from_json("{ \"world\": 3").unwrap_err();
        assert!(matches!(err, BurrowError::LoadFailure(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_load_rejects_broken_invariants() {
        let mut game_state = new_state();
        let player = game_state.player_id;
        // Detach the player from its tile without telling the environment
        let pos = game_state.player().unwrap().position;
        game_state.current_env_mut().unwrap().map.get_tile_mut(pos).unwrap().entity = None;
        let json = game_state.save_to_json().unwrap();

        let err = GameState::load_from_json(&json).unwrap_err();
        assert!(matches!(err, BurrowError::LoadFailure(_)), "{err:?} for {player}");
    }

    #[test]
    fn test_turn_is_not_spent_by_facing_change() {
        let mut game_state = new_state();
        let facing = game_state.player().unwrap().facing;
        let other = Direction::all()
            .into_iter()
            .find(|direction| *direction != facing)
            .unwrap();
        game_state.tick(Intent::Move(other)).unwrap();
        assert_eq!(game_state.player().unwrap().facing, other);
        assert_eq!(game_state.turn_number, 0);
    }
}

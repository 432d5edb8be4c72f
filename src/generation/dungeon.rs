//! # Dungeon Generation
//!
//! Procedural dungeon floors using the rooms-and-tunnels algorithm.
//!
//! Each floor starts as solid, hidden rock. Rooms of random size are dropped
//! at random positions; a room that touches an earlier one is discarded. Every
//! accepted room is carved out and joined to the previous one by an L-shaped
//! tunnel. Deeper floors are larger and ask for more rooms.

use super::{place_items, place_monsters, utils, GeneratedEnvironment, Generator};
use crate::game::{
    Camera, EntityId, Environment, EnvironmentId, IdAllocator, Item, ItemArchetype, ItemLocation,
    Map, Position, Rect, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY,
};
use crate::{BurrowError, BurrowResult, GameConfig};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::Rng;

/// Rooms-and-tunnels generator for one dungeon floor.
///
/// # Examples
///
/// ```
/// use burrow::{GameConfig, Generator, IdAllocator, RoomTunnelGenerator};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let generator = RoomTunnelGenerator::new(1);
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut ids = IdAllocator::new();
/// let floor = generator
///     .generate(&GameConfig::for_testing(), &mut rng, &mut ids)
///     .unwrap();
/// assert!(!floor.environment.map.rooms.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RoomTunnelGenerator {
    /// 1-based floor index
    pub floor: u32,
}

impl RoomTunnelGenerator {
    pub fn new(floor: u32) -> Self {
        Self { floor: floor.max(1) }
    }

    /// Solid rock with an unbreakable border. Inner rock is unbreakable with
    /// the configured chance.
    fn blank_map(&self, config: &GameConfig, rng: &mut StdRng) -> Map {
        let generation = &config.generation;
        let (width, height) = generation.map_size(generation.floor_multiplier(self.floor));
        let mut map = Map::new(width, height, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY);
        let chance = generation.unbreakable_chance.clamp(0.0, 1.0);

        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let pos = Position::new(x, y);
                let border = map.is_border(pos);
                if let Some(tile) = map.get_tile_mut(pos) {
                    tile.unbreakable = border || rng.gen_bool(chance);
                }
            }
        }
        map
    }

    /// Draws a room candidate that lies inside the border. Fails with
    /// `InvalidPlacement` when it touches an existing room.
    fn propose_room(
        &self,
        map: &Map,
        config: &GameConfig,
        rng: &mut StdRng,
        index: u32,
    ) -> BurrowResult<Rect> {
        let generation = &config.generation;
        let width = rng.gen_range(generation.room_min_size..=generation.room_max_size) as i32;
        let height = rng.gen_range(generation.room_min_size..=generation.room_max_size) as i32;
        let max_x = map.width as i32 - 2 - width;
        let max_y = map.height as i32 - 2 - height;
        if max_x < 1 || max_y < 1 {
            return Err(BurrowError::InvalidPlacement(format!(
                "room {index} ({width}x{height}) does not fit on a {}x{} map",
                map.width, map.height
            )));
        }

        let x = rng.gen_range(1..=max_x);
        let y = rng.gen_range(1..=max_y);
        let room = Rect::new(x, y, width, height, format!("room {}", index + 1))?;

        let tolerance = generation.intersection_tolerance;
        if let Some(other) = map.rooms.iter().find(|other| room.intersects(other, tolerance)) {
            return Err(BurrowError::InvalidPlacement(format!(
                "{} at ({x}, {y}) intersects {}",
                room.name, other.name
            )));
        }
        Ok(room)
    }

    /// Joins two points with an L-shaped tunnel; which leg comes first is a
    /// coin flip.
    fn connect(map: &mut Map, from: Position, to: Position, rng: &mut StdRng) {
        if rng.gen_bool(0.5) {
            map.carve_h_tunnel(from.x, to.x, from.y);
            map.carve_v_tunnel(from.y, to.y, to.x);
        } else {
            map.carve_v_tunnel(from.y, to.y, from.x);
            map.carve_h_tunnel(from.x, to.x, to.y);
        }
    }

    fn carve_rooms(&self, map: &mut Map, config: &GameConfig, rng: &mut StdRng) -> BurrowResult<()> {
        let requested = config.generation.rooms_requested(self.floor);
        for index in 0..requested {
            match self.propose_room(map, config, rng, index) {
                Ok(room) => {
                    map.carve_room(&room);
                    if let Some(previous) = map.rooms.last().map(Rect::center) {
                        Self::connect(map, previous, room.center(), rng);
                    }
                    map.add_room(room);
                }
                Err(BurrowError::InvalidPlacement(reason)) => {
                    trace!("Floor {}: skipped room: {reason}", self.floor);
                }
                Err(err) => return Err(err),
            }
        }

        if map.rooms.is_empty() {
            return Err(BurrowError::GenerationFailed(format!(
                "no room could be placed on floor {}",
                self.floor
            )));
        }
        Ok(())
    }
}

impl Default for RoomTunnelGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Generator<GeneratedEnvironment> for RoomTunnelGenerator {
    fn generate(
        &self,
        config: &GameConfig,
        rng: &mut StdRng,
        ids: &mut IdAllocator,
    ) -> BurrowResult<GeneratedEnvironment> {
        let env_id = EnvironmentId::Dungeon(self.floor);
        let mut map = self.blank_map(config, rng);
        self.carve_rooms(&mut map, config, rng)?;

        let rooms = map.rooms.clone();
        let (first, last) = match (rooms.first(), rooms.last()) {
            (Some(first), Some(last)) => (first.center(), last.center()),
            _ => {
                return Err(BurrowError::GenerationFailed(
                    "floor has no rooms".to_string(),
                ))
            }
        };

        let mut items = Vec::new();
        let stairs = Item::new(
            ids.next_item(),
            ItemArchetype::Stairs,
            ItemLocation::Ground(env_id, last),
        );
        map.tile_mut(last)?.item = Some(stairs.id);
        items.push(stairs);

        // The arrival room is kept free of monsters
        let mut entities = Vec::new();
        for (index, room) in rooms.iter().enumerate() {
            if index > 0 {
                entities.extend(place_monsters(&mut map, room, self.floor, config, rng, ids));
            }
            items.extend(place_items(&mut map, room, self.floor, rng, ids));
        }

        let mut environment = Environment::new(
            env_id,
            format!("Floor {}", self.floor),
            map,
            first,
            Camera::new(config.camera_width, config.camera_height),
        );
        for id in entities.iter().map(|entity| entity.id) {
            environment.add_entity(id);
        }

        debug!(
            "{} built {env_id}: {}x{}, {} rooms, {} monsters, {} items",
            self.generator_type(),
            environment.map.width,
            environment.map.height,
            rooms.len(),
            entities.len(),
            items.len()
        );
        Ok(GeneratedEnvironment {
            environment,
            entities,
            items,
        })
    }

    fn validate(&self, content: &GeneratedEnvironment, _config: &GameConfig) -> BurrowResult<()> {
        let map = &content.environment.map;
        utils::validate_floor(map)?;
        if map.is_blocked(content.environment.center) {
            return Err(BurrowError::GenerationFailed(format!(
                "spawn point {} of floor {} is solid rock",
                content.environment.center, self.floor
            )));
        }
        let listed: Vec<EntityId> = content.entities.iter().map(|entity| entity.id).collect();
        if listed != content.environment.entities {
            return Err(BurrowError::GenerationFailed(
                "entity list does not match the placed monsters".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomTunnelGenerator"
    }
}

/// Generates the floor below the `previous_floor_count` floors that already
/// exist.
pub fn generate_dungeon_floor(
    config: &GameConfig,
    previous_floor_count: u32,
    rng: &mut StdRng,
    ids: &mut IdAllocator,
) -> BurrowResult<GeneratedEnvironment> {
    let generator = RoomTunnelGenerator::new(previous_floor_count + 1);
    let generated = generator.generate(config, rng, ids)?;
    generator.validate(&generated, config)?;
    Ok(generated)
}

//! # Hub Layouts
//!
//! Hand-made layouts for the home and the garden. Both are built from
//! literal rectangles around the map centre, so their shape does not depend
//! on the seed.

use super::{utils, GeneratedEnvironment};
use crate::game::{
    Camera, Entity, EntityArchetype, Environment, EnvironmentId, IdAllocator, Item, ItemArchetype,
    ItemLocation, Map, Position, Rect,
};
use crate::{BurrowResult, GameConfig};
use log::debug;

const HOME_FLOOR_KEY: &str = "floor_wood";
const HOME_WALL_KEY: &str = "wall_brick";
const GARDEN_FLOOR_KEY: &str = "floor_grass";
const GARDEN_WALL_KEY: &str = "wall_hedge";

/// Collects what a hub layout places so it can be linked to tiles as it goes.
struct HubBuilder {
    env_id: EnvironmentId,
    map: Map,
    entities: Vec<Entity>,
    items: Vec<Item>,
}

impl HubBuilder {
    fn new(env_id: EnvironmentId, map: Map) -> Self {
        Self {
            env_id,
            map,
            entities: Vec::new(),
            items: Vec::new(),
        }
    }

    fn room(&mut self, room: Rect) {
        self.map.carve_room(&room);
        self.map.add_room(room);
    }

    fn item(&mut self, ids: &mut IdAllocator, archetype: ItemArchetype, pos: Position) -> BurrowResult<()> {
        let item = Item::new(ids.next_item(), archetype, ItemLocation::Ground(self.env_id, pos));
        self.map.tile_mut(pos)?.item = Some(item.id);
        self.items.push(item);
        Ok(())
    }

    fn npc(
        &mut self,
        ids: &mut IdAllocator,
        archetype: EntityArchetype,
        pos: Position,
        config: &GameConfig,
    ) -> BurrowResult<()> {
        let entity = Entity::new(ids.next_entity(), archetype, pos, config.inventory_capacity);
        self.map.tile_mut(pos)?.entity = Some(entity.id);
        self.entities.push(entity);
        Ok(())
    }

    fn finish(self, name: &str, center: Position, config: &GameConfig) -> BurrowResult<GeneratedEnvironment> {
        utils::validate_floor(&self.map)?;
        let mut environment = Environment::new(
            self.env_id,
            name,
            self.map,
            center,
            Camera::new(config.camera_width, config.camera_height),
        );
        for entity in &self.entities {
            environment.add_entity(entity.id);
        }
        debug!(
            "Built {}: {} rooms, {} NPCs, {} items",
            self.env_id,
            environment.map.rooms.len(),
            self.entities.len(),
            self.items.len()
        );
        Ok(GeneratedEnvironment {
            environment,
            entities: self.entities,
            items: self.items,
        })
    }
}

/// Builds the home: a hall with the front door, a bedroom to the east and a
/// cellar to the south holding the ladder down. The player arrives in the
/// middle of the hall.
pub fn generate_home(config: &GameConfig, ids: &mut IdAllocator) -> BurrowResult<GeneratedEnvironment> {
    let generation = &config.generation;
    let (width, height) = generation.map_size(generation.home_size_factor);
    let mut map = Map::new(width, height, HOME_FLOOR_KEY, HOME_WALL_KEY);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let pos = Position::new(x, y);
            if map.is_border(pos) {
                map.tile_mut(pos)?.unbreakable = true;
            }
        }
    }

    let (cx, cy) = (width as i32 / 2, height as i32 / 2);
    let hall = Rect::from_corners(cx - 5, cy - 4, cx + 5, cy + 4, "hall")?;
    let bedroom = Rect::from_corners(cx + 8, cy - 3, cx + 15, cy + 3, "bedroom")?;
    let cellar = Rect::from_corners(cx - 5, cy + 7, cx + 5, cy + 13, "cellar")?;
    let center = hall.center();

    let mut builder = HubBuilder::new(EnvironmentId::Home, map);
    builder.room(hall);
    builder.room(bedroom);
    builder.room(cellar);
    builder.map.carve_h_tunnel(cx, cx + 11, cy);
    builder.map.carve_v_tunnel(cy, cy + 10, cx);

    builder.item(ids, ItemArchetype::Shovel, Position::new(cx - 3, cy - 2))?;
    builder.item(ids, ItemArchetype::GardenDoor, Position::new(cx - 4, cy + 3))?;
    builder.item(ids, ItemArchetype::HealingPotion, Position::new(cx + 13, cy - 2))?;
    builder.item(ids, ItemArchetype::Stairs, Position::new(cx + 2, cy + 11))?;
    builder.npc(ids, EntityArchetype::Cat, Position::new(cx + 10, cy + 1), config)?;

    builder.finish("Home", center, config)
}

/// Builds the garden: one open, fully revealed yard with the gardener and the
/// door back into the house.
pub fn generate_garden(config: &GameConfig, ids: &mut IdAllocator) -> BurrowResult<GeneratedEnvironment> {
    let generation = &config.generation;
    let (width, height) = generation.map_size(generation.garden_size_factor);
    let mut map = Map::new(width, height, GARDEN_FLOOR_KEY, GARDEN_WALL_KEY);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let pos = Position::new(x, y);
            if map.is_border(pos) {
                map.tile_mut(pos)?.unbreakable = true;
            }
        }
    }

    let yard = Rect::from_corners(0, 0, width as i32 - 1, height as i32 - 1, "yard")?;
    let center = yard.center();
    let (cx, cy) = (center.x, center.y);

    let mut builder = HubBuilder::new(EnvironmentId::Garden, map);
    builder.room(yard);
    builder.map.reveal_all();

    builder.item(ids, ItemArchetype::HomeDoor, Position::new(cx, cy + 2))?;
    builder.item(ids, ItemArchetype::Turnip, Position::new(cx + 3, cy - 2))?;
    builder.item(ids, ItemArchetype::Turnip, Position::new(cx + 4, cy + 1))?;
    builder.npc(ids, EntityArchetype::Gardener, Position::new(cx - 3, cy - 2), config)?;

    builder.finish("Garden", center, config)
}

//! Integration tests for stairs, doors and the append-only floor list.

use burrow::{
    known, EnvironmentId, GameConfig, GameEvent, GameState, Intent, ItemArchetype, ItemLocation, Position,
};

fn new_game(seed: u64) -> GameState {
    GameState::with_config(GameConfig::for_testing(), seed).expect("new game")
}

/// Ground position of the first item of `archetype` in `env`.
fn fixture(game_state: &GameState, env: EnvironmentId, archetype: ItemArchetype) -> Position {
    game_state
        .items
        .values()
        .find_map(|item| match item.location {
            ItemLocation::Ground(id, pos) if id == env && item.archetype == archetype => Some(pos),
            _ => None,
        })
        .expect("fixture exists")
}

/// Puts the player straight onto `pos` in the current environment, clearing
/// away any monster standing there.
fn teleport(game_state: &mut GameState, pos: Position) {
    let current = game_state.current;
    let player = game_state.player_id;
    let occupant = game_state.current_env().unwrap().map.entity_at(pos);
    if let Some(other) = occupant.filter(|other| *other != player) {
        game_state.remove_from_environment(current, other).unwrap();
        game_state.entities.remove(&other);
    }
    game_state.remove_from_environment(current, player).unwrap();
    game_state.place_entity(current, player, pos).unwrap();
}

fn take_stairs(game_state: &mut GameState) -> Vec<GameEvent> {
    let stairs = fixture(game_state, game_state.current, ItemArchetype::Stairs);
    teleport(game_state, stairs);
    game_state.tick(Intent::AdvanceFloor).unwrap()
}

#[test]
fn test_home_stairs_lead_to_first_floor() {
    let mut game_state = new_game(98765);
    let events = take_stairs(&mut game_state);

    assert_eq!(game_state.current, EnvironmentId::Dungeon(1));
    assert_eq!(game_state.world.floor_count(), 1);
    assert!(events.contains(&GameEvent::FloorGenerated { floor: 1 }));
    assert!(events.contains(&GameEvent::EnvironmentChanged {
        from: EnvironmentId::Home,
        to: EnvironmentId::Dungeon(1),
    }));
    // Travel is free: no enemy acted and no turn passed
    assert_eq!(game_state.turn_number, 0);

    let env = game_state.current_env().unwrap();
    let player = game_state.player().unwrap();
    assert!(env.entities.contains(&player.id));
    assert!(env.map.get_tile(player.position).unwrap().is_visible());
    assert!(!game_state.world.home.entities.contains(&player.id));
    game_state.check_invariants().unwrap();
}

#[test]
fn test_floors_are_appended_never_recycled() {
    let mut game_state = new_game(54321);
    take_stairs(&mut game_state);
    take_stairs(&mut game_state);
    assert_eq!(game_state.current, EnvironmentId::Dungeon(2));
    assert_eq!(game_state.world.floor_count(), 2);
    let second_floor = game_state.world.get(EnvironmentId::Dungeon(2)).unwrap().map.clone();

    game_state.tick(Intent::ReturnHome).unwrap();
    assert_eq!(game_state.current, EnvironmentId::Home);

    // Going down again revisits the existing first floor
    let events = take_stairs(&mut game_state);
    assert_eq!(game_state.current, EnvironmentId::Dungeon(1));
    assert_eq!(game_state.world.floor_count(), 2);
    assert!(!events
        .iter()
        .any(|event| matches!(event, GameEvent::FloorGenerated { .. })));

    take_stairs(&mut game_state);
    let revisited = &game_state.world.get(EnvironmentId::Dungeon(2)).unwrap().map;
    assert_eq!(revisited.rooms, second_floor.rooms);
    game_state.check_invariants().unwrap();
}

#[test]
fn test_deeper_floors_are_larger() {
    let mut game_state = new_game(2024);
    take_stairs(&mut game_state);
    take_stairs(&mut game_state);
    let first = &game_state.world.floors[0].map;
    let second = &game_state.world.floors[1].map;
    assert_eq!(second.width, first.width * 2);
    assert_eq!(second.height, first.height * 2);
}

#[test]
fn test_no_stairs_underfoot() {
    let mut game_state = new_game(5);
    let events = game_state.tick(Intent::AdvanceFloor).unwrap();

    assert_eq!(game_state.current, EnvironmentId::Home);
    assert!(matches!(&events[..], [GameEvent::ActionFailed { reason }] if reason.contains("no stairs")));
    assert!(game_state
        .messages
        .iter()
        .any(|message| message.text == "Invalid action: There are no stairs here."));
}

#[test]
fn test_garden_door_round_trip() {
    let mut game_state = new_game(11);
    let door = fixture(&game_state, EnvironmentId::Home, ItemArchetype::GardenDoor);
    teleport(&mut game_state, door);
    game_state.tick(Intent::AdvanceFloor).unwrap();
    assert_eq!(game_state.current, EnvironmentId::Garden);

    let door = fixture(&game_state, EnvironmentId::Garden, ItemArchetype::HomeDoor);
    teleport(&mut game_state, door);
    game_state.tick(Intent::AdvanceFloor).unwrap();
    assert_eq!(game_state.current, EnvironmentId::Home);
    // The garden is not a dungeon floor
    assert_eq!(game_state.world.floor_count(), 0);
}

#[test]
fn test_reaching_floors_advances_the_main_quest() {
    let mut game_state = new_game(31337);
    take_stairs(&mut game_state);
    let quest = game_state.questlog.get(known::INTO_THE_DEPTHS).unwrap();
    assert!(quest.task(known::REACH_FLOOR_ONE).unwrap().done);
    assert!(!quest.task(known::REACH_FLOOR_THREE).unwrap().done);

    take_stairs(&mut game_state);
    let events = take_stairs(&mut game_state);
    assert!(events.contains(&GameEvent::QuestUpdated {
        quest: known::INTO_THE_DEPTHS,
        task: known::REACH_FLOOR_THREE,
        quest_completed: false,
    }));
    assert_eq!(game_state.statistics.max_depth_reached, 3);
}

#[test]
fn test_return_home_from_home_is_refused() {
    let mut game_state = new_game(8);
    let events = game_state.tick(Intent::ReturnHome).unwrap();
    assert!(matches!(&events[..], [GameEvent::ActionFailed { .. }]));
    assert_eq!(game_state.current, EnvironmentId::Home);
}

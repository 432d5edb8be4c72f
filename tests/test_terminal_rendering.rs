//! Integration test for the terminal shell: scripted input through to ASCII
//! frames.

use burrow::{
    frame_lines, run_frame, AsciiRenderer, BurrowResult, EnvironmentId, FrameStatus, FrameView, GameConfig,
    GameState, LineInput, LoggingAudio, Position, Session,
};
use tempfile::tempdir;

/// Runs `script` to completion and returns everything the renderer wrote.
fn run_script(game_state: &mut GameState, session: &mut Session, script: &str) -> BurrowResult<String> {
    let mut input = LineInput::new(script.as_bytes());
    let mut renderer = AsciiRenderer::new(Vec::new());
    let mut audio = LoggingAudio::default();
    loop {
        match run_frame(game_state, session, &mut input, &mut renderer, &mut audio)? {
            FrameStatus::Continue => {}
            FrameStatus::Idle | FrameStatus::Quit => break,
        }
    }
    Ok(String::from_utf8(renderer.into_inner()).expect("renderer writes UTF-8"))
}

#[test]
fn test_frame_shows_player_and_status() -> BurrowResult<()> {
    let mut game_state = GameState::with_config(GameConfig::for_testing(), 12345)?;
    let messages = game_state.drain_messages();
    let frame = FrameView::capture(&game_state, messages, None)?;
    let lines = frame_lines(&frame);

    let camera = &game_state.current_env()?.camera;
    let map_rows = &lines[..camera.height as usize];
    assert!(map_rows.iter().all(|row| row.chars().count() == camera.width as usize));
    assert_eq!(map_rows.iter().flat_map(|row| row.chars()).filter(|c| *c == '@').count(), 1);

    let status = &lines[camera.height as usize];
    assert!(status.starts_with("Home | HP 100/100"), "{status}");
    assert!(lines.iter().any(|line| line.starts_with("Welcome home")));
    Ok(())
}

#[test]
fn test_hidden_tiles_stay_blank() -> BurrowResult<()> {
    let mut game_state = GameState::with_config(GameConfig::for_testing(), 77)?;
    game_state.travel_to(EnvironmentId::Dungeon(1))?;
    let frame = FrameView::capture(&game_state, Vec::new(), None)?;
    let env = game_state.current_env()?;

    let lines = frame_lines(&frame);
    for (row, y) in lines.iter().zip(env.camera.rows()) {
        for (glyph, x) in row.chars().zip(env.camera.columns()) {
            let tile = env.map.get_tile(Position::new(x, y)).expect("camera stays on the map");
            if tile.hidden {
                assert_eq!(glyph, ' ', "hidden tile ({x}, {y}) was drawn");
            } else {
                assert_ne!(glyph, ' ', "revealed tile ({x}, {y}) was left blank");
            }
        }
    }
    Ok(())
}

#[test]
fn test_scripted_session() -> BurrowResult<()> {
    let dir = tempdir()?;
    let save_path = dir.path().join("save.json");
    let mut game_state = GameState::with_config(GameConfig::for_testing(), 2468)?;
    let mut session = Session::new(Some(save_path.clone()));

    let output = run_script(&mut game_state, &mut session, "d\nd\ni\nq\n?\nsave\nquit\nw\n")?;

    assert!(output.contains("== Inventory =="));
    assert!(output.contains("You carry nothing."));
    assert!(output.contains("== Quests =="));
    assert!(output.contains("> Into the Depths"));
    assert!(output.contains("== Commands =="));
    assert!(output.contains("Saved to"));
    // Nothing after quit is applied
    assert_eq!(game_state.player().map(|player| player.facing), Some(burrow::Direction::East));

    let restored = GameState::load_from_file(&save_path)?;
    assert_eq!(restored.player().map(|p| p.position), game_state.player().map(|p| p.position));
    Ok(())
}

#[test]
fn test_failed_action_is_narrated() -> BurrowResult<()> {
    let mut game_state = GameState::with_config(GameConfig::for_testing(), 9)?;
    let mut session = Session::new(None);
    let output = run_script(&mut game_state, &mut session, ">\nz\nsave\n")?;

    assert!(output.contains("There are no stairs here."));
    assert!(output.contains("Nothing is equipped in the spell slot"));
    assert!(output.contains("No save file was given."));
    Ok(())
}

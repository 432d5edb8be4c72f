//! # Rendering Module
//!
//! Plain-text renderer for terminals and scripted runs. Draws the camera's
//! part of the map with one character per tile, followed by the status line,
//! an optional panel and the frame's messages.
//!
//! Hidden tiles are drawn as blank space, and so is everything standing on
//! them.

use crate::config::CARVED_FLOOR_KEY;
use crate::game::Position;
use crate::shell::{FrameView, Renderer};
use crate::BurrowResult;
use std::io::Write;

/// Character drawn for a sprite key.
pub fn glyph_for(sprite: &str) -> char {
    match sprite {
        "player" => '@',
        "monster_rat" => 'r',
        "monster_slime" => 's',
        "monster_orc" => 'o',
        "monster_troll" => 'T',
        "npc_gardener" => 'G',
        "npc_cat" => 'c',
        "fixture_stairs" => '>',
        "fixture_door" => '+',
        "item_potion_red" => '!',
        "item_scroll" => '?',
        "item_shovel" | "item_golden_shovel" => '(',
        "item_dagger" | "item_sword" => ')',
        "item_helmet" | "item_leather_armor" | "item_boots" => '[',
        "item_turnip" => '%',
        _ => '*',
    }
}

/// Map rows of a frame, without status or messages.
pub fn map_lines(frame: &FrameView<'_>) -> Vec<String> {
    let camera = frame.camera;
    camera
        .rows()
        .map(|y| {
            camera
                .columns()
                .map(|x| tile_glyph(frame, Position::new(x, y)))
                .collect()
        })
        .collect()
}

fn tile_glyph(frame: &FrameView<'_>, pos: Position) -> char {
    let Some(tile) = frame.map.get_tile(pos) else {
        return ' ';
    };
    if !tile.is_visible() {
        return ' ';
    }
    if let Some(entity) = frame.entities.iter().find(|sprite| sprite.position == pos) {
        return glyph_for(&entity.sprite);
    }
    if let Some(item) = frame.items.iter().find(|sprite| sprite.position == pos) {
        return glyph_for(&item.sprite);
    }
    if tile.blocked {
        '#'
    } else if tile.floor_key == CARVED_FLOOR_KEY {
        ','
    } else {
        '.'
    }
}

/// The whole frame as text, one line per entry.
pub fn frame_lines(frame: &FrameView<'_>) -> Vec<String> {
    let mut lines = map_lines(frame);

    if let Some(status) = &frame.status {
        lines.push(format!(
            "{} | HP {}/{} | ATK {} DEF {} | Rank {} ({}/{} exp) | Turn {}",
            status.location,
            status.hp,
            status.max_hp,
            status.attack,
            status.defense,
            status.rank,
            status.exp,
            status.next_rank_exp,
            status.turn
        ));
    }
    if let Some(panel) = &frame.panel {
        lines.push(format!("== {} ==", panel.title));
        lines.extend(panel.lines.iter().cloned());
    }
    lines.extend(frame.messages.iter().map(|message| message.text.clone()));
    if frame.game_over {
        lines.push("*** GAME OVER ***".to_string());
    }
    lines
}

/// Writes frames as plain text to any writer.
///
/// # Examples
///
/// ```
/// use burrow::{AsciiRenderer, FrameView, GameConfig, GameState, Renderer};
///
/// let game_state = GameState::with_config(GameConfig::for_testing(), 1).unwrap();
/// let frame = FrameView::capture(&game_state, Vec::new(), None).unwrap();
///
/// let mut renderer = AsciiRenderer::new(Vec::new());
/// renderer.render(&frame).unwrap();
/// let text = String::from_utf8(renderer.into_inner()).unwrap();
/// assert!(text.contains('@'));
/// ```
pub struct AsciiRenderer<W> {
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AsciiRenderer<W> {
    fn render(&mut self, frame: &FrameView<'_>) -> BurrowResult<()> {
        for line in frame_lines(frame) {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Camera, Map, Rect, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY};
    use crate::shell::{PanelView, SpriteView};

    fn small_map() -> Map {
        let mut map = Map::new(8, 5, DEFAULT_FLOOR_KEY, DEFAULT_WALL_KEY);
        let room = Rect::from_corners(1, 1, 6, 3, "room").unwrap();
        map.carve_room(&room);
        map.add_room(room);
        map
    }

    fn frame<'a>(map: &'a Map, camera: &'a Camera) -> FrameView<'a> {
        FrameView {
            map,
            camera,
            items: Vec::new(),
            entities: Vec::new(),
            status: None,
            messages: Vec::new(),
            panel: None,
            game_over: false,
        }
    }

    #[test]
    fn test_hidden_tiles_are_blank() {
        let map = small_map();
        let camera = Camera::new(8, 5);
        let lines = map_lines(&frame(&map, &camera));
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.trim().is_empty()));
    }

    #[test]
    fn test_revealed_room_and_sprites() {
        let mut map = small_map();
        map.reveal(Position::new(2, 2));
        let camera = Camera::new(8, 5);
        let mut view = frame(&map, &camera);
        view.entities.push(SpriteView {
            position: Position::new(2, 2),
            sprite: "player".to_string(),
            name: "player".to_string(),
        });
        view.items.push(SpriteView {
            position: Position::new(4, 2),
            sprite: "fixture_stairs".to_string(),
            name: "stairs".to_string(),
        });

        let lines = map_lines(&view);
        // The room walls are revealed along with the room, the outer ring is not
        assert_eq!(lines[0], "        ");
        assert_eq!(lines[1], " ###### ");
        assert_eq!(lines[2], " #@.>.# ");
    }

    #[test]
    fn test_only_camera_range_is_drawn() {
        let mut map = small_map();
        map.reveal_all();
        let mut camera = Camera::new(3, 2);
        camera.follow(Position::new(6, 3), map.width, map.height);

        assert_eq!(camera.columns(), 5..8);
        assert_eq!(camera.rows(), 2..4);
        let lines = map_lines(&frame(&map, &camera));
        assert_eq!(lines, vec![".##".to_string(), "###".to_string()]);
    }

    #[test]
    fn test_panel_and_game_over_lines() {
        let map = small_map();
        let camera = Camera::new(2, 1);
        let mut view = frame(&map, &camera);
        view.panel = Some(PanelView {
            title: "Quests".to_string(),
            lines: vec!["> Into the Depths".to_string()],
        });
        view.game_over = true;

        let lines = frame_lines(&view);
        assert_eq!(lines[1], "== Quests ==");
        assert_eq!(lines[2], "> Into the Depths");
        assert_eq!(lines.last().map(String::as_str), Some("*** GAME OVER ***"));
    }

    #[test]
    fn test_unknown_sprite_glyph() {
        assert_eq!(glyph_for("monster_troll"), 'T');
        assert_eq!(glyph_for(""), '*');
        assert_eq!(glyph_for("mystery"), '*');
    }
}

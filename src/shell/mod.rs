//! # Shell
//!
//! The boundary between the simulation and whatever presents it. Rendering,
//! input and audio are collaborator traits; [`run_frame`] drives one frame
//! through them: poll input, tick the game, render.

use crate::game::{
    Camera, EnvironmentId, GameEvent, GameState, ItemLocation, Map, Message, MessageImportance, Position,
    QuestMenu,
};
use crate::input::{help_lines, InputHandler, PlayerInput, QuestCommand};
use crate::BurrowResult;
use log::{debug, warn};
use std::io::BufRead;
use std::path::PathBuf;

/// Fire-and-forget cue for the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Music for the environment just entered
    EnvironmentChanged(EnvironmentId),
    MenuOpened,
    /// The quest menu switched between list and detail
    MenuChanged,
    MenuClosed,
}

impl AudioCue {
    /// Cue triggered by a game event, if any.
    pub fn from_event(event: &GameEvent) -> Option<AudioCue> {
        match event {
            GameEvent::EnvironmentChanged { to, .. } => Some(AudioCue::EnvironmentChanged(*to)),
            _ => None,
        }
    }
}

/// Something drawn at a map position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteView {
    pub position: Position,
    pub sprite: String,
    pub name: String,
}

/// Player numbers shown next to the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub rank: u32,
    pub exp: u32,
    pub next_rank_exp: u32,
    pub location: String,
    pub turn: u64,
}

/// Text panel drawn over the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub title: String,
    pub lines: Vec<String>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub map: &'a Map,
    pub camera: &'a Camera,
    /// Ground items of the current environment
    pub items: Vec<SpriteView>,
    pub entities: Vec<SpriteView>,
    pub status: Option<StatusView>,
    pub messages: Vec<Message>,
    pub panel: Option<PanelView>,
    pub game_over: bool,
}

impl<'a> FrameView<'a> {
    /// Captures the current environment of `game_state`.
    pub fn capture(
        game_state: &'a GameState,
        messages: Vec<Message>,
        panel: Option<PanelView>,
    ) -> BurrowResult<Self> {
        let env = game_state.current_env()?;

        let items = game_state
            .items
            .values()
            .filter_map(|item| match item.location {
                ItemLocation::Ground(env_id, position) if env_id == env.id && !item.hidden => {
                    Some(SpriteView {
                        position,
                        sprite: item.sprite.clone(),
                        name: item.name.clone(),
                    })
                }
                _ => None,
            })
            .collect();

        let entities = env
            .entities
            .iter()
            .filter_map(|id| game_state.entities.get(id))
            .map(|entity| SpriteView {
                position: entity.position,
                sprite: entity.sprite.clone(),
                name: entity.name.clone(),
            })
            .collect();

        let status = game_state.player().map(|player| StatusView {
            hp: player.hp,
            max_hp: player.max_hp,
            attack: player.attack,
            defense: player.defense,
            rank: player.rank,
            exp: player.exp,
            next_rank_exp: game_state.config.level_up_threshold(player.rank),
            location: env.name.clone(),
            turn: game_state.turn_number,
        });

        Ok(Self {
            map: &env.map,
            camera: &env.camera,
            items,
            entities,
            status,
            messages,
            panel,
            game_over: game_state.is_game_over(),
        })
    }
}

/// Draws frames.
pub trait Renderer {
    fn render(&mut self, frame: &FrameView<'_>) -> BurrowResult<()>;
}

/// Supplies player input. `None` means no input is available.
pub trait InputSource {
    fn poll(&mut self) -> Option<PlayerInput>;
}

/// Receives audio cues.
pub trait AudioController {
    fn notify(&mut self, cue: AudioCue);
}

/// Audio controller that only logs its cues.
#[derive(Debug, Default)]
pub struct LoggingAudio {
    pub played: Vec<AudioCue>,
}

impl AudioController for LoggingAudio {
    fn notify(&mut self, cue: AudioCue) {
        debug!("Audio cue: {cue:?}");
        self.played.push(cue);
    }
}

/// Reads one command per line from any buffered reader.
///
/// Lines that fail to parse are logged and skipped. End of input polls as
/// `None`.
pub struct LineInput<R> {
    reader: R,
    handler: InputHandler,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            handler: InputHandler::new(),
        }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn poll(&mut self) -> Option<PlayerInput> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    warn!("Failed to read input: {err}");
                    return None;
                }
            }
            match self.handler.parse(&line) {
                Ok(Some(input)) => return Some(input),
                Ok(None) => continue,
                Err(err) => warn!("{err}"),
            }
        }
    }
}

/// What the caller should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    /// The input source had nothing to give
    Idle,
    Quit,
}

/// Shell-side state that lives across frames but is never saved.
#[derive(Default)]
pub struct Session {
    pub handler: InputHandler,
    pub save_path: Option<PathBuf>,
    pub quests_open: bool,
    /// One-shot panel such as help or the inventory listing
    pub pending_panel: Option<PanelView>,
}

impl Session {
    pub fn new(save_path: Option<PathBuf>) -> Self {
        Self {
            save_path,
            ..Self::default()
        }
    }

    fn quest_command(&mut self, game_state: &mut GameState, command: QuestCommand, audio: &mut dyn AudioController) {
        let questlog = &mut game_state.questlog;
        match command {
            QuestCommand::Open => {
                if !self.quests_open {
                    self.quests_open = true;
                    questlog.menu = QuestMenu::List { cursor: 0 };
                    audio.notify(AudioCue::MenuOpened);
                }
            }
            QuestCommand::Next => questlog.move_cursor(1),
            QuestCommand::Previous => questlog.move_cursor(-1),
            QuestCommand::Select => {
                if self.quests_open && questlog.select() {
                    audio.notify(AudioCue::MenuChanged);
                }
            }
            QuestCommand::Back => {
                if questlog.cancel() {
                    audio.notify(AudioCue::MenuChanged);
                } else if self.quests_open {
                    self.quests_open = false;
                    audio.notify(AudioCue::MenuClosed);
                }
            }
        }
    }

    fn save(&self, game_state: &mut GameState) {
        let Some(path) = &self.save_path else {
            game_state.say("No save file was given.", MessageImportance::Warning);
            return;
        };
        match game_state.save_to_file(path) {
            Ok(()) => game_state.say(format!("Saved to {}.", path.display()), MessageImportance::Info),
            Err(err) => {
                warn!("Saving to {} failed: {err}", path.display());
                game_state.say(format!("Could not save: {err}"), MessageImportance::Warning);
            }
        }
    }

    /// Panel to draw this frame: a pending one-shot panel wins over the quest
    /// menu.
    fn take_panel(&mut self, game_state: &GameState) -> Option<PanelView> {
        if let Some(panel) = self.pending_panel.take() {
            return Some(panel);
        }
        self.quests_open.then(|| quest_panel(game_state))
    }
}

/// Runs one frame: poll input, apply it, render.
pub fn run_frame(
    game_state: &mut GameState,
    session: &mut Session,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
    audio: &mut dyn AudioController,
) -> BurrowResult<FrameStatus> {
    let mut status = FrameStatus::Continue;

    match input.poll() {
        None => status = FrameStatus::Idle,
        Some(PlayerInput::Quit) => status = FrameStatus::Quit,
        Some(PlayerInput::Help) => {
            session.pending_panel = Some(PanelView {
                title: "Commands".to_string(),
                lines: help_lines(),
            });
        }
        Some(PlayerInput::ShowInventory) => {
            session.pending_panel = Some(inventory_panel(game_state));
        }
        Some(PlayerInput::Quests(command)) => session.quest_command(game_state, command, audio),
        Some(PlayerInput::Save) => session.save(game_state),
        Some(player_input) => match session.handler.input_to_intent(&player_input, game_state) {
            Ok(Some(intent)) => {
                for event in game_state.tick(intent)? {
                    if let Some(cue) = AudioCue::from_event(&event) {
                        audio.notify(cue);
                    }
                }
            }
            Ok(None) => {}
            Err(err) if err.is_recoverable() => game_state.say(err.to_string(), MessageImportance::Warning),
            Err(err) => return Err(err),
        },
    }

    if status == FrameStatus::Quit {
        return Ok(status);
    }
    let messages = game_state.drain_messages();
    let panel = session.take_panel(game_state);
    let frame = FrameView::capture(game_state, messages, panel)?;
    renderer.render(&frame)?;
    Ok(status)
}

fn inventory_panel(game_state: &GameState) -> PanelView {
    let lines = match game_state.player() {
        Some(player) if !player.inventory.is_empty() => player
            .inventory
            .listing()
            .into_iter()
            .filter_map(|id| {
                let item = game_state.items.get(&id)?;
                let letter = player.inventory.letter_of(id)?;
                let suffix = if item.equipped {
                    format!(" (equipped, {})", item.slot.map(|slot| slot.to_string()).unwrap_or_default())
                } else {
                    String::new()
                };
                Some(format!("{letter}) {}{suffix}", item.name))
            })
            .collect(),
        _ => vec!["You carry nothing.".to_string()],
    };
    PanelView {
        title: "Inventory".to_string(),
        lines,
    }
}

fn quest_panel(game_state: &GameState) -> PanelView {
    let questlog = &game_state.questlog;
    match questlog.menu {
        QuestMenu::List { cursor } => PanelView {
            title: "Quests".to_string(),
            lines: questlog
                .quests
                .iter()
                .enumerate()
                .map(|(index, quest)| {
                    let pointer = if index == cursor { '>' } else { ' ' };
                    let done = if quest.completed { " (done)" } else { "" };
                    format!("{pointer} {}{done}", quest.name)
                })
                .collect(),
        },
        QuestMenu::Detail { quest } => match questlog.get(quest) {
            Some(quest) => {
                let mut lines = quest.notes.clone();
                lines.extend(quest.tasks.iter().map(|task| {
                    let mark = if task.done { 'x' } else { ' ' };
                    format!("[{mark}] {}", task.text)
                }));
                PanelView {
                    title: quest.name.clone(),
                    lines,
                }
            }
            None => PanelView {
                title: "Quests".to_string(),
                lines: Vec::new(),
            },
        },
    }
}

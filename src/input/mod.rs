//! # Input Module
//!
//! Input handling and command parsing for player interactions.
//!
//! Raw input arrives as [`PlayerInput`], which still names carried items by
//! their inventory letter. [`InputHandler::input_to_intent`] resolves those
//! letters against the player's inventory and produces the [`Intent`] the
//! game state consumes. Inputs that only concern the shell (help, menus,
//! saving) have no intent.

pub mod commands;

pub use commands::*;

use crate::game::{Direction, GameState, Intent, ItemId, Position};
use crate::{BurrowError, BurrowResult};

/// Input handler for processing player commands.
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.parse("wait").unwrap(), Some(PlayerInput::Wait));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Parses one line of typed input.
    pub fn parse(&self, line: &str) -> BurrowResult<Option<PlayerInput>> {
        parse_command(line, self.vi_keys_enabled)
    }

    /// Converts player input to the intent it stands for.
    ///
    /// Returns `Ok(None)` for shell-only input. Fails when a letter does not
    /// name a carried item.
    pub fn input_to_intent(
        &self,
        input: &PlayerInput,
        game_state: &GameState,
    ) -> BurrowResult<Option<Intent>> {
        let intent = match *input {
            PlayerInput::Move(direction) => Intent::Move(direction),
            PlayerInput::Wait => Intent::Wait,
            PlayerInput::PickUp => Intent::PickUp,
            PlayerInput::Drop(letter) => Intent::Drop(self.item_by_letter(game_state, letter)?),
            PlayerInput::Use { letter, target } => Intent::Use {
                item: self.item_by_letter(game_state, letter)?,
                target,
            },
            PlayerInput::Equip(letter) => Intent::Equip(self.item_by_letter(game_state, letter)?),
            PlayerInput::Dequip(letter) => Intent::Dequip(self.item_by_letter(game_state, letter)?),
            PlayerInput::Cast { target } => Intent::Cast { target },
            PlayerInput::Descend => Intent::AdvanceFloor,
            PlayerInput::ReturnHome => Intent::ReturnHome,
            PlayerInput::ShowInventory
            | PlayerInput::Quests(_)
            | PlayerInput::Save
            | PlayerInput::Help
            | PlayerInput::Quit => return Ok(None),
        };
        Ok(Some(intent))
    }

    fn item_by_letter(&self, game_state: &GameState, letter: char) -> BurrowResult<ItemId> {
        let player = game_state
            .player()
            .ok_or_else(|| BurrowError::InvalidState("No player found".to_string()))?;
        player
            .inventory
            .by_letter(letter)
            .ok_or_else(|| BurrowError::InvalidAction(format!("You carry nothing under '{letter}'")))
    }
}

/// Quest log navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestCommand {
    Open,
    Next,
    Previous,
    Select,
    /// Detail back to list, or close the list
    Back,
}

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Turn or move in a direction
    Move(Direction),
    /// Wait/rest for one turn
    Wait,
    /// Pick up item at current position
    PickUp,
    Drop(char),
    Use {
        letter: char,
        target: Option<Position>,
    },
    Equip(char),
    Dequip(char),
    Cast {
        target: Option<Position>,
    },
    /// Take the stairs or door underfoot
    Descend,
    ReturnHome,
    /// Show inventory
    ShowInventory,
    Quests(QuestCommand),
    Save,
    /// Show help information
    Help,
    /// Quit the game
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, ItemArchetype};

    #[test]
    fn test_movement_becomes_intent() {
        let game_state = GameState::with_config(GameConfig::for_testing(), 5).unwrap();
        let handler = InputHandler::new();
        let intent = handler
            .input_to_intent(&PlayerInput::Move(Direction::West), &game_state)
            .unwrap();
        assert_eq!(intent, Some(Intent::Move(Direction::West)));
        assert_eq!(
            handler.input_to_intent(&PlayerInput::Descend, &game_state).unwrap(),
            Some(Intent::AdvanceFloor)
        );
    }

    #[test]
    fn test_shell_inputs_have_no_intent() {
        let game_state = GameState::with_config(GameConfig::for_testing(), 5).unwrap();
        let handler = InputHandler::new();
        for input in [
            PlayerInput::Help,
            PlayerInput::Save,
            PlayerInput::Quit,
            PlayerInput::ShowInventory,
            PlayerInput::Quests(QuestCommand::Open),
        ] {
            assert_eq!(handler.input_to_intent(&input, &game_state).unwrap(), None);
        }
    }

    #[test]
    fn test_letters_resolve_against_inventory() {
        let mut game_state = GameState::with_config(GameConfig::for_testing(), 5).unwrap();
        let handler = InputHandler::new();
        assert!(handler
            .input_to_intent(&PlayerInput::Drop('a'), &game_state)
            .is_err());

        let potion = game_state
            .items
            .values()
            .find(|item| item.archetype == ItemArchetype::HealingPotion)
            .map(|item| item.id)
            .unwrap();
        let player = game_state.player_id;
        game_state
            .entity_mut(player)
            .unwrap()
            .inventory
            .insert(crate::ItemCategory::Potion, potion)
            .unwrap();

        let intent = handler
            .input_to_intent(&PlayerInput::Use { letter: 'a', target: None }, &game_state)
            .unwrap();
        assert_eq!(intent, Some(Intent::Use { item: potion, target: None }));
    }
}

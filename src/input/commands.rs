//! # Command Definitions
//!
//! Line command parsing for the terminal shell. One line is one command: a
//! keyword followed by its arguments, separated by whitespace.

use super::{PlayerInput, QuestCommand};
use crate::game::{Direction, Position};
use crate::{BurrowError, BurrowResult};

/// A command keyword with its aliases and help text.
pub struct Command {
    pub names: &'static [&'static str],
    pub usage: &'static str,
    pub help: &'static str,
}

/// Every command the shell understands, in help order.
pub const COMMANDS: &[Command] = &[
    Command { names: &["w", "north", "up"], usage: "w", help: "Turn or move north" },
    Command { names: &["s", "south", "down"], usage: "s", help: "Turn or move south" },
    Command { names: &["a", "west", "left"], usage: "a", help: "Turn or move west" },
    Command { names: &["d", "east", "right"], usage: "d", help: "Turn or move east" },
    Command { names: &[".", "wait"], usage: ".", help: "Wait one turn" },
    Command { names: &["g", ",", "pickup"], usage: "g", help: "Pick up the item underfoot" },
    Command { names: &["drop"], usage: "drop <letter>", help: "Drop a carried item" },
    Command { names: &["use", "u"], usage: "use <letter> [x y]", help: "Use a carried item" },
    Command { names: &["equip", "e"], usage: "equip <letter>", help: "Equip a carried item" },
    Command { names: &["dequip", "r"], usage: "dequip <letter>", help: "Take off an equipped item" },
    Command { names: &["cast", "z"], usage: "cast [x y]", help: "Cast the scroll in the spell slot" },
    Command { names: &[">", "descend"], usage: ">", help: "Take the stairs or door underfoot" },
    Command { names: &["home"], usage: "home", help: "Return to the home" },
    Command { names: &["i", "inventory"], usage: "i", help: "List carried items" },
    Command { names: &["q", "quests"], usage: "q", help: "Open the quest log" },
    Command { names: &["next"], usage: "next", help: "Quest log: cursor down" },
    Command { names: &["prev"], usage: "prev", help: "Quest log: cursor up" },
    Command { names: &["select"], usage: "select", help: "Quest log: open the quest under the cursor" },
    Command { names: &["back"], usage: "back", help: "Quest log: back to the list, or close it" },
    Command { names: &["save"], usage: "save", help: "Write the game to the save file" },
    Command { names: &["?", "help"], usage: "?", help: "Show this help" },
    Command { names: &["quit", "exit"], usage: "quit", help: "Leave the game" },
];

/// Help lines for every command.
pub fn help_lines() -> Vec<String> {
    COMMANDS
        .iter()
        .map(|command| format!("{:<20} {}", command.usage, command.help))
        .collect()
}

/// Parses one input line. Blank lines parse to `None`.
///
/// With `vi_keys` the letters `h`, `j`, `k` and `l` also move.
///
/// # Examples
///
/// ```
/// use burrow::{parse_command, Direction, PlayerInput};
///
/// assert_eq!(parse_command("w", false).unwrap(), Some(PlayerInput::Move(Direction::North)));
/// assert_eq!(parse_command("drop c", false).unwrap(), Some(PlayerInput::Drop('c')));
/// assert_eq!(parse_command("   ", false).unwrap(), None);
/// ```
pub fn parse_command(line: &str, vi_keys: bool) -> BurrowResult<Option<PlayerInput>> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let keyword = keyword.to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    if vi_keys {
        let direction = match keyword.as_str() {
            "h" => Some(Direction::West),
            "j" => Some(Direction::South),
            "k" => Some(Direction::North),
            "l" => Some(Direction::East),
            _ => None,
        };
        if let Some(direction) = direction {
            return Ok(Some(PlayerInput::Move(direction)));
        }
    }

    let input = match keyword.as_str() {
        "w" | "north" | "up" => PlayerInput::Move(Direction::North),
        "s" | "south" | "down" => PlayerInput::Move(Direction::South),
        "a" | "west" | "left" => PlayerInput::Move(Direction::West),
        "d" | "east" | "right" => PlayerInput::Move(Direction::East),
        "." | "wait" => PlayerInput::Wait,
        "g" | "," | "pickup" => PlayerInput::PickUp,
        "drop" => PlayerInput::Drop(letter_arg(&keyword, &args)?),
        "use" | "u" => PlayerInput::Use {
            letter: letter_arg(&keyword, &args)?,
            target: target_arg(args.get(1..).unwrap_or(&[]))?,
        },
        "equip" | "e" => PlayerInput::Equip(letter_arg(&keyword, &args)?),
        "dequip" | "r" => PlayerInput::Dequip(letter_arg(&keyword, &args)?),
        "cast" | "z" => PlayerInput::Cast {
            target: target_arg(&args)?,
        },
        ">" | "descend" => PlayerInput::Descend,
        "home" => PlayerInput::ReturnHome,
        "i" | "inventory" => PlayerInput::ShowInventory,
        "q" | "quests" => PlayerInput::Quests(QuestCommand::Open),
        "next" => PlayerInput::Quests(QuestCommand::Next),
        "prev" => PlayerInput::Quests(QuestCommand::Previous),
        "select" => PlayerInput::Quests(QuestCommand::Select),
        "back" => PlayerInput::Quests(QuestCommand::Back),
        "save" => PlayerInput::Save,
        "?" | "help" => PlayerInput::Help,
        "quit" | "exit" => PlayerInput::Quit,
        _ => {
            return Err(BurrowError::InvalidAction(format!(
                "Unknown command '{keyword}' (try '?')"
            )))
        }
    };
    Ok(Some(input))
}

/// First argument as an inventory letter.
fn letter_arg(keyword: &str, args: &[&str]) -> BurrowResult<char> {
    let mut chars = args.first().map(|arg| arg.chars()).into_iter().flatten();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok(letter.to_ascii_lowercase()),
        _ => Err(BurrowError::InvalidAction(format!(
            "'{keyword}' needs an inventory letter"
        ))),
    }
}

/// Optional `x y` target tile. Absent means no target.
fn target_arg(args: &[&str]) -> BurrowResult<Option<Position>> {
    match args {
        [] => Ok(None),
        [x, y] => {
            let parse = |value: &str| {
                value
                    .parse::<i32>()
                    .map_err(|_| BurrowError::InvalidAction(format!("'{value}' is not a coordinate")))
            };
            Ok(Some(Position::new(parse(x)?, parse(y)?)))
        }
        _ => Err(BurrowError::InvalidAction(
            "A target needs two coordinates: x y".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_aliases() {
        assert_eq!(parse_command("north", false).unwrap(), Some(PlayerInput::Move(Direction::North)));
        assert_eq!(parse_command("D", false).unwrap(), Some(PlayerInput::Move(Direction::East)));
        assert_eq!(parse_command("k", true).unwrap(), Some(PlayerInput::Move(Direction::North)));
        assert!(parse_command("k", false).is_err());
    }

    #[test]
    fn test_item_commands() {
        assert_eq!(parse_command("equip B", false).unwrap(), Some(PlayerInput::Equip('b')));
        assert_eq!(
            parse_command("use a", false).unwrap(),
            Some(PlayerInput::Use { letter: 'a', target: None })
        );
        assert_eq!(
            parse_command("use c 12 -3", false).unwrap(),
            Some(PlayerInput::Use {
                letter: 'c',
                target: Some(Position::new(12, -3))
            })
        );
        assert!(parse_command("drop", false).is_err());
        assert!(parse_command("drop ab", false).is_err());
        assert!(parse_command("drop 1", false).is_err());
    }

    #[test]
    fn test_cast_targets() {
        assert_eq!(parse_command("z", false).unwrap(), Some(PlayerInput::Cast { target: None }));
        assert_eq!(
            parse_command("cast 4 5", false).unwrap(),
            Some(PlayerInput::Cast {
                target: Some(Position::new(4, 5))
            })
        );
        assert!(parse_command("cast 4", false).is_err());
        assert!(parse_command("cast x y", false).is_err());
    }

    #[test]
    fn test_quest_menu_commands() {
        assert_eq!(parse_command("q", false).unwrap(), Some(PlayerInput::Quests(QuestCommand::Open)));
        assert_eq!(parse_command("select", false).unwrap(), Some(PlayerInput::Quests(QuestCommand::Select)));
        assert_eq!(parse_command("back", false).unwrap(), Some(PlayerInput::Quests(QuestCommand::Back)));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("fly", false).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("fly"));
    }

    #[test]
    fn test_help_covers_every_command() {
        assert_eq!(help_lines().len(), COMMANDS.len());
        for command in COMMANDS {
            let first = command.names[0];
            assert!(parse_command(first, false).is_ok() || command.usage.contains('<'), "{first}");
        }
    }
}

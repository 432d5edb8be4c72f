//! # Quests
//!
//! A flat questlog addressed by explicit `(QuestId, TaskId)` pairs, plus the
//! two-state menu used to browse it.

use crate::{BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u32);

/// Ids of the quests every new game starts with.
pub mod known {
    use super::{QuestId, TaskId};

    pub const INTO_THE_DEPTHS: QuestId = QuestId(1);
    pub const TAKE_SHOVEL: TaskId = TaskId(1);
    pub const REACH_FLOOR_ONE: TaskId = TaskId(2);
    pub const REACH_FLOOR_THREE: TaskId = TaskId(3);

    pub const GARDEN_CHORES: QuestId = QuestId(2);
    pub const TALK_TO_GARDENER: TaskId = TaskId(1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestCategory {
    Main,
    Side,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub name: String,
    pub category: QuestCategory,
    pub notes: Vec<String>,
    pub tasks: Vec<Task>,
    pub completed: bool,
}

impl Quest {
    pub fn new(id: QuestId, name: impl Into<String>, category: QuestCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            notes: Vec::new(),
            tasks: Vec::new(),
            completed: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_task(mut self, id: TaskId, text: impl Into<String>) -> Self {
        self.tasks.push(Task {
            id,
            text: text.into(),
            done: false,
        });
        self
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Browsing state of the quest menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestMenu {
    List { cursor: usize },
    Detail { quest: QuestId },
}

/// Result of marking a task done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestProgress {
    /// The task was already done
    Unchanged,
    TaskCompleted,
    /// The task was the last open one
    QuestCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questlog {
    pub quests: Vec<Quest>,
    pub menu: QuestMenu,
}

impl Questlog {
    pub fn new() -> Self {
        Self {
            quests: Vec::new(),
            menu: QuestMenu::List { cursor: 0 },
        }
    }

    /// Questlog with the quests a new game starts with.
    pub fn starting() -> Self {
        let mut log = Self::new();
        log.add(
            Quest::new(known::INTO_THE_DEPTHS, "Into the Depths", QuestCategory::Main)
                .with_note("Something rumbles beneath the house.")
                .with_note("The ladder in the cellar leads down into the rock.")
                .with_task(known::TAKE_SHOVEL, "Take the shovel from the hall")
                .with_task(known::REACH_FLOOR_ONE, "Climb down to the first floor")
                .with_task(known::REACH_FLOOR_THREE, "Dig your way to the third floor"),
        );
        log.add(
            Quest::new(known::GARDEN_CHORES, "Garden Chores", QuestCategory::Side)
                .with_note("The gardener might have some advice.")
                .with_task(known::TALK_TO_GARDENER, "Talk to the gardener"),
        );
        log
    }

    /// Adds a quest, replacing any quest with the same id.
    pub fn add(&mut self, quest: Quest) {
        match self.quests.iter_mut().find(|other| other.id == quest.id) {
            Some(existing) => *existing = quest,
            None => self.quests.push(quest),
        }
    }

    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    /// Marks a task done; the quest completes once every task is done.
    pub fn update(&mut self, quest_id: QuestId, task_id: TaskId) -> BurrowResult<QuestProgress> {
        let quest = self
            .quests
            .iter_mut()
            .find(|quest| quest.id == quest_id)
            .ok_or_else(|| BurrowError::InvalidAction(format!("unknown quest {}", quest_id.0)))?;
        let task = quest
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| {
                BurrowError::InvalidAction(format!(
                    "quest {} has no task {}",
                    quest_id.0, task_id.0
                ))
            })?;

        if task.done {
            return Ok(QuestProgress::Unchanged);
        }
        task.done = true;
        if quest.tasks.iter().all(|task| task.done) {
            quest.completed = true;
            Ok(QuestProgress::QuestCompleted)
        } else {
            Ok(QuestProgress::TaskCompleted)
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|quest| !quest.completed)
    }

    /// Moves the list cursor, clamped to the quest list. No-op in detail view.
    pub fn move_cursor(&mut self, delta: i32) {
        if let QuestMenu::List { cursor } = &mut self.menu {
            let last = self.quests.len().saturating_sub(1) as i32;
            *cursor = (*cursor as i32 + delta).clamp(0, last.max(0)) as usize;
        }
    }

    /// LIST -> DETAIL for the quest under the cursor. Returns false when there
    /// is nothing to open.
    pub fn select(&mut self) -> bool {
        match self.menu {
            QuestMenu::List { cursor } => match self.quests.get(cursor) {
                Some(quest) => {
                    self.menu = QuestMenu::Detail { quest: quest.id };
                    true
                }
                None => false,
            },
            QuestMenu::Detail { .. } => false,
        }
    }

    /// DETAIL -> LIST, keeping the cursor on the quest that was open.
    pub fn cancel(&mut self) -> bool {
        match self.menu {
            QuestMenu::Detail { quest } => {
                let cursor = self
                    .quests
                    .iter()
                    .position(|other| other.id == quest)
                    .unwrap_or(0);
                self.menu = QuestMenu::List { cursor };
                true
            }
            QuestMenu::List { .. } => false,
        }
    }
}

impl Default for Questlog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_questlog() {
        let log = Questlog::starting();
        assert_eq!(log.quests.len(), 2);
        let main = log.get(known::INTO_THE_DEPTHS).unwrap();
        assert_eq!(main.category, QuestCategory::Main);
        assert_eq!(main.tasks.len(), 3);
        assert!(!main.completed);
    }

    #[test]
    fn test_update_completes_quest() {
        let mut log = Questlog::starting();
        assert_eq!(
            log.update(known::GARDEN_CHORES, known::TALK_TO_GARDENER).unwrap(),
            QuestProgress::QuestCompleted
        );
        assert!(log.get(known::GARDEN_CHORES).unwrap().completed);
        assert_eq!(
            log.update(known::GARDEN_CHORES, known::TALK_TO_GARDENER).unwrap(),
            QuestProgress::Unchanged
        );
        assert_eq!(log.active().count(), 1);
    }

    #[test]
    fn test_partial_progress() {
        let mut log = Questlog::starting();
        assert_eq!(
            log.update(known::INTO_THE_DEPTHS, known::TAKE_SHOVEL).unwrap(),
            QuestProgress::TaskCompleted
        );
        let quest = log.get(known::INTO_THE_DEPTHS).unwrap();
        assert!(quest.task(known::TAKE_SHOVEL).unwrap().done);
        assert!(!quest.completed);
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let mut log = Questlog::starting();
        assert!(log.update(QuestId(99), TaskId(1)).is_err());
        assert!(log.update(known::GARDEN_CHORES, TaskId(42)).is_err());
    }

    #[test]
    fn test_menu_state_machine() {
        let mut log = Questlog::starting();
        assert_eq!(log.menu, QuestMenu::List { cursor: 0 });

        // Cancel in list view does nothing
        assert!(!log.cancel());

        log.move_cursor(5);
        assert_eq!(log.menu, QuestMenu::List { cursor: 1 });
        assert!(log.select());
        assert_eq!(
            log.menu,
            QuestMenu::Detail {
                quest: known::GARDEN_CHORES
            }
        );

        // Selecting again in detail view does nothing
        assert!(!log.select());
        log.move_cursor(-1);
        assert!(log.cancel());
        assert_eq!(log.menu, QuestMenu::List { cursor: 1 });

        log.move_cursor(-10);
        assert_eq!(log.menu, QuestMenu::List { cursor: 0 });
    }

    #[test]
    fn test_select_on_empty_log() {
        let mut log = Questlog::new();
        assert!(!log.select());
        log.move_cursor(1);
        assert_eq!(log.menu, QuestMenu::List { cursor: 0 });
    }
}

use opsboard_core::{BoardError, BoardResult};

use crate::activity::{ActivityLog, NewActivity};
use crate::board::Board;
use crate::card::{BoardCard, CardId};
use crate::list::{BoardList, ListId};
use crate::user::UserId;
use crate::BoardId;

pub mod activity_commands;
pub mod board_commands;
pub mod card_commands;
pub mod list_commands;

pub use activity_commands::*;
pub use board_commands::*;
pub use card_commands::*;
pub use list_commands::*;

/// A single state change.
///
/// Implementations validate everything they need before mutating anything,
/// and record exactly one activity when they succeed.
pub trait Command: Send + Sync {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Mutable view over all aggregates, plus the acting user.
pub struct CommandContext<'a> {
    pub actor: Option<UserId>,
    pub boards: &'a mut Vec<Board>,
    pub lists: &'a mut Vec<BoardList>,
    pub cards: &'a mut Vec<BoardCard>,
    pub activities: &'a mut ActivityLog,
}

impl CommandContext<'_> {
    pub fn board(&self, id: BoardId) -> BoardResult<&Board> {
        self.boards
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| BoardError::not_found(format!("Board {}", id)))
    }

    pub fn list(&self, id: ListId) -> BoardResult<&BoardList> {
        self.lists
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| BoardError::not_found(format!("List {}", id)))
    }

    pub fn card(&self, id: CardId) -> BoardResult<&BoardCard> {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| BoardError::not_found(format!("Card {}", id)))
    }

    pub fn card_mut(&mut self, id: CardId) -> BoardResult<&mut BoardCard> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| BoardError::not_found(format!("Card {}", id)))
    }

    pub fn list_mut(&mut self, id: ListId) -> BoardResult<&mut BoardList> {
        self.lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| BoardError::not_found(format!("List {}", id)))
    }

    /// Board owning the list a card sits in.
    pub fn board_of_card(&self, card_id: CardId) -> BoardResult<BoardId> {
        let card = self.card(card_id)?;
        Ok(self.list(card.list_id)?.board_id)
    }

    pub fn record(&mut self, activity: NewActivity) {
        self.activities.append(self.actor, activity);
    }
}

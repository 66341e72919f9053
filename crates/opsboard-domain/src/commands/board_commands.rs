use super::{Command, CommandContext};
use crate::activity::{ActivityAction, NewActivity};
use crate::board::{Board, BoardId, CityId};
use opsboard_core::BoardResult;
use std::collections::HashSet;

pub struct CreateBoard {
    pub board_id: BoardId,
    pub city_id: CityId,
    pub name: String,
    pub description: Option<String>,
}

impl Command for CreateBoard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let board = Board::new(
            self.board_id,
            self.city_id,
            self.name.clone(),
            self.description.clone(),
            context.actor,
        );
        context.boards.push(board);
        context.record(NewActivity::board(
            self.board_id,
            ActivityAction::BoardCreated,
            format!("created board {}", self.name),
        ));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create board: '{}'", self.name)
    }
}

/// Delete a board together with its lists and cards. Activities stay.
pub struct DeleteBoard {
    pub board_id: BoardId,
}

impl Command for DeleteBoard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let name = context.board(self.board_id)?.name.clone();

        let list_ids: HashSet<_> = context
            .lists
            .iter()
            .filter(|l| l.board_id == self.board_id)
            .map(|l| l.id)
            .collect();
        let cards_before = context.cards.len();
        context.cards.retain(|c| !list_ids.contains(&c.list_id));
        let removed_cards = cards_before - context.cards.len();
        context.lists.retain(|l| l.board_id != self.board_id);
        context.boards.retain(|b| b.id != self.board_id);

        context.record(
            NewActivity::board(
                self.board_id,
                ActivityAction::BoardDeleted,
                format!("deleted board {}", name),
            )
            .with_details(serde_json::json!({
                "lists_removed": list_ids.len(),
                "cards_removed": removed_cards,
            })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete board {}", self.board_id)
    }
}

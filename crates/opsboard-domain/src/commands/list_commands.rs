use super::{Command, CommandContext};
use crate::activity::{ActivityAction, NewActivity};
use crate::board::BoardId;
use crate::list::{BoardList, ListId};
use crate::positioning;
use opsboard_core::BoardResult;

/// Append a new list to the end of a board.
pub struct CreateList {
    pub list_id: ListId,
    pub board_id: BoardId,
    pub name: String,
}

impl Command for CreateList {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        context.board(self.board_id)?;
        let position = positioning::next_list_position(context.lists, self.board_id);
        context.lists.push(BoardList::new(
            self.list_id,
            self.board_id,
            self.name.clone(),
            position,
        ));
        context.record(NewActivity::list(
            self.board_id,
            self.list_id,
            ActivityAction::ListCreated,
            format!("added list {}", self.name),
        ));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create list: '{}'", self.name)
    }
}

pub struct RenameList {
    pub list_id: ListId,
    pub name: String,
}

impl Command for RenameList {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let list = context.list_mut(self.list_id)?;
        let old_name = list.name.clone();
        list.rename(self.name.clone());
        let board_id = list.board_id;
        context.record(
            NewActivity::list(
                board_id,
                self.list_id,
                ActivityAction::ListRenamed,
                format!("renamed list {} to {}", old_name, self.name),
            )
            .with_details(serde_json::json!({ "from": old_name, "to": self.name })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Rename list {}", self.list_id)
    }
}

/// Reorder a list within its board.
pub struct MoveList {
    pub list_id: ListId,
    pub index: i64,
}

impl Command for MoveList {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let (board_id, name) = {
            let list = context.list(self.list_id)?;
            (list.board_id, list.name.clone())
        };
        let mut order: Vec<ListId> = positioning::ordered_lists(context.lists, board_id)
            .iter()
            .map(|l| l.id)
            .collect();
        let from_index = order.iter().position(|id| *id == self.list_id).unwrap_or(0);
        order.retain(|id| *id != self.list_id);
        let to_index = positioning::clamp_index(self.index, order.len());
        order.insert(to_index, self.list_id);
        positioning::apply_list_order(context.lists, &order);

        context.record(
            NewActivity::list(
                board_id,
                self.list_id,
                ActivityAction::ListMoved,
                format!("moved list {} to position {}", name, to_index),
            )
            .with_details(serde_json::json!({ "from_index": from_index, "to_index": to_index })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Move list {} to {}", self.list_id, self.index)
    }
}

/// Delete a list and every card in it.
pub struct DeleteList {
    pub list_id: ListId,
}

impl Command for DeleteList {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let (board_id, name) = {
            let list = context.list(self.list_id)?;
            (list.board_id, list.name.clone())
        };
        let cards_before = context.cards.len();
        context.cards.retain(|c| c.list_id != self.list_id);
        let removed_cards = cards_before - context.cards.len();
        context.lists.retain(|l| l.id != self.list_id);
        positioning::compact_board_lists(context.lists, board_id);

        context.record(
            NewActivity::list(
                board_id,
                self.list_id,
                ActivityAction::ListDeleted,
                format!("deleted list {}", name),
            )
            .with_details(serde_json::json!({ "cards_removed": removed_cards })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete list {}", self.list_id)
    }
}

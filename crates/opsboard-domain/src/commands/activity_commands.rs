use super::{Command, CommandContext};
use crate::activity::{ActivityAction, Attachment, NewActivity};
use crate::card::CardId;
use opsboard_core::{BoardError, BoardResult};

/// Append a comment and/or an attachment to a card's activity stream.
pub struct AddComment {
    pub card_id: CardId,
    pub body: Option<String>,
    pub attachment: Option<Attachment>,
}

impl Command for AddComment {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let body = self
            .body
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());
        let board_id = context.board_of_card(self.card_id)?;
        let list_id = context.card(self.card_id)?.list_id;

        let (action, message) = match (body, &self.attachment) {
            (Some(text), _) => (ActivityAction::Comment, text.to_string()),
            (None, Some(file)) => (ActivityAction::Attachment, format!("attached {}", file.name)),
            (None, None) => {
                return Err(BoardError::invalid_field(
                    "comment",
                    "A comment or an attachment is required.",
                ))
            }
        };
        context.record(
            NewActivity::card(board_id, list_id, self.card_id, action, message)
                .with_attachment(self.attachment.clone()),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Comment on card {}", self.card_id)
    }
}

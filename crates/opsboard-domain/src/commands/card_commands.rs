use super::{Command, CommandContext};
use crate::activity::{ActivityAction, NewActivity};
use crate::card::{BoardCard, CardId, PaymentUpdate, UNPLACED_POSITION};
use crate::field_update::FieldUpdate;
use crate::label::CardLabels;
use crate::list::ListId;
use crate::positioning;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use opsboard_core::{BoardError, BoardResult};

/// Create a card in a list. `position` of `None` or the unplaced sentinel
/// appends; anything else is clamped into the list.
pub struct CreateCard {
    pub card_id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i64>,
}

impl Command for CreateCard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let (board_id, list_name) = {
            let list = context.list(self.list_id)?;
            (list.board_id, list.name.clone())
        };

        let mut order = positioning::ordered_card_ids(context.cards, self.list_id);
        let index = match self.position {
            None => order.len(),
            Some(p) if p == UNPLACED_POSITION as i64 => order.len(),
            Some(p) => positioning::clamp_index(p, order.len()),
        };
        order.insert(index, self.card_id);

        let mut card =
            BoardCard::new(self.card_id, self.list_id, self.title.clone(), context.actor);
        card.description = self.description.clone();
        context.cards.push(card);
        positioning::apply_card_order(context.cards, self.list_id, &order);

        context.record(
            NewActivity::card(
                board_id,
                self.list_id,
                self.card_id,
                ActivityAction::CardCreated,
                format!("added card {} to {}", self.title, list_name),
            )
            .with_details(serde_json::json!({ "position": index })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create card: '{}'", self.title)
    }
}

/// Move a card to `index` of `target_list_id`, renumbering both lists.
pub struct MoveCard {
    pub card_id: CardId,
    pub target_list_id: ListId,
    pub index: i64,
}

impl Command for MoveCard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let (target_board, target_name) = {
            let target = context.list(self.target_list_id)?;
            (target.board_id, target.name.clone())
        };
        let source_list_id = context.card(self.card_id)?.list_id;
        let (source_board, source_name) = {
            let source = context.list(source_list_id)?;
            (source.board_id, source.name.clone())
        };
        if source_board != target_board {
            return Err(BoardError::BusinessRule(
                "Cards can only be moved between lists of the same board".to_string(),
            ));
        }

        let plan = positioning::plan_card_move(
            context.cards,
            self.card_id,
            self.target_list_id,
            self.index,
        )?;
        if plan.is_noop() {
            tracing::debug!(card = %self.card_id, "move leaves the card in place");
        }
        positioning::apply_move_plan(context.cards, &plan);

        let title = context.card(self.card_id)?.title.clone();
        context.record(
            NewActivity::card(
                target_board,
                self.target_list_id,
                self.card_id,
                ActivityAction::CardMoved,
                format!("moved card {} from {} to {}", title, source_name, target_name),
            )
            .with_details(serde_json::json!({
                "from_list_id": plan.source_list_id,
                "from_list": source_name,
                "from_position": plan.from_index,
                "to_list_id": plan.target_list_id,
                "to_list": target_name,
                "to_position": plan.to_index,
            })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move card {} to list {} at {}",
            self.card_id, self.target_list_id, self.index
        )
    }
}

/// Shared tail of the simple field updates: look up where the card lives,
/// apply `update`, record one activity.
fn update_card<F>(
    context: &mut CommandContext,
    card_id: CardId,
    action: ActivityAction,
    update: F,
) -> BoardResult<()>
where
    F: FnOnce(&mut BoardCard) -> (String, serde_json::Value),
{
    let board_id = context.board_of_card(card_id)?;
    let card = context.card_mut(card_id)?;
    let list_id = card.list_id;
    let (message, details) = update(card);
    context.record(
        NewActivity::card(board_id, list_id, card_id, action, message).with_details(details),
    );
    Ok(())
}

pub struct UpdateCardText {
    pub card_id: CardId,
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
}

impl Command for UpdateCardText {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let action = match (&self.title, self.description.is_change()) {
            (Some(_), false) => ActivityAction::TitleUpdated,
            _ => ActivityAction::DescriptionUpdated,
        };
        update_card(context, self.card_id, action, |card| {
            let before = serde_json::json!({
                "title": card.title,
                "description": card.description,
            });
            if let Some(title) = &self.title {
                card.update_title(title.clone());
            }
            if self.description.is_change() {
                card.update_description(self.description.clone());
            }
            let after = serde_json::json!({
                "title": card.title,
                "description": card.description,
            });
            let message = match action {
                ActivityAction::TitleUpdated => format!("renamed card to {}", card.title),
                _ => format!("updated the description of {}", card.title),
            };
            (message, serde_json::json!({ "before": before, "after": after }))
        })
    }

    fn description(&self) -> String {
        format!("Update text of card {}", self.card_id)
    }
}

pub struct SetDueDate {
    pub card_id: CardId,
    pub due_date: Option<DateTime<Utc>>,
}

impl Command for SetDueDate {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        update_card(context, self.card_id, ActivityAction::DueDateUpdated, |card| {
            let before = card.due_date;
            card.set_due_date(self.due_date);
            let message = match self.due_date {
                Some(due) => format!(
                    "set due date of {} to {}",
                    card.title,
                    due.format("%Y-%m-%d %H:%M")
                ),
                None => format!("removed the due date of {}", card.title),
            };
            (message, serde_json::json!({ "before": before, "after": self.due_date }))
        })
    }

    fn description(&self) -> String {
        format!("Set due date of card {}", self.card_id)
    }
}

pub struct SetChecked {
    pub card_id: CardId,
    pub checked: bool,
}

impl Command for SetChecked {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        update_card(context, self.card_id, ActivityAction::CheckedUpdated, |card| {
            card.set_checked(self.checked);
            let verb = if self.checked { "checked" } else { "unchecked" };
            (
                format!("{} {}", verb, card.title),
                serde_json::json!({ "checked": self.checked }),
            )
        })
    }

    fn description(&self) -> String {
        format!("Set checked={} on card {}", self.checked, self.card_id)
    }
}

pub struct SetPayment {
    pub card_id: CardId,
    pub update: PaymentUpdate,
}

impl Command for SetPayment {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        if let Some(invoice) = self.update.invoice.as_set() {
            let taken = context
                .cards
                .iter()
                .any(|c| c.id != self.card_id && c.invoice.as_deref() == Some(invoice.as_str()));
            if taken {
                return Err(BoardError::invalid_field(
                    "invoice",
                    "The invoice has already been taken.",
                ));
            }
        }

        update_card(context, self.card_id, ActivityAction::PaymentUpdated, |card| {
            card.apply_payment(self.update.clone());
            (
                format!("updated payment details of {}", card.title),
                serde_json::json!({
                    "payment_done": card.payment_done,
                    "dependant_payment_done": card.dependant_payment_done,
                    "invoice": card.invoice,
                }),
            )
        })
    }

    fn description(&self) -> String {
        format!("Update payment of card {}", self.card_id)
    }
}

pub struct SetAssignees {
    pub card_id: CardId,
    pub assignees: Vec<UserId>,
}

impl Command for SetAssignees {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        update_card(context, self.card_id, ActivityAction::AssigneesUpdated, |card| {
            let before = card.assignees.clone();
            card.set_assignees(self.assignees.clone());
            (
                format!("updated the assignees of {}", card.title),
                serde_json::json!({ "before": before, "after": card.assignees }),
            )
        })
    }

    fn description(&self) -> String {
        format!("Assign users to card {}", self.card_id)
    }
}

pub struct SetLabels {
    pub card_id: CardId,
    pub labels: CardLabels,
}

impl Command for SetLabels {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        update_card(context, self.card_id, ActivityAction::LabelsUpdated, |card| {
            let before = card.labels.clone();
            card.set_labels(self.labels.clone());
            let changed = before.changed_families(&card.labels);
            let message = if card.labels.is_empty() {
                format!("cleared the labels of {}", card.title)
            } else {
                format!("updated the labels of {}", card.title)
            };
            (
                message,
                serde_json::json!({ "changed": changed, "labels": card.labels }),
            )
        })
    }

    fn description(&self) -> String {
        format!("Set labels of card {}", self.card_id)
    }
}

pub struct ArchiveCard {
    pub card_id: CardId,
}

impl Command for ArchiveCard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let card = context.card(self.card_id)?;
        if card.archived {
            return Err(BoardError::BusinessRule("Card is already archived".to_string()));
        }
        let list_id = card.list_id;
        let board_id = context.board_of_card(self.card_id)?;

        let card = context.card_mut(self.card_id)?;
        let from_position = card.position;
        card.archive();
        let title = card.title.clone();
        positioning::compact_list_positions(context.cards, list_id);

        context.record(
            NewActivity::card(
                board_id,
                list_id,
                self.card_id,
                ActivityAction::CardArchived,
                format!("archived {}", title),
            )
            .with_details(serde_json::json!({ "from_position": from_position })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Archive card {}", self.card_id)
    }
}

/// Bring an archived card back at the end of its list.
pub struct RestoreCard {
    pub card_id: CardId,
}

impl Command for RestoreCard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let card = context.card(self.card_id)?;
        if !card.archived {
            return Err(BoardError::BusinessRule("Card is not archived".to_string()));
        }
        let list_id = card.list_id;
        let board_id = context.board_of_card(self.card_id)?;
        let position = positioning::next_position_in_list(context.cards, list_id);

        let card = context.card_mut(self.card_id)?;
        card.restore(position);
        let title = card.title.clone();

        context.record(
            NewActivity::card(
                board_id,
                list_id,
                self.card_id,
                ActivityAction::CardRestored,
                format!("restored {}", title),
            )
            .with_details(serde_json::json!({ "position": position })),
        );
        Ok(())
    }

    fn description(&self) -> String {
        format!("Restore card {}", self.card_id)
    }
}

pub struct DeleteCard {
    pub card_id: CardId,
}

impl Command for DeleteCard {
    fn execute(&self, context: &mut CommandContext) -> BoardResult<()> {
        let board_id = context.board_of_card(self.card_id)?;
        let card = context.card(self.card_id)?;
        let (list_id, title) = (card.list_id, card.title.clone());

        context.cards.retain(|c| c.id != self.card_id);
        positioning::compact_list_positions(context.cards, list_id);

        context.record(NewActivity::card(
            board_id,
            list_id,
            self.card_id,
            ActivityAction::CardDeleted,
            format!("deleted {}", title),
        ));
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete card {}", self.card_id)
    }
}

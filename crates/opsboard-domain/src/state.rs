//! The complete in-memory state and the operations implemented over it.
//!
//! `BoardState` is also the persisted shape: stores serialize it whole.

use chrono::{DateTime, Utc};
use opsboard_core::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use uuid::Uuid;

use crate::access;
use crate::activity::{Activity, ActivityId, ActivityLog, Attachment, FeedQuery};
use crate::board::{Board, BoardId, CityId};
use crate::card::{BoardCard, CardId, PaymentUpdate};
use crate::commands::*;
use crate::field_update::FieldUpdate;
use crate::label::CardLabels;
use crate::list::{BoardList, ListId};
use crate::operations::{BoardDetail, BoardOperations, ListWithCards, MoveOutcome, NewCard};
use crate::positioning;
use crate::user::{User, UserId};

const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub lists: Vec<BoardList>,
    #[serde(default)]
    pub cards: Vec<BoardCard>,
    #[serde(default)]
    pub activities: ActivityLog,
    #[serde(default)]
    pub users: Vec<User>,
}

fn require_name(field: &str, value: &str) -> BoardResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::invalid_field(
            field,
            format!("The {} field is required.", field),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(BoardError::invalid_field(
            field,
            format!("The {} may not be greater than {} characters.", field, MAX_NAME_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_attachment(attachment: &Attachment) -> BoardResult<()> {
    if attachment.name.trim().is_empty() {
        return Err(BoardError::invalid_field(
            "attachment.name",
            "The attachment name is required.",
        ));
    }
    let path = Path::new(&attachment.path);
    let relative_and_plain = !attachment.path.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !relative_and_plain {
        return Err(BoardError::invalid_field(
            "attachment.path",
            "The attachment path must be relative to the attachment store.",
        ));
    }
    Ok(())
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one command against the state on behalf of `actor`.
    pub fn execute(&mut self, actor: Option<UserId>, command: &dyn Command) -> BoardResult<()> {
        tracing::debug!(command = %command.description(), "executing");
        let mut ctx = CommandContext {
            actor,
            boards: &mut self.boards,
            lists: &mut self.lists,
            cards: &mut self.cards,
            activities: &mut self.activities,
        };
        command.execute(&mut ctx)
    }

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

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn board_of_list(&self, list_id: ListId) -> BoardResult<&Board> {
        let list = self.list(list_id)?;
        self.board(list.board_id)
    }

    pub fn board_of_card(&self, card_id: CardId) -> BoardResult<&Board> {
        let card = self.card(card_id)?;
        self.board_of_list(card.list_id)
    }

    pub fn lists_of_board(&self, board_id: BoardId) -> Vec<&BoardList> {
        positioning::ordered_lists(&self.lists, board_id)
    }

    pub fn cards_of_list(&self, list_id: ListId) -> Vec<&BoardCard> {
        positioning::ordered_cards(&self.cards, list_id)
    }

    /// Register a user. Emails are unique, case-insensitively.
    pub fn add_user(&mut self, user: User) -> BoardResult<User> {
        let email = user.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(BoardError::invalid_field("email", "The email field is required."));
        }
        if self.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(BoardError::invalid_field(
                "email",
                "The email has already been taken.",
            ));
        }
        let user = User { email, ..user };
        self.users.push(user.clone());
        Ok(user)
    }

    fn card_in_scope(&self, actor: &User, card_id: CardId) -> BoardResult<&BoardCard> {
        let board = self.board_of_card(card_id)?;
        access::ensure_board_access(actor, board)?;
        self.card(card_id)
    }

    fn list_in_scope(&self, actor: &User, list_id: ListId) -> BoardResult<&BoardList> {
        let board = self.board_of_list(list_id)?;
        access::ensure_board_access(actor, board)?;
        self.list(list_id)
    }

    /// Activities outlive their board; once it is gone only admins see them.
    fn ensure_feed_access(&self, actor: &User, board_id: BoardId) -> BoardResult<()> {
        match self.boards.iter().find(|b| b.id == board_id) {
            Some(board) => access::ensure_board_access(actor, board),
            None if actor.is_admin() => Ok(()),
            None => Err(BoardError::not_found(format!("Board {}", board_id))),
        }
    }

    fn run_card_command(
        &mut self,
        actor: &User,
        card_id: CardId,
        command: &dyn Command,
    ) -> BoardResult<BoardCard> {
        self.card_in_scope(actor, card_id)?;
        self.execute(Some(actor.id), command)?;
        self.card(card_id).cloned()
    }

    fn last_activity(&self) -> BoardResult<Activity> {
        self.activities
            .last()
            .cloned()
            .ok_or_else(|| BoardError::Internal("activity was not recorded".to_string()))
    }
}

impl BoardOperations for BoardState {
    fn create_board(
        &mut self,
        actor: &User,
        city_id: CityId,
        name: String,
        description: Option<String>,
    ) -> BoardResult<Board> {
        access::ensure_can_manage_boards(actor)?;
        let name = require_name("name", &name)?;
        let board_id = Uuid::new_v4();
        self.execute(
            Some(actor.id),
            &CreateBoard {
                board_id,
                city_id,
                name,
                description,
            },
        )?;
        self.board(board_id).cloned()
    }

    fn list_boards(&self, actor: &User) -> BoardResult<Vec<Board>> {
        let mut boards: Vec<Board> = self
            .boards
            .iter()
            .filter(|b| access::can_view_board(actor, b))
            .cloned()
            .collect();
        boards.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(boards)
    }

    fn board_detail(&self, actor: &User, id: BoardId) -> BoardResult<BoardDetail> {
        let board = self.board(id)?;
        access::ensure_board_access(actor, board)?;
        let lists = self
            .lists_of_board(id)
            .into_iter()
            .map(|list| ListWithCards {
                list: list.clone(),
                cards: self.cards_of_list(list.id).into_iter().cloned().collect(),
            })
            .collect();
        Ok(BoardDetail {
            board: board.clone(),
            lists,
        })
    }

    fn delete_board(&mut self, actor: &User, id: BoardId) -> BoardResult<()> {
        access::ensure_can_manage_boards(actor)?;
        let board = self.board(id)?;
        access::ensure_board_access(actor, board)?;
        self.execute(Some(actor.id), &DeleteBoard { board_id: id })
    }

    fn create_list(
        &mut self,
        actor: &User,
        board_id: BoardId,
        name: String,
    ) -> BoardResult<BoardList> {
        let board = self.board(board_id)?;
        access::ensure_board_access(actor, board)?;
        let name = require_name("name", &name)?;
        let list_id = Uuid::new_v4();
        self.execute(
            Some(actor.id),
            &CreateList {
                list_id,
                board_id,
                name,
            },
        )?;
        self.list(list_id).cloned()
    }

    fn rename_list(&mut self, actor: &User, id: ListId, name: String) -> BoardResult<BoardList> {
        self.list_in_scope(actor, id)?;
        let name = require_name("name", &name)?;
        self.execute(Some(actor.id), &RenameList { list_id: id, name })?;
        self.list(id).cloned()
    }

    fn move_list(&mut self, actor: &User, id: ListId, index: i64) -> BoardResult<Vec<BoardList>> {
        let board_id = self.list_in_scope(actor, id)?.board_id;
        self.execute(Some(actor.id), &MoveList { list_id: id, index })?;
        Ok(self.lists_of_board(board_id).into_iter().cloned().collect())
    }

    fn delete_list(&mut self, actor: &User, id: ListId) -> BoardResult<()> {
        self.list_in_scope(actor, id)?;
        self.execute(Some(actor.id), &DeleteList { list_id: id })
    }

    fn create_card(
        &mut self,
        actor: &User,
        list_id: ListId,
        card: NewCard,
    ) -> BoardResult<BoardCard> {
        self.list_in_scope(actor, list_id)?;
        let title = require_name("title", &card.title)?;
        let card_id = Uuid::new_v4();
        self.execute(
            Some(actor.id),
            &CreateCard {
                card_id,
                list_id,
                title,
                description: card.description,
                position: card.position,
            },
        )?;
        self.card(card_id).cloned()
    }

    fn get_card(&self, actor: &User, id: CardId) -> BoardResult<BoardCard> {
        self.card_in_scope(actor, id).cloned()
    }

    fn move_card(
        &mut self,
        actor: &User,
        id: CardId,
        target_list_id: ListId,
        index: i64,
    ) -> BoardResult<MoveOutcome> {
        self.list_in_scope(actor, target_list_id)?;
        self.card_in_scope(actor, id)?;
        self.execute(
            Some(actor.id),
            &MoveCard {
                card_id: id,
                target_list_id,
                index,
            },
        )?;
        Ok(MoveOutcome {
            card: self.card(id)?.clone(),
            activity: self.last_activity()?,
        })
    }

    fn update_card_text(
        &mut self,
        actor: &User,
        id: CardId,
        title: Option<String>,
        description: FieldUpdate<String>,
    ) -> BoardResult<BoardCard> {
        let title = title.map(|t| require_name("title", &t)).transpose()?;
        if title.is_none() && !description.is_change() {
            return Err(BoardError::invalid_field(
                "description",
                "Nothing to update: provide a title or a description.",
            ));
        }
        self.run_card_command(
            actor,
            id,
            &UpdateCardText {
                card_id: id,
                title,
                description,
            },
        )
    }

    fn set_due_date(
        &mut self,
        actor: &User,
        id: CardId,
        due_date: Option<DateTime<Utc>>,
    ) -> BoardResult<BoardCard> {
        self.run_card_command(actor, id, &SetDueDate { card_id: id, due_date })
    }

    fn set_checked(&mut self, actor: &User, id: CardId, checked: bool) -> BoardResult<BoardCard> {
        self.run_card_command(actor, id, &SetChecked { card_id: id, checked })
    }

    fn set_payment(
        &mut self,
        actor: &User,
        id: CardId,
        mut update: PaymentUpdate,
    ) -> BoardResult<BoardCard> {
        if update.is_empty() {
            return Err(BoardError::invalid_field(
                "payment_done",
                "Nothing to update: provide at least one payment field.",
            ));
        }
        if let Some(invoice) = update.invoice.as_set().map(|i| i.trim().to_string()) {
            update.invoice = if invoice.is_empty() {
                FieldUpdate::Clear
            } else {
                FieldUpdate::Set(invoice)
            };
        }
        self.run_card_command(actor, id, &SetPayment { card_id: id, update })
    }

    fn set_assignees(
        &mut self,
        actor: &User,
        id: CardId,
        assignees: Vec<UserId>,
    ) -> BoardResult<BoardCard> {
        if let Some(unknown) = assignees.iter().find(|uid| self.user(**uid).is_none()) {
            return Err(BoardError::invalid_field(
                "assignees",
                format!("User {} does not exist.", unknown),
            ));
        }
        self.run_card_command(actor, id, &SetAssignees { card_id: id, assignees })
    }

    fn set_labels(
        &mut self,
        actor: &User,
        id: CardId,
        labels: CardLabels,
    ) -> BoardResult<BoardCard> {
        self.run_card_command(actor, id, &SetLabels { card_id: id, labels })
    }

    fn set_archived(
        &mut self,
        actor: &User,
        id: CardId,
        archived: bool,
    ) -> BoardResult<BoardCard> {
        if archived {
            self.run_card_command(actor, id, &ArchiveCard { card_id: id })
        } else {
            self.run_card_command(actor, id, &RestoreCard { card_id: id })
        }
    }

    fn delete_card(&mut self, actor: &User, id: CardId) -> BoardResult<()> {
        self.card_in_scope(actor, id)?;
        self.execute(Some(actor.id), &DeleteCard { card_id: id })
    }

    fn add_comment(
        &mut self,
        actor: &User,
        card_id: CardId,
        body: Option<String>,
        attachment: Option<Attachment>,
    ) -> BoardResult<Activity> {
        self.card_in_scope(actor, card_id)?;
        if let Some(file) = &attachment {
            validate_attachment(file)?;
        }
        self.execute(
            Some(actor.id),
            &AddComment {
                card_id,
                body,
                attachment,
            },
        )?;
        self.last_activity()
    }

    fn card_activities(
        &self,
        actor: &User,
        card_id: CardId,
        query: FeedQuery,
    ) -> BoardResult<Vec<Activity>> {
        self.card_in_scope(actor, card_id)?;
        Ok(self
            .activities
            .for_card(card_id, query)
            .into_iter()
            .cloned()
            .collect())
    }

    fn board_activities(
        &self,
        actor: &User,
        board_id: BoardId,
        query: FeedQuery,
    ) -> BoardResult<Vec<Activity>> {
        self.ensure_feed_access(actor, board_id)?;
        Ok(self
            .activities
            .for_board(board_id, query)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get_activity(&self, actor: &User, id: ActivityId) -> BoardResult<Activity> {
        let activity = self
            .activities
            .get(id)
            .ok_or_else(|| BoardError::not_found(format!("Activity {}", id)))?;
        self.ensure_feed_access(actor, activity.board_id)?;
        Ok(activity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityAction;
    use crate::user::Role;

    fn seeded() -> (BoardState, User, BoardId, ListId, ListId) {
        let mut state = BoardState::new();
        let admin = state
            .add_user(User::new("Root".into(), "root@example.com".into(), Role::SuperAdmin))
            .unwrap();
        let board = state
            .create_board(&admin, Uuid::new_v4(), "Admissions".into(), None)
            .unwrap();
        let todo = state.create_list(&admin, board.id, "Todo".into()).unwrap();
        let done = state.create_list(&admin, board.id, "Done".into()).unwrap();
        (state, admin, board.id, todo.id, done.id)
    }

    fn new_card(title: &str) -> NewCard {
        NewCard {
            title: title.to_string(),
            description: None,
            position: None,
        }
    }

    #[test]
    fn test_create_card_appends_and_logs() {
        let (mut state, admin, _, todo, _) = seeded();
        let a = state.create_card(&admin, todo, new_card("A")).unwrap();
        let b = state.create_card(&admin, todo, new_card("B")).unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
        assert_eq!(state.activities.last().unwrap().action, ActivityAction::CardCreated);
    }

    #[test]
    fn test_create_card_at_index_shifts_siblings() {
        let (mut state, admin, _, todo, _) = seeded();
        let a = state.create_card(&admin, todo, new_card("A")).unwrap();
        let b = state
            .create_card(
                &admin,
                todo,
                NewCard {
                    position: Some(0),
                    ..new_card("B")
                },
            )
            .unwrap();
        assert_eq!(b.position, 0);
        assert_eq!(state.card(a.id).unwrap().position, 1);
    }

    #[test]
    fn test_blank_title_is_a_validation_error() {
        let (mut state, admin, _, todo, _) = seeded();
        let err = state.create_card(&admin, todo, new_card("   ")).unwrap_err();
        assert!(
            matches!(err, BoardError::Validation { ref fields, .. } if fields.contains_key("title"))
        );
    }

    #[test]
    fn test_move_returns_the_single_move_activity() {
        let (mut state, admin, _, todo, done) = seeded();
        let card = state.create_card(&admin, todo, new_card("Visa file")).unwrap();
        let before = state.activities.len();

        let outcome = state.move_card(&admin, card.id, done, 0).unwrap();
        assert_eq!(state.activities.len(), before + 1);
        assert_eq!(outcome.activity.action, ActivityAction::CardMoved);
        assert_eq!(outcome.activity.message, "moved card Visa file from Todo to Done");
        assert_eq!(outcome.card.list_id, done);
    }

    #[test]
    fn test_move_to_missing_list_changes_nothing() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();
        let before = state.activities.len();

        let err = state.move_card(&admin, card.id, Uuid::new_v4(), 0).unwrap_err();
        assert!(matches!(err, BoardError::NotFound(_)));
        assert_eq!(state.activities.len(), before);
        assert_eq!(state.card(card.id).unwrap().list_id, todo);
    }

    #[test]
    fn test_invoice_must_be_unique() {
        let (mut state, admin, _, todo, _) = seeded();
        let a = state.create_card(&admin, todo, new_card("A")).unwrap();
        let b = state.create_card(&admin, todo, new_card("B")).unwrap();
        let with_invoice = PaymentUpdate {
            invoice: FieldUpdate::Set("INV-7".into()),
            ..Default::default()
        };

        state.set_payment(&admin, a.id, with_invoice.clone()).unwrap();
        let err = state.set_payment(&admin, b.id, with_invoice).unwrap_err();
        let BoardError::Validation { fields, .. } = err else {
            panic!("expected a validation error");
        };
        assert!(fields.contains_key("invoice"));
    }

    #[test]
    fn test_archive_compacts_and_restore_appends() {
        let (mut state, admin, _, todo, _) = seeded();
        let a = state.create_card(&admin, todo, new_card("A")).unwrap();
        let b = state.create_card(&admin, todo, new_card("B")).unwrap();
        let c = state.create_card(&admin, todo, new_card("C")).unwrap();

        state.set_archived(&admin, a.id, true).unwrap();
        assert_eq!(state.card(b.id).unwrap().position, 0);
        assert_eq!(state.card(c.id).unwrap().position, 1);
        assert!(positioning::is_contiguous(&state.cards, todo));

        let restored = state.set_archived(&admin, a.id, false).unwrap();
        assert_eq!(restored.position, 2);
        assert!(matches!(
            state.set_archived(&admin, a.id, false),
            Err(BoardError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_counsellor_cannot_touch_unassigned_board() {
        let (mut state, admin, board_id, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();
        let mut counsellor = state
            .add_user(User::new("C".into(), "c@example.com".into(), Role::Counsellor))
            .unwrap();

        assert!(matches!(
            state.get_card(&counsellor, card.id),
            Err(BoardError::Forbidden { .. })
        ));
        assert!(state.list_boards(&counsellor).unwrap().is_empty());

        counsellor.board_ids.push(board_id);
        assert!(state.get_card(&counsellor, card.id).is_ok());
        assert!(matches!(
            state.delete_board(&counsellor, board_id),
            Err(BoardError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_assignees_must_exist() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();
        let err = state
            .set_assignees(&admin, card.id, vec![Uuid::new_v4()])
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));

        let updated = state.set_assignees(&admin, card.id, vec![admin.id]).unwrap();
        assert_eq!(updated.assignees, vec![admin.id]);
    }

    #[test]
    fn test_attachment_path_must_stay_inside_store() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();
        let sneaky = Attachment {
            path: "../../etc/passwd".into(),
            name: "passwd".into(),
            mime: "text/plain".into(),
            size: 10,
        };
        assert!(state.add_comment(&admin, card.id, None, Some(sneaky)).is_err());

        let fine = Attachment {
            path: "cards/a/passport.pdf".into(),
            name: "passport.pdf".into(),
            mime: "application/pdf".into(),
            size: 2048,
        };
        let activity = state.add_comment(&admin, card.id, None, Some(fine)).unwrap();
        assert_eq!(activity.action, ActivityAction::Attachment);
        assert_eq!(activity.message, "attached passport.pdf");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (mut state, _, _, _, _) = seeded();
        let err = state
            .add_user(User::new("Again".into(), "ROOT@example.com".into(), Role::User))
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
    }

    #[test]
    fn test_feed_of_deleted_board_visible_to_admins_only() {
        let (mut state, admin, board_id, todo, _) = seeded();
        state.create_card(&admin, todo, new_card("A")).unwrap();
        state.delete_board(&admin, board_id).unwrap();

        let feed = state.board_activities(&admin, board_id, FeedQuery::default()).unwrap();
        assert_eq!(feed[0].action, ActivityAction::BoardDeleted);

        let user = User::new("U".into(), "u@example.com".into(), Role::User);
        assert!(matches!(
            state.board_activities(&user, board_id, FeedQuery::default()),
            Err(BoardError::NotFound(_))
        ));
    }

    fn last_action(state: &BoardState) -> ActivityAction {
        state.activities.last().unwrap().action
    }

    #[test]
    fn test_set_labels_replaces_and_collapses_duplicates() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();

        let labelled = state
            .set_labels(
                &admin,
                card.id,
                CardLabels {
                    country_label_ids: vec![3, 3, 1],
                    intake_label_id: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(labelled.labels.country_label_ids, vec![3, 1]);
        assert_eq!(labelled.labels.intake_label_id, Some(7));
        let activity = state.activities.last().unwrap();
        assert_eq!(activity.action, ActivityAction::LabelsUpdated);
        assert_eq!(activity.details["changed"], serde_json::json!(["country", "intake"]));

        let relabelled = state
            .set_labels(
                &admin,
                card.id,
                CardLabels {
                    country_label_ids: vec![1, 3],
                    service_area_label_id: Some(2),
                    intake_label_id: Some(7),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(relabelled.labels.country_label_ids, vec![1, 3]);
        let activity = state.activities.last().unwrap();
        assert_eq!(activity.details["changed"], serde_json::json!(["service_area"]));
        assert_eq!(activity.message, "updated the labels of A");

        let cleared = state
            .set_labels(&admin, card.id, CardLabels::default())
            .unwrap();
        assert!(cleared.labels.is_empty());
        assert_eq!(state.activities.last().unwrap().message, "cleared the labels of A");
    }

    #[test]
    fn test_description_null_clears_and_absent_keeps() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();

        let updated = state
            .update_card_text(&admin, card.id, None, FieldUpdate::Set("Call back".into()))
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Call back"));
        assert_eq!(last_action(&state), ActivityAction::DescriptionUpdated);

        let renamed = state
            .update_card_text(&admin, card.id, Some("B".into()), FieldUpdate::NoChange)
            .unwrap();
        assert_eq!(renamed.title, "B");
        assert_eq!(renamed.description.as_deref(), Some("Call back"));
        assert_eq!(last_action(&state), ActivityAction::TitleUpdated);

        let cleared = state
            .update_card_text(&admin, card.id, None, FieldUpdate::Clear)
            .unwrap();
        assert_eq!(cleared.description, None);

        let before = state.activities.len();
        let err = state
            .update_card_text(&admin, card.id, None, FieldUpdate::NoChange)
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation { .. }));
        assert_eq!(state.activities.len(), before);
    }

    #[test]
    fn test_due_date_set_and_clear() {
        use chrono::TimeZone;

        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("Visa file")).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 11, 2, 9, 30, 0).unwrap();

        let set = state.set_due_date(&admin, card.id, Some(due)).unwrap();
        assert_eq!(set.due_date, Some(due));
        let activity = state.activities.last().unwrap();
        assert_eq!(activity.action, ActivityAction::DueDateUpdated);
        assert_eq!(activity.message, "set due date of Visa file to 2026-11-02 09:30");

        let cleared = state.set_due_date(&admin, card.id, None).unwrap();
        assert_eq!(cleared.due_date, None);
        assert_eq!(
            state.activities.last().unwrap().message,
            "removed the due date of Visa file"
        );
    }

    #[test]
    fn test_checked_is_logged() {
        let (mut state, admin, _, todo, _) = seeded();
        let card = state.create_card(&admin, todo, new_card("A")).unwrap();
        assert!(state.set_checked(&admin, card.id, true).unwrap().checked);
        assert_eq!(state.activities.last().unwrap().message, "checked A");
        assert!(!state.set_checked(&admin, card.id, false).unwrap().checked);
        assert_eq!(last_action(&state), ActivityAction::CheckedUpdated);
    }

    #[test]
    fn test_list_rename_move_and_delete_stay_contiguous() {
        let (mut state, admin, board_id, todo, done) = seeded();
        let review = state.create_list(&admin, board_id, "Review".into()).unwrap();

        let renamed = state.rename_list(&admin, todo, "Leads".into()).unwrap();
        assert_eq!(renamed.name, "Leads");
        assert_eq!(state.activities.last().unwrap().message, "renamed list Todo to Leads");
        assert!(matches!(
            state.rename_list(&admin, todo, "  ".into()),
            Err(BoardError::Validation { .. })
        ));

        let order = state.move_list(&admin, review.id, 0).unwrap();
        let ids: Vec<ListId> = order.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![review.id, todo, done]);
        let positions: Vec<i32> = order.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        state.create_card(&admin, todo, new_card("A")).unwrap();
        state.create_card(&admin, todo, new_card("B")).unwrap();
        let kept = state.create_card(&admin, done, new_card("C")).unwrap();

        state.delete_list(&admin, todo).unwrap();
        assert!(state.cards_of_list(todo).is_empty());
        assert!(state.card(kept.id).is_ok());
        let remaining: Vec<(ListId, i32)> = state
            .lists_of_board(board_id)
            .iter()
            .map(|l| (l.id, l.position))
            .collect();
        assert_eq!(remaining, vec![(review.id, 0), (done, 1)]);
        let activity = state.activities.last().unwrap();
        assert_eq!(activity.action, ActivityAction::ListDeleted);
        assert_eq!(activity.details["cards_removed"], 2);
    }
}

//! Append-only audit trail.
//!
//! Every state change on a board produces one [`Activity`]. The log hands out
//! shared references only: once appended, an entry cannot be edited or
//! removed through this API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::BoardId;
use crate::card::CardId;
use crate::list::ListId;
use crate::user::UserId;

pub type ActivityId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    BoardCreated,
    BoardDeleted,
    ListCreated,
    ListRenamed,
    ListMoved,
    ListDeleted,
    CardCreated,
    CardMoved,
    TitleUpdated,
    DescriptionUpdated,
    DueDateUpdated,
    CheckedUpdated,
    PaymentUpdated,
    AssigneesUpdated,
    LabelsUpdated,
    CardArchived,
    CardRestored,
    CardDeleted,
    Comment,
    Attachment,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoardCreated => "board_created",
            Self::BoardDeleted => "board_deleted",
            Self::ListCreated => "list_created",
            Self::ListRenamed => "list_renamed",
            Self::ListMoved => "list_moved",
            Self::ListDeleted => "list_deleted",
            Self::CardCreated => "card_created",
            Self::CardMoved => "card_moved",
            Self::TitleUpdated => "title_updated",
            Self::DescriptionUpdated => "description_updated",
            Self::DueDateUpdated => "due_date_updated",
            Self::CheckedUpdated => "checked_updated",
            Self::PaymentUpdated => "payment_updated",
            Self::AssigneesUpdated => "assignees_updated",
            Self::LabelsUpdated => "labels_updated",
            Self::CardArchived => "card_archived",
            Self::CardRestored => "card_restored",
            Self::CardDeleted => "card_deleted",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a stored file; the bytes live outside the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub sequence: u64,
    pub board_id: BoardId,
    pub list_id: Option<ListId>,
    pub card_id: Option<CardId>,
    pub user_id: Option<UserId>,
    pub action: ActivityAction,
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

/// An activity before it is stamped with id, sequence, actor and time.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub board_id: BoardId,
    pub list_id: Option<ListId>,
    pub card_id: Option<CardId>,
    pub action: ActivityAction,
    pub message: String,
    pub details: serde_json::Value,
    pub attachment: Option<Attachment>,
}

impl NewActivity {
    pub fn board(board_id: BoardId, action: ActivityAction, message: impl Into<String>) -> Self {
        Self {
            board_id,
            list_id: None,
            card_id: None,
            action,
            message: message.into(),
            details: serde_json::Value::Null,
            attachment: None,
        }
    }

    pub fn list(
        board_id: BoardId,
        list_id: ListId,
        action: ActivityAction,
        message: impl Into<String>,
    ) -> Self {
        Self {
            list_id: Some(list_id),
            ..Self::board(board_id, action, message)
        }
    }

    pub fn card(
        board_id: BoardId,
        list_id: ListId,
        card_id: CardId,
        action: ActivityAction,
        message: impl Into<String>,
    ) -> Self {
        Self {
            list_id: Some(list_id),
            card_id: Some(card_id),
            ..Self::board(board_id, action, message)
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrder {
    #[default]
    NewestFirst,
    Chronological,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub order: FeedOrder,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Activity>", into = "Vec<Activity>")]
pub struct ActivityLog {
    entries: Vec<Activity>,
    next_sequence: u64,
}

impl From<Vec<Activity>> for ActivityLog {
    fn from(mut entries: Vec<Activity>) -> Self {
        entries.sort_by_key(|a| (a.created_at, a.sequence));
        let next_sequence = entries.iter().map(|a| a.sequence + 1).max().unwrap_or(0);
        Self {
            entries,
            next_sequence,
        }
    }
}

impl From<ActivityLog> for Vec<Activity> {
    fn from(log: ActivityLog) -> Self {
        log.entries
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, actor: Option<UserId>, new: NewActivity) -> &Activity {
        // Timestamps never run backwards inside the log even if the clock does.
        let now = Utc::now();
        let created_at = match self.entries.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let activity = Activity {
            id: Uuid::new_v4(),
            sequence: self.next_sequence,
            board_id: new.board_id,
            list_id: new.list_id,
            card_id: new.card_id,
            user_id: actor,
            action: new.action,
            message: new.message,
            details: new.details,
            attachment: new.attachment,
            created_at,
        };
        self.next_sequence += 1;
        tracing::debug!(
            action = %activity.action,
            board_id = %activity.board_id,
            sequence = activity.sequence,
            "activity appended"
        );
        self.entries.push(activity);
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Activity> {
        self.entries.last()
    }

    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn for_card(&self, card_id: CardId, query: FeedQuery) -> Vec<&Activity> {
        Self::project(self.entries.iter().filter(|a| a.card_id == Some(card_id)), query)
    }

    pub fn for_board(&self, board_id: BoardId, query: FeedQuery) -> Vec<&Activity> {
        Self::project(self.entries.iter().filter(|a| a.board_id == board_id), query)
    }

    fn project<'a>(
        matching: impl DoubleEndedIterator<Item = &'a Activity>,
        query: FeedQuery,
    ) -> Vec<&'a Activity> {
        let limit = query.limit.unwrap_or(usize::MAX);
        match query.order {
            FeedOrder::Chronological => matching.take(limit).collect(),
            FeedOrder::NewestFirst => matching.rev().take(limit).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(board_id: BoardId, card_id: CardId, text: &str) -> NewActivity {
        NewActivity::card(board_id, Uuid::new_v4(), card_id, ActivityAction::Comment, text)
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let mut log = ActivityLog::new();
        let board = Uuid::new_v4();
        let card = Uuid::new_v4();
        let first = log.append(None, comment(board, card, "a")).sequence;
        let second = log.append(None, comment(board, card, "b")).sequence;
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_card_feed_ordering_and_limit() {
        let mut log = ActivityLog::new();
        let board = Uuid::new_v4();
        let card = Uuid::new_v4();
        let other = Uuid::new_v4();
        log.append(None, comment(board, card, "first"));
        log.append(None, comment(board, other, "elsewhere"));
        log.append(None, comment(board, card, "second"));
        log.append(None, comment(board, card, "third"));

        let newest: Vec<_> = log
            .for_card(card, FeedQuery::default())
            .iter()
            .map(|a| a.message.as_str())
            .collect();
        assert_eq!(newest, vec!["third", "second", "first"]);

        let oldest_two: Vec<_> = log
            .for_card(
                card,
                FeedQuery {
                    order: FeedOrder::Chronological,
                    limit: Some(2),
                },
            )
            .iter()
            .map(|a| a.message.as_str())
            .collect();
        assert_eq!(oldest_two, vec!["first", "second"]);

        assert_eq!(log.for_board(board, FeedQuery::default()).len(), 4);
    }

    #[test]
    fn test_reload_continues_sequence() {
        let mut log = ActivityLog::new();
        let board = Uuid::new_v4();
        log.append(None, NewActivity::board(board, ActivityAction::BoardCreated, "x"));
        log.append(None, NewActivity::board(board, ActivityAction::ListCreated, "y"));

        let json = serde_json::to_string(&log).unwrap();
        let mut restored: ActivityLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        let next = restored
            .append(None, NewActivity::board(board, ActivityAction::ListMoved, "z"))
            .sequence;
        assert_eq!(next, 2);
    }

    #[test]
    fn test_serialized_as_plain_array() {
        let log = ActivityLog::new();
        assert_eq!(serde_json::to_string(&log).unwrap(), "[]");
    }
}

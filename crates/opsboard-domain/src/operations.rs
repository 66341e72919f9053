use chrono::{DateTime, Utc};
use opsboard_core::BoardResult;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityId, Attachment, FeedQuery};
use crate::board::{Board, BoardId, CityId};
use crate::card::{BoardCard, CardId, PaymentUpdate};
use crate::field_update::FieldUpdate;
use crate::label::CardLabels;
use crate::list::{BoardList, ListId};
use crate::user::{User, UserId};

/// Input for creating a card.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: BoardList,
    pub cards: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub card: BoardCard,
    pub activity: Activity,
}

/// Every operation the API exposes, checked against the acting user.
pub trait BoardOperations {
    // Board operations
    fn create_board(
        &mut self,
        actor: &User,
        city_id: CityId,
        name: String,
        description: Option<String>,
    ) -> BoardResult<Board>;
    fn list_boards(&self, actor: &User) -> BoardResult<Vec<Board>>;
    fn board_detail(&self, actor: &User, id: BoardId) -> BoardResult<BoardDetail>;
    fn delete_board(&mut self, actor: &User, id: BoardId) -> BoardResult<()>;

    // List operations
    fn create_list(&mut self, actor: &User, board_id: BoardId, name: String)
        -> BoardResult<BoardList>;
    fn rename_list(&mut self, actor: &User, id: ListId, name: String) -> BoardResult<BoardList>;
    fn move_list(&mut self, actor: &User, id: ListId, index: i64) -> BoardResult<Vec<BoardList>>;
    fn delete_list(&mut self, actor: &User, id: ListId) -> BoardResult<()>;

    // Card operations
    fn create_card(&mut self, actor: &User, list_id: ListId, card: NewCard)
        -> BoardResult<BoardCard>;
    fn get_card(&self, actor: &User, id: CardId) -> BoardResult<BoardCard>;
    fn move_card(
        &mut self,
        actor: &User,
        id: CardId,
        target_list_id: ListId,
        index: i64,
    ) -> BoardResult<MoveOutcome>;
    fn update_card_text(
        &mut self,
        actor: &User,
        id: CardId,
        title: Option<String>,
        description: FieldUpdate<String>,
    ) -> BoardResult<BoardCard>;
    fn set_due_date(
        &mut self,
        actor: &User,
        id: CardId,
        due_date: Option<DateTime<Utc>>,
    ) -> BoardResult<BoardCard>;
    fn set_checked(&mut self, actor: &User, id: CardId, checked: bool) -> BoardResult<BoardCard>;
    fn set_payment(
        &mut self,
        actor: &User,
        id: CardId,
        update: PaymentUpdate,
    ) -> BoardResult<BoardCard>;
    fn set_assignees(
        &mut self,
        actor: &User,
        id: CardId,
        assignees: Vec<UserId>,
    ) -> BoardResult<BoardCard>;
    fn set_labels(&mut self, actor: &User, id: CardId, labels: CardLabels)
        -> BoardResult<BoardCard>;
    fn set_archived(&mut self, actor: &User, id: CardId, archived: bool)
        -> BoardResult<BoardCard>;
    fn delete_card(&mut self, actor: &User, id: CardId) -> BoardResult<()>;

    // Activity operations
    fn add_comment(
        &mut self,
        actor: &User,
        card_id: CardId,
        body: Option<String>,
        attachment: Option<Attachment>,
    ) -> BoardResult<Activity>;
    fn card_activities(
        &self,
        actor: &User,
        card_id: CardId,
        query: FeedQuery,
    ) -> BoardResult<Vec<Activity>>;
    fn board_activities(
        &self,
        actor: &User,
        board_id: BoardId,
        query: FeedQuery,
    ) -> BoardResult<Vec<Activity>>;
    fn get_activity(&self, actor: &User, id: ActivityId) -> BoardResult<Activity>;
}

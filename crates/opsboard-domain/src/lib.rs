pub mod access;
pub mod activity;
pub mod board;
pub mod card;
pub mod commands;
pub mod field_update;
pub mod label;
pub mod list;
pub mod operations;
pub mod positioning;
pub mod state;
pub mod user;

pub use activity::{
    Activity, ActivityAction, ActivityId, ActivityLog, Attachment, FeedOrder, FeedQuery,
    NewActivity,
};
pub use board::{Board, BoardId, CityId};
pub use card::{BoardCard, CardId, PaymentUpdate, UNPLACED_POSITION};
pub use field_update::FieldUpdate;
pub use label::{CardLabels, LabelFamily, LabelId};
pub use list::{BoardList, ListId};
pub use operations::{BoardDetail, BoardOperations, ListWithCards, MoveOutcome, NewCard};
pub use positioning::MovePlan;
pub use state::BoardState;
pub use user::{Role, User, UserId};

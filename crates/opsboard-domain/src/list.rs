use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::BoardId;

pub type ListId = Uuid;

/// A column of a board holding ordered cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardList {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoardList {
    pub fn new(id: ListId, board_id: BoardId, name: String, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            board_id,
            name,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    pub fn update_position(&mut self, position: i32) {
        if self.position != position {
            self.position = position;
            self.updated_at = Utc::now();
        }
    }
}

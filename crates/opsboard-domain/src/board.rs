use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

pub type BoardId = Uuid;
pub type CityId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub city_id: CityId,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(
        id: BoardId,
        city_id: CityId,
        name: String,
        description: Option<String>,
        created_by: Option<UserId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            city_id,
            name,
            description,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    pub fn update_description(&mut self, description: Option<String>) {
        self.description = description;
        self.updated_at = Utc::now();
    }
}

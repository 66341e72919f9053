use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

use crate::board::{BoardId, CityId};

pub type UserId = Uuid;

/// Declared from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    SubAdmin,
    Counsellor,
    User,
}

impl Role {
    pub fn at_least(self, other: Role) -> bool {
        self <= other
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "superadmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "subadmin" => Ok(Role::SubAdmin),
            "counsellor" | "counselor" => Ok(Role::Counsellor),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub allowed_ips: Vec<IpAddr>,
    #[serde(default)]
    pub can_create_users: bool,
    #[serde(default)]
    pub panel_permission: bool,
    #[serde(default)]
    pub city_ids: Vec<CityId>,
    #[serde(default)]
    pub board_ids: Vec<BoardId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            allowed_ips: Vec::new(),
            can_create_users: false,
            panel_permission: false,
            city_ids: Vec::new(),
            board_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Admin or superadmin: sees every board and may create or delete them.
    pub fn is_admin(&self) -> bool {
        self.role.at_least(Role::Admin)
    }

    /// Whether requests from this user are pinned to `allowed_ips`.
    pub fn is_ip_restricted(&self) -> bool {
        matches!(self.role, Role::Admin | Role::SubAdmin) && !self.allowed_ips.is_empty()
    }

    pub fn allows_ip(&self, ip: IpAddr) -> bool {
        !self.is_ip_restricted() || self.allowed_ips.contains(&ip)
    }
}

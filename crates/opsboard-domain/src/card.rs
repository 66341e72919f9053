use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::field_update::FieldUpdate;
use crate::label::CardLabels;
use crate::list::ListId;
use crate::user::UserId;

pub type CardId = Uuid;

/// Position carried by a card that takes no part in its list's ordering.
pub const UNPLACED_POSITION: i32 = 9999;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardCard {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub payment_done: bool,
    #[serde(default)]
    pub dependant_payment_done: bool,
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub assignees: Vec<UserId>,
    #[serde(default)]
    pub labels: CardLabels,
    #[serde(default = "default_position")]
    pub position: i32,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_position() -> i32 {
    UNPLACED_POSITION
}

/// Partial update of the payment block. `None` leaves a flag untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentUpdate {
    #[serde(default)]
    pub payment_done: Option<bool>,
    #[serde(default)]
    pub dependant_payment_done: Option<bool>,
    #[serde(default)]
    pub invoice: FieldUpdate<String>,
}

impl PaymentUpdate {
    pub fn is_empty(&self) -> bool {
        self.payment_done.is_none()
            && self.dependant_payment_done.is_none()
            && !self.invoice.is_change()
    }
}

impl BoardCard {
    pub fn new(id: CardId, list_id: ListId, title: String, created_by: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            list_id,
            title,
            description: None,
            due_date: None,
            checked: false,
            payment_done: false,
            dependant_payment_done: false,
            invoice: None,
            assignees: Vec::new(),
            labels: CardLabels::default(),
            position: UNPLACED_POSITION,
            archived: false,
            archived_at: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.archived
    }

    /// Place the card at `position` of `list_id`. Only touches `updated_at`
    /// when something actually moved.
    pub fn place(&mut self, list_id: ListId, position: i32) {
        if self.list_id != list_id || self.position != position {
            self.list_id = list_id;
            self.position = position;
            self.updated_at = Utc::now();
        }
    }

    pub fn update_title(&mut self, title: String) {
        self.title = title;
        self.updated_at = Utc::now();
    }

    pub fn update_description(&mut self, description: FieldUpdate<String>) {
        description.apply_to(&mut self.description);
        self.updated_at = Utc::now();
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
        self.updated_at = Utc::now();
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        self.updated_at = Utc::now();
    }

    pub fn apply_payment(&mut self, update: PaymentUpdate) {
        if let Some(done) = update.payment_done {
            self.payment_done = done;
        }
        if let Some(done) = update.dependant_payment_done {
            self.dependant_payment_done = done;
        }
        update.invoice.apply_to(&mut self.invoice);
        self.updated_at = Utc::now();
    }

    pub fn set_assignees(&mut self, assignees: Vec<UserId>) {
        let mut seen = std::collections::HashSet::new();
        self.assignees = assignees.into_iter().filter(|id| seen.insert(*id)).collect();
        self.updated_at = Utc::now();
    }

    pub fn set_labels(&mut self, labels: CardLabels) {
        self.labels = labels.normalized();
        self.updated_at = Utc::now();
    }

    /// Take the card out of its list's ordering. The list itself must be
    /// compacted by the caller.
    pub fn archive(&mut self) {
        let now = Utc::now();
        self.archived = true;
        self.archived_at = Some(now);
        self.position = UNPLACED_POSITION;
        self.updated_at = now;
    }

    pub fn restore(&mut self, position: i32) {
        self.archived = false;
        self.archived_at = None;
        self.position = position;
        self.updated_at = Utc::now();
    }
}

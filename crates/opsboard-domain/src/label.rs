//! Label references carried by cards.
//!
//! The label catalogue itself lives outside this service; cards only hold ids.

use serde::{Deserialize, Serialize};

pub type LabelId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFamily {
    Country,
    ServiceArea,
    Intake,
}

/// Country and service-area labels exist both as a single reference and as a
/// multi-select set; intake is single-valued only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLabels {
    #[serde(default)]
    pub country_label_id: Option<LabelId>,
    #[serde(default)]
    pub country_label_ids: Vec<LabelId>,
    #[serde(default)]
    pub service_area_label_id: Option<LabelId>,
    #[serde(default)]
    pub service_area_label_ids: Vec<LabelId>,
    #[serde(default)]
    pub intake_label_id: Option<LabelId>,
}

fn dedup_ids(ids: Vec<LabelId>) -> Vec<LabelId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl CardLabels {
    /// Collapse duplicate ids, keeping the first occurrence.
    pub fn normalized(self) -> Self {
        Self {
            country_label_ids: dedup_ids(self.country_label_ids),
            service_area_label_ids: dedup_ids(self.service_area_label_ids),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.country_label_id.is_none()
            && self.country_label_ids.is_empty()
            && self.service_area_label_id.is_none()
            && self.service_area_label_ids.is_empty()
            && self.intake_label_id.is_none()
    }

    /// Families whose contents differ between `self` and `other`.
    pub fn changed_families(&self, other: &CardLabels) -> Vec<LabelFamily> {
        let same_set = |a: &[LabelId], b: &[LabelId]| {
            a.len() == b.len() && a.iter().all(|id| b.contains(id))
        };
        let mut changed = Vec::new();
        if self.country_label_id != other.country_label_id
            || !same_set(&self.country_label_ids, &other.country_label_ids)
        {
            changed.push(LabelFamily::Country);
        }
        if self.service_area_label_id != other.service_area_label_id
            || !same_set(&self.service_area_label_ids, &other.service_area_label_ids)
        {
            changed.push(LabelFamily::ServiceArea);
        }
        if self.intake_label_id != other.intake_label_id {
            changed.push(LabelFamily::Intake);
        }
        changed
    }
}

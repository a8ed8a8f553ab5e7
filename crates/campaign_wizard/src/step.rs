use std::fmt;

use chrono::{DateTime, Utc};
use shared::{
    domain::{BudgetKind, Objective, Placement},
    protocol::{BudgetDto, CampaignDto},
};

use crate::ports::CampaignSubmission;

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub name: String,
    pub kind: BudgetKind,
    /// Major currency units.
    pub amount: f64,
    pub schedule_start: String,
    pub schedule_end: String,
}

impl Budget {
    /// Both schedule bounds as timestamps, when they parse as RFC 3339.
    /// Ordering between them is left to the backend.
    pub fn parsed_schedule(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = DateTime::parse_from_rfc3339(self.schedule_start.trim()).ok()?;
        let end = DateTime::parse_from_rfc3339(self.schedule_end.trim()).ok()?;
        Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
    }

    fn to_dto(&self) -> BudgetDto {
        BudgetDto {
            name: self.name.clone(),
            kind: self.kind,
            amount: self.amount,
            schedule_start: self.schedule_start.clone(),
            schedule_end: self.schedule_end.clone(),
        }
    }
}

/// A media file that passed selection-time checks.
#[derive(Clone, PartialEq)]
pub struct MediaAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaAttachment {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resume {
    pub summary: String,
}

/// Names the slice of [`StepData`] a step reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKey {
    Objective,
    Budget,
    Medias,
    Localization,
    Resume,
}

impl DataKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::Budget => "budget",
            Self::Medias => "medias",
            Self::Localization => "localization",
            Self::Resume => "resume",
        }
    }
}

/// One slice of [`StepData`], tagged with the key it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    Objective(Option<Objective>),
    Budget(Option<Budget>),
    Medias(Option<MediaAttachment>),
    Localization(Vec<Placement>),
    Resume(Option<Resume>),
}

impl StepValue {
    pub fn key(&self) -> DataKey {
        match self {
            Self::Objective(_) => DataKey::Objective,
            Self::Budget(_) => DataKey::Budget,
            Self::Medias(_) => DataKey::Medias,
            Self::Localization(_) => DataKey::Localization,
            Self::Resume(_) => DataKey::Resume,
        }
    }
}

/// Answers accumulated across the wizard. Every slice is optional until its
/// step has been visited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepData {
    pub objective: Option<Objective>,
    pub budget: Option<Budget>,
    pub medias: Option<MediaAttachment>,
    pub localization: Vec<Placement>,
    pub resume: Option<Resume>,
}

impl StepData {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn get(&self, key: DataKey) -> StepValue {
        match key {
            DataKey::Objective => StepValue::Objective(self.objective),
            DataKey::Budget => StepValue::Budget(self.budget.clone()),
            DataKey::Medias => StepValue::Medias(self.medias.clone()),
            DataKey::Localization => StepValue::Localization(self.localization.clone()),
            DataKey::Resume => StepValue::Resume(self.resume.clone()),
        }
    }

    /// Replaces the slice named by the value's tag and leaves the rest alone.
    pub fn set(&mut self, value: StepValue) {
        match value {
            StepValue::Objective(v) => self.objective = v,
            StepValue::Budget(v) => self.budget = v,
            StepValue::Medias(v) => self.medias = v,
            StepValue::Localization(v) => self.localization = v,
            StepValue::Resume(v) => self.resume = v,
        }
    }

    pub fn is_placement_selected(&self, name: &str) -> bool {
        self.localization.iter().any(|p| p.name == name)
    }

    /// Adds or removes a display point. Membership is decided by name only,
    /// so two totems sharing a name select and deselect together.
    pub fn toggle_placement(&mut self, placement: Placement, selected: bool) {
        if selected {
            if !self.is_placement_selected(&placement.name) {
                self.localization.push(placement);
            }
        } else {
            self.localization.retain(|p| p.name != placement.name);
        }
    }

    /// Assembles the request body. Returns `None` when no budget was staged;
    /// callers treat that as a broken step sequence.
    pub fn to_submission(&self) -> Option<CampaignSubmission> {
        let budget = self.budget.as_ref()?;
        Some(CampaignSubmission {
            dto: CampaignDto {
                objective: self.objective,
                budget: budget.to_dto(),
                localization: self.localization.clone(),
            },
            media: self.medias.clone(),
        })
    }
}

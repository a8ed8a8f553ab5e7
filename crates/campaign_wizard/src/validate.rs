//! Per-step acceptance checks. Each returns whether the staged slice is good
//! enough to move past its step; none of them fail or log.

use shared::domain::Objective;

use crate::step::{Budget, DataKey, MediaAttachment, Resume, StepData};

pub fn validate(key: DataKey, data: &StepData) -> bool {
    match key {
        DataKey::Objective => objective_is_valid(data.objective),
        DataKey::Budget => budget_is_valid(data.budget.as_ref()),
        DataKey::Medias => media_is_valid(data.medias.as_ref()),
        DataKey::Localization => !data.localization.is_empty(),
        DataKey::Resume => resume_is_valid(data.resume.as_ref()),
    }
}

/// Membership in the enumeration is enforced by [`Objective::parse`] when the
/// value is staged, so only presence is left to check here.
pub fn objective_is_valid(objective: Option<Objective>) -> bool {
    objective.is_some()
}

pub fn budget_is_valid(budget: Option<&Budget>) -> bool {
    let Some(budget) = budget else {
        return false;
    };
    !budget.name.trim().is_empty()
        && budget.amount.is_finite()
        && budget.amount > 0.0
        && !budget.schedule_start.trim().is_empty()
        && !budget.schedule_end.trim().is_empty()
}

pub fn media_is_valid(media: Option<&MediaAttachment>) -> bool {
    media.is_some_and(|m| m.size() > 0)
}

pub fn resume_is_valid(resume: Option<&Resume>) -> bool {
    resume.is_some_and(|r| !r.summary.trim().is_empty())
}

//! Non-interactive campaign creation: a TOML manifest answers each wizard
//! step in order, the way a user would fill the modal.

use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use campaign_wizard::{
    Budget, DataKey, MediaCandidate, StepValue, TextStepView, WizardController,
};
use serde::Deserialize;
use shared::domain::{BudgetKind, Objective, Placement, Totem};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignManifest {
    pub objective: String,
    pub budget: BudgetManifest,
    /// Names of the totems the campaign runs on.
    #[serde(default)]
    pub totems: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub schedule_start: String,
    pub schedule_end: String,
}

impl CampaignManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid manifest '{}'", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn objective(&self) -> Result<Objective> {
        Objective::parse(&self.objective)
            .ok_or_else(|| anyhow!("unknown objective '{}'", self.objective))
    }

    pub fn budget(&self) -> Result<Budget> {
        let kind = BudgetKind::parse(&self.budget.kind)
            .ok_or_else(|| anyhow!("unknown budget type '{}'", self.budget.kind))?;
        Ok(Budget {
            name: self.budget.name.clone(),
            kind,
            amount: self.budget.amount,
            schedule_start: self.budget.schedule_start.clone(),
            schedule_end: self.budget.schedule_end.clone(),
        })
    }
}

/// Maps totem names to placements. Disabled or unknown totems are refused.
pub fn resolve_placements(names: &[String], totems: &[Totem]) -> Result<Vec<Placement>> {
    names
        .iter()
        .map(|name| {
            let totem = totems
                .iter()
                .find(|t| t.name == *name)
                .ok_or_else(|| anyhow!("no totem named '{name}'"))?;
            if !totem.enabled {
                bail!("totem '{name}' is disabled");
            }
            Ok(totem.placement())
        })
        .collect()
}

pub struct StagedCampaign {
    pub objective: Objective,
    pub budget: Budget,
    pub media: Option<MediaCandidate>,
    pub placements: Vec<Placement>,
}

/// Walks the wizard up to the review step. Returns the text of every screen
/// shown along the way; the last one is the review summary.
pub fn stage_campaign(wizard: &mut WizardController, staged: StagedCampaign) -> Result<Vec<String>> {
    let StagedCampaign {
        objective,
        budget,
        mut media,
        placements,
    } = staged;
    let mut screens = Vec::new();

    while !wizard.is_last_step() {
        let step = *wizard.descriptor();
        match step.key {
            DataKey::Objective => wizard.update(StepValue::Objective(Some(objective))),
            DataKey::Budget => wizard.update(StepValue::Budget(Some(budget.clone()))),
            DataKey::Medias => {
                if let Some(candidate) = media.take() {
                    wizard
                        .select_media(candidate)
                        .context("media file was rejected")?;
                }
            }
            DataKey::Localization => {
                for placement in &placements {
                    wizard.toggle_placement(placement.clone(), true);
                }
            }
            DataKey::Resume => {}
        }
        screens.push(step.render(wizard.data(), &TextStepView));

        if !wizard.can_advance() {
            bail!("step '{}' is incomplete", step.label);
        }
        wizard.next()?;
    }

    let review = *wizard.descriptor();
    screens.push(review.render(wizard.data(), &TextStepView));
    info!(steps = screens.len(), "campaign staged for review");
    Ok(screens)
}

#[cfg(test)]
#[path = "tests/campaign_flow_tests.rs"]
mod tests;

use shared::domain::{Placement, QueryScope};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    media::{MediaCandidate, MediaRejection, PreviewLease, PreviewUrl},
    ports::WizardPorts,
    registry::{StepDescriptor, StepRegistry},
    step::{DataKey, MediaAttachment, Resume, StepData, StepValue},
    summary::render_summary,
};

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("step {step} ({key}) is incomplete")]
    StepInvalid { step: usize, key: &'static str },
    #[error("submission is only possible from the review step (currently at step {step})")]
    NotAtReview { step: usize },
    #[error("budget is missing at submission time; the step sequence is broken")]
    MissingBudget,
    #[error("campaign submission failed: {source}")]
    Submission { source: anyhow::Error },
}

impl WizardError {
    /// Programming errors, as opposed to anything the user can fix.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::NotAtReview { .. } | Self::MissingBudget)
    }
}

/// Drives one campaign-creation session: which step is active, what has been
/// staged so far, and the final submission.
pub struct WizardController {
    registry: StepRegistry,
    ports: WizardPorts,
    step: usize,
    data: StepData,
    open: bool,
    preview: Option<PreviewLease>,
}

impl WizardController {
    /// Starts an open session at the first step with nothing staged.
    pub fn new(registry: StepRegistry, ports: WizardPorts) -> Self {
        Self {
            registry,
            ports,
            step: 0,
            data: StepData::default(),
            open: true,
            preview: None,
        }
    }

    pub fn campaign(ports: WizardPorts) -> Self {
        Self::new(StepRegistry::campaign(), ports)
    }

    pub fn open(&mut self) {
        self.reset();
        self.open = true;
    }

    /// Dismisses the wizard. Staged answers are discarded.
    pub fn close(&mut self) {
        self.reset();
        self.open = false;
        debug!("wizard: closed");
    }

    fn reset(&mut self) {
        self.step = 0;
        self.data = StepData::default();
        self.preview = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn descriptor(&self) -> &StepDescriptor {
        self.registry.at(self.step)
    }

    pub fn is_last_step(&self) -> bool {
        self.step == self.registry.last_index()
    }

    pub fn data(&self) -> &StepData {
        &self.data
    }

    pub fn value(&self, key: DataKey) -> StepValue {
        self.data.get(key)
    }

    pub fn preview_url(&self) -> Option<&PreviewUrl> {
        self.preview.as_ref().map(PreviewLease::url)
    }

    pub fn can_advance(&self) -> bool {
        self.descriptor().validate(&self.data)
    }

    /// Stages a new value for one slice. Cheap enough to call on every edit.
    pub fn update(&mut self, value: StepValue) {
        if let StepValue::Medias(media) = &value {
            self.replace_preview(media.as_ref());
        }
        self.data.set(value);
    }

    pub fn next(&mut self) -> Result<usize, WizardError> {
        let descriptor = *self.descriptor();
        if !descriptor.validate(&self.data) {
            debug!(step = self.step, key = descriptor.key.as_str(), "wizard: advance refused");
            return Err(WizardError::StepInvalid {
                step: self.step,
                key: descriptor.key.as_str(),
            });
        }

        self.step = (self.step + 1).min(self.registry.last_index());
        if self.descriptor().key == DataKey::Resume {
            self.data.resume = Some(Resume {
                summary: render_summary(&self.data),
            });
        }
        debug!(step = self.step, "wizard: advanced");
        Ok(self.step)
    }

    pub fn back(&mut self) -> usize {
        self.step = self.step.saturating_sub(1);
        self.step
    }

    /// Checks a picked file and stages it. A rejected file leaves the staged
    /// media untouched.
    pub fn select_media(&mut self, candidate: MediaCandidate) -> Result<(), MediaRejection> {
        match candidate.accept() {
            Ok(media) => {
                info!(
                    file_name = %media.file_name,
                    size = media.size(),
                    "wizard: media staged"
                );
                self.update(StepValue::Medias(Some(media)));
                Ok(())
            }
            Err(rejection) => {
                warn!(%rejection, "wizard: media rejected");
                self.ports.notifier.error(&rejection.to_string());
                Err(rejection)
            }
        }
    }

    pub fn remove_media(&mut self) {
        self.update(StepValue::Medias(None));
    }

    pub fn toggle_placement(&mut self, placement: Placement, selected: bool) {
        self.data.toggle_placement(placement, selected);
    }

    fn replace_preview(&mut self, media: Option<&MediaAttachment>) {
        // Drop the old lease first so its handle is revoked before a new one exists.
        self.preview = None;
        let Some(media) = media else {
            return;
        };
        match PreviewLease::open(self.ports.previews.clone(), media) {
            Ok(lease) => self.preview = Some(lease),
            Err(err) => warn!(error = %err, "wizard: preview unavailable"),
        }
    }

    /// Sends the staged campaign. On success the session is reset and
    /// dismissed; on failure everything stays in place for a retry.
    pub async fn submit(&mut self) -> Result<(), WizardError> {
        if !self.is_last_step() {
            error!(step = self.step, "wizard: submit called before the review step");
            return Err(WizardError::NotAtReview { step: self.step });
        }
        let Some(submission) = self.data.to_submission() else {
            error!("wizard: submit called without a budget");
            return Err(WizardError::MissingBudget);
        };

        let placements = submission.dto.localization.len();
        let has_media = submission.media.is_some();
        match self.ports.submitter.submit_campaign(submission).await {
            Ok(()) => {
                info!(placements, has_media, "wizard: campaign submitted");
                self.ports.cache.invalidate(QueryScope::Campaigns);
                self.ports.notifier.success("Campaign created successfully.");
                self.close();
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, "wizard: campaign submission failed");
                self.ports
                    .notifier
                    .error(&format!("Could not create the campaign: {source}"));
                Err(WizardError::Submission { source })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

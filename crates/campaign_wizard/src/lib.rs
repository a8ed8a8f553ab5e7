//! Multi-step campaign creation: per-step validation, the ordered step list,
//! and the controller that accumulates answers and submits them.

pub mod controller;
pub mod media;
pub mod ports;
pub mod registry;
pub mod step;
pub mod summary;
pub mod validate;

pub use controller::{WizardController, WizardError};
pub use media::{MediaCandidate, MediaRejection, PreviewProvider, PreviewUrl};
pub use ports::{CacheInvalidator, CampaignSubmission, CampaignSubmitter, Notifier, WizardPorts};
pub use registry::{StepDescriptor, StepRegistry, StepView, TextStepView};
pub use step::{Budget, DataKey, MediaAttachment, Resume, StepData, StepValue};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

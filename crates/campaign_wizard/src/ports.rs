//! Capabilities the wizard needs from its host. Everything that talks to the
//! network or the screen sits behind one of these traits.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{domain::QueryScope, protocol::CampaignDto};
use tracing::{info, warn};

use crate::{media::PreviewProvider, step::MediaAttachment};

/// Body of the campaign-creation request: a JSON part and an optional file.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSubmission {
    pub dto: CampaignDto,
    pub media: Option<MediaAttachment>,
}

#[async_trait]
pub trait CampaignSubmitter: Send + Sync {
    async fn submit_campaign(&self, submission: CampaignSubmission) -> Result<()>;
}

pub struct MissingCampaignSubmitter;

#[async_trait]
impl CampaignSubmitter for MissingCampaignSubmitter {
    async fn submit_campaign(&self, _submission: CampaignSubmission) -> Result<()> {
        Err(anyhow!("campaign backend is unavailable"))
    }
}

pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, scope: QueryScope);
}

pub struct NoCache;

impl CacheInvalidator for NoCache {
    fn invalidate(&self, _scope: QueryScope) {}
}

/// Toast sink.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "toast", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "toast", "{message}");
    }
}

#[derive(Clone)]
pub struct WizardPorts {
    pub submitter: Arc<dyn CampaignSubmitter>,
    pub cache: Arc<dyn CacheInvalidator>,
    pub notifier: Arc<dyn Notifier>,
    pub previews: Arc<dyn PreviewProvider>,
}

impl WizardPorts {
    pub fn new(submitter: Arc<dyn CampaignSubmitter>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self {
            submitter,
            cache,
            notifier: Arc::new(TracingNotifier),
            previews: Arc::new(crate::media::NoPreview),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_previews(mut self, previews: Arc<dyn PreviewProvider>) -> Self {
        self.previews = previews;
        self
    }
}

impl Default for WizardPorts {
    fn default() -> Self {
        Self::new(Arc::new(MissingCampaignSubmitter), Arc::new(NoCache))
    }
}

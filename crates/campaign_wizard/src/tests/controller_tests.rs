use super::*;

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::domain::{BudgetKind, Objective};

use crate::{
    media::PreviewProvider,
    ports::{CacheInvalidator, CampaignSubmission, CampaignSubmitter, Notifier},
    step::Budget,
};

#[derive(Default)]
struct RecordingSubmitter {
    submissions: Mutex<Vec<CampaignSubmission>>,
    fail: AtomicBool,
}

#[async_trait]
impl CampaignSubmitter for RecordingSubmitter {
    async fn submit_campaign(&self, submission: CampaignSubmission) -> anyhow::Result<()> {
        self.submissions.lock().expect("lock").push(submission);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("502 bad gateway"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingCache {
    invalidated: Mutex<Vec<QueryScope>>,
}

impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, scope: QueryScope) {
        self.invalidated.lock().expect("lock").push(scope);
    }
}

#[derive(Default)]
struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().expect("lock").push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().expect("lock").push(message.to_string());
    }
}

#[derive(Default)]
struct CountingPreviews {
    opened: AtomicUsize,
    revoked: Mutex<Vec<PreviewUrl>>,
}

impl PreviewProvider for CountingPreviews {
    fn open(&self, media: &MediaAttachment) -> anyhow::Result<PreviewUrl> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(PreviewUrl(format!("blob:{n}:{}", media.file_name)))
    }

    fn revoke(&self, url: &PreviewUrl) {
        self.revoked.lock().expect("lock").push(url.clone());
    }
}

struct Harness {
    wizard: WizardController,
    submitter: Arc<RecordingSubmitter>,
    cache: Arc<RecordingCache>,
    notifier: Arc<RecordingNotifier>,
    previews: Arc<CountingPreviews>,
}

fn harness() -> Harness {
    let submitter = Arc::new(RecordingSubmitter::default());
    let cache = Arc::new(RecordingCache::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let previews = Arc::new(CountingPreviews::default());
    let ports = WizardPorts::new(submitter.clone(), cache.clone())
        .with_notifier(notifier.clone())
        .with_previews(previews.clone());
    Harness {
        wizard: WizardController::campaign(ports),
        submitter,
        cache,
        notifier,
        previews,
    }
}

fn promo_budget() -> Budget {
    Budget {
        name: "Promo".into(),
        kind: BudgetKind::Daily,
        amount: 150.0,
        schedule_start: "2025-01-01T00:00:00Z".into(),
        schedule_end: "2025-01-31T00:00:00Z".into(),
    }
}

fn video(name: &str, duration_secs: f64) -> MediaCandidate {
    MediaCandidate {
        file_name: name.into(),
        mime_type: "video/mp4".into(),
        duration_secs: Some(duration_secs),
        bytes: vec![0, 0, 0, 24, b'f', b't', b'y', b'p'],
    }
}

fn avenue(n: u32) -> Placement {
    Placement {
        latitude: -22.9995 + f64::from(n) * 0.0015,
        longitude: -43.3615 - f64::from(n) * 0.0015,
        name: format!("Semaforo {n} - Avenida das Americas"),
    }
}

fn walk_to_review(wizard: &mut WizardController) {
    wizard.update(StepValue::Objective(Some(Objective::Sales)));
    wizard.next().expect("objective");
    wizard.update(StepValue::Budget(Some(promo_budget())));
    wizard.next().expect("budget");
    wizard.select_media(video("promo.mp4", 12.0)).expect("media");
    wizard.next().expect("media");
    wizard.toggle_placement(avenue(1), true);
    wizard.toggle_placement(avenue(2), true);
    wizard.next().expect("localization");
    assert!(wizard.is_last_step());
}

#[test]
fn starts_open_at_first_step_with_nothing_staged() {
    let h = harness();
    assert!(h.wizard.is_open());
    assert_eq!(h.wizard.current_step(), 0);
    assert_eq!(h.wizard.step_count(), 5);
    assert!(h.wizard.data().is_empty());
    assert_eq!(h.wizard.descriptor().key, DataKey::Objective);
}

#[test]
fn objective_then_budget_reaches_media_step() {
    let mut h = harness();
    h.wizard.update(StepValue::Objective(Some(Objective::Sales)));
    assert_eq!(h.wizard.next().expect("advance"), 1);
    h.wizard.update(StepValue::Budget(Some(promo_budget())));
    assert_eq!(h.wizard.next().expect("advance"), 2);
    assert_eq!(h.wizard.descriptor().key, DataKey::Medias);
}

#[test]
fn zero_amount_keeps_wizard_on_budget_step() {
    let mut h = harness();
    h.wizard.update(StepValue::Objective(Some(Objective::Sales)));
    h.wizard.next().expect("advance");

    let mut budget = promo_budget();
    budget.amount = 0.0;
    h.wizard.update(StepValue::Budget(Some(budget)));
    assert!(!h.wizard.can_advance());

    let err = h.wizard.next().expect_err("refused");
    assert!(matches!(err, WizardError::StepInvalid { step: 1, key: "budget" }));
    assert_eq!(h.wizard.current_step(), 1);
}

#[test]
fn next_never_passes_an_invalid_step() {
    let mut h = harness();
    for _ in 0..10 {
        assert!(h.wizard.next().is_err());
        assert_eq!(h.wizard.current_step(), 0);
    }

    h.wizard.update(StepValue::Objective(Some(Objective::Engagement)));
    h.wizard.next().expect("advance");
    for _ in 0..3 {
        assert!(h.wizard.next().is_err());
        assert_eq!(h.wizard.current_step(), 1);
    }
}

#[test]
fn back_decrements_without_validation_and_floors_at_zero() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);
    h.wizard.update(StepValue::Budget(None));

    assert_eq!(h.wizard.back(), 3);
    assert_eq!(h.wizard.back(), 2);
    assert_eq!(h.wizard.back(), 1);
    assert_eq!(h.wizard.back(), 0);
    assert_eq!(h.wizard.back(), 0);
}

#[test]
fn update_is_visible_immediately_and_isolated_to_its_key() {
    let mut h = harness();
    h.wizard.update(StepValue::Objective(Some(Objective::Recognition)));
    h.wizard.update(StepValue::Localization(vec![avenue(3)]));
    let before = h.wizard.data().clone();

    h.wizard.update(StepValue::Budget(Some(promo_budget())));

    assert_eq!(
        h.wizard.value(DataKey::Budget),
        StepValue::Budget(Some(promo_budget()))
    );
    assert_eq!(h.wizard.data().objective, before.objective);
    assert_eq!(h.wizard.data().localization, before.localization);
    assert_eq!(h.wizard.data().medias, before.medias);
    assert_eq!(h.wizard.current_step(), 0);
}

#[test]
fn cancelling_discards_everything() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);

    h.wizard.close();
    assert!(!h.wizard.is_open());
    h.wizard.open();

    assert!(h.wizard.is_open());
    assert_eq!(h.wizard.current_step(), 0);
    assert!(h.wizard.data().is_empty());
    assert!(h.wizard.preview_url().is_none());
}

#[test]
fn too_long_video_is_rejected_and_reported() {
    let mut h = harness();
    let err = h
        .wizard
        .select_media(video("long.mp4", 20.0))
        .expect_err("rejected");

    assert_eq!(err, MediaRejection::TooLong(20.0));
    assert!(h.wizard.data().medias.is_none());
    let errors = h.notifier.errors.lock().expect("lock");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("15 second"));
    assert_eq!(h.previews.opened.load(Ordering::SeqCst), 0);
}

#[test]
fn rejected_file_keeps_previously_staged_media() {
    let mut h = harness();
    h.wizard.select_media(video("ok.mp4", 10.0)).expect("staged");

    let mut gif = video("anim.gif", 3.0);
    gif.mime_type = "image/gif".into();
    assert!(matches!(
        h.wizard.select_media(gif),
        Err(MediaRejection::UnsupportedType(_))
    ));

    assert_eq!(
        h.wizard.data().medias.as_ref().map(|m| m.file_name.as_str()),
        Some("ok.mp4")
    );
}

#[test]
fn preview_is_revoked_when_media_changes_or_wizard_closes() {
    let mut h = harness();
    h.wizard.select_media(video("a.mp4", 5.0)).expect("a");
    let first = h.wizard.preview_url().cloned().expect("preview");

    h.wizard.select_media(video("b.mp4", 5.0)).expect("b");
    assert_eq!(*h.previews.revoked.lock().expect("lock"), vec![first]);

    h.wizard.remove_media();
    assert!(h.wizard.preview_url().is_none());
    assert_eq!(h.previews.revoked.lock().expect("lock").len(), 2);

    h.wizard.select_media(video("c.mp4", 5.0)).expect("c");
    h.wizard.close();
    assert_eq!(h.previews.revoked.lock().expect("lock").len(), 3);
    assert_eq!(h.previews.opened.load(Ordering::SeqCst), 3);
}

#[test]
fn preview_is_revoked_when_controller_is_dropped() {
    let h = harness();
    let previews = h.previews.clone();
    let mut wizard = h.wizard;
    wizard.select_media(video("a.mp4", 5.0)).expect("a");
    drop(wizard);
    assert_eq!(previews.revoked.lock().expect("lock").len(), 1);
}

#[test]
fn entering_review_derives_summary() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);

    let summary = &h.wizard.data().resume.as_ref().expect("resume").summary;
    assert!(summary.contains("Ad name: Promo"));
    assert!(summary.contains("Objective: SALES"));
    assert!(summary.contains("R$ 150,00"));
    assert!(summary.contains("Semaforo 2"));
    assert!(h.wizard.can_advance());
}

#[tokio::test]
async fn submit_sends_staged_campaign_once_and_resets() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);
    let staged_localization = h.wizard.data().localization.clone();

    h.wizard.submit().await.expect("submit");

    let submissions = h.submitter.submissions.lock().expect("lock");
    assert_eq!(submissions.len(), 1);
    let sent = &submissions[0];
    assert_eq!(sent.dto.objective, Some(Objective::Sales));
    assert_eq!(sent.dto.budget.name, "Promo");
    assert_eq!(sent.dto.budget.kind, BudgetKind::Daily);
    assert_eq!(sent.dto.budget.amount, 150.0);
    assert_eq!(sent.dto.budget.schedule_start, "2025-01-01T00:00:00Z");
    assert_eq!(sent.dto.budget.schedule_end, "2025-01-31T00:00:00Z");
    assert_eq!(sent.dto.localization, staged_localization);
    assert_eq!(
        sent.media.as_ref().map(|m| m.file_name.as_str()),
        Some("promo.mp4")
    );

    assert_eq!(
        *h.cache.invalidated.lock().expect("lock"),
        vec![QueryScope::Campaigns]
    );
    assert_eq!(h.notifier.successes.lock().expect("lock").len(), 1);
    assert!(!h.wizard.is_open());
    assert_eq!(h.wizard.current_step(), 0);
    assert!(h.wizard.data().is_empty());
}

#[tokio::test]
async fn failed_submit_keeps_data_for_retry() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);
    let staged = h.wizard.data().clone();
    h.submitter.fail.store(true, Ordering::SeqCst);

    let err = h.wizard.submit().await.expect_err("failure");
    assert!(matches!(err, WizardError::Submission { .. }));
    assert!(!err.is_precondition_violation());
    assert!(h.wizard.is_open());
    assert!(h.wizard.is_last_step());
    assert_eq!(h.wizard.data(), &staged);
    assert!(h.cache.invalidated.lock().expect("lock").is_empty());
    assert_eq!(h.notifier.errors.lock().expect("lock").len(), 1);

    h.submitter.fail.store(false, Ordering::SeqCst);
    h.wizard.submit().await.expect("retry");
    assert_eq!(h.submitter.submissions.lock().expect("lock").len(), 2);
    assert_eq!(h.cache.invalidated.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn submit_before_review_is_refused() {
    let mut h = harness();
    h.wizard.update(StepValue::Budget(Some(promo_budget())));

    let err = h.wizard.submit().await.expect_err("not at review");
    assert!(matches!(err, WizardError::NotAtReview { step: 0 }));
    assert!(h.submitter.submissions.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn submit_without_budget_is_a_precondition_violation() {
    let mut h = harness();
    walk_to_review(&mut h.wizard);
    h.wizard.update(StepValue::Budget(None));

    let err = h.wizard.submit().await.expect_err("missing budget");
    assert!(matches!(err, WizardError::MissingBudget));
    assert!(err.is_precondition_violation());
    assert!(h.submitter.submissions.lock().expect("lock").is_empty());
    assert!(h.notifier.errors.lock().expect("lock").is_empty());
}

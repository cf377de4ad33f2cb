//! Owns the single active evaluation job.
//!
//! The coordinator is driven by one task through `&mut self`. Capture runs
//! inline; the scoring call runs in a spawned, abortable task that reports
//! back over a channel drained by [`SubmissionCoordinator::process_events`]
//! or [`SubmissionCoordinator::next_event`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time;

use ideascore_config::{DEFAULT_CADENCE_MS, DEFAULT_TIMEOUT_SECS, Settings};
use ideascore_providers::{ScoringRequest, ScoringResponse, ScoringService};
use ideascore_types::{
    BusinessIdea, DEFAULT_STAGES, ErrorKind, EvaluationJob, IdeaId, JobError, JobId, JobStatus,
    JobTransition, RawCapture, ValidationError,
};

use crate::capture::{CaptureAdapter, CaptureError, CaptureSource};
use crate::progress::{ProgressSnapshot, ProgressStageTracker};
use crate::result_store::ResultStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Ceiling on the whole scoring call, retries included.
    pub timeout: Duration,
    pub cadence: Duration,
    pub stages: Vec<String>,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cadence: Duration::from_millis(DEFAULT_CADENCE_MS),
            stages: DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CoordinatorSettings {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.scoring.timeout,
            cadence: settings.progress.cadence,
            stages: settings.progress.stages.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("job {job} is still in flight; cancel it first")]
    JobInFlight { job: JobId },
}

impl SubmitError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::JobInFlight { .. } => ErrorKind::Validation,
            Self::Capture(err) => err.kind(),
        }
    }
}

#[derive(Debug)]
enum TaskEvent {
    /// The request is on its way to the service.
    Dispatched,
    Finished(Result<ScoringResponse, JobError>),
}

struct ActiveSubmission {
    abort_handle: AbortHandle,
    events: mpsc::UnboundedReceiver<TaskEvent>,
    idea_id: IdeaId,
    language: String,
}

pub struct SubmissionCoordinator {
    scorer: Arc<dyn ScoringService>,
    store: ResultStore,
    settings: CoordinatorSettings,
    job: Option<EvaluationJob>,
    active: Option<ActiveSubmission>,
    tracker: ProgressStageTracker,
    subscribers: Vec<mpsc::UnboundedSender<JobTransition>>,
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("settings", &self.settings)
            .field("job", &self.job)
            .field("in_flight", &self.active.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl SubmissionCoordinator {
    #[must_use]
    pub fn new(
        scorer: Arc<dyn ScoringService>,
        store: ResultStore,
        settings: CoordinatorSettings,
    ) -> Self {
        let tracker = ProgressStageTracker::new(settings.stages.clone(), settings.cadence);
        Self {
            scorer,
            store,
            settings,
            job: None,
            active: None,
            tracker,
            subscribers: Vec::new(),
        }
    }

    #[must_use]
    pub fn job(&self) -> Option<&EvaluationJob> {
        self.job.as_ref()
    }

    /// Status of the current job, `Idle` when there is none.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.job
            .as_ref()
            .map_or(JobStatus::Idle, EvaluationJob::status)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    #[must_use]
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Receive every job transition from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<JobTransition> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Capture and extract source text for a new job.
    ///
    /// On success the job is left in `Extracting` and the next
    /// [`submit`](Self::submit) continues it. On failure the job ends in
    /// `Failed` (or `Cancelled` when the user dismissed the picker) and a
    /// fresh capture may start right away.
    pub async fn capture(
        &mut self,
        adapter: &CaptureAdapter,
        source: CaptureSource,
    ) -> Result<RawCapture, SubmitError> {
        self.ensure_not_in_flight()?;
        self.discard_stale_job();
        self.job = Some(EvaluationJob::new(self.settings.stages.clone()));
        self.move_to(JobStatus::Capturing);

        let acquired = match adapter.acquire(source).await {
            Ok(acquired) => acquired,
            Err(err) => return Err(self.capture_failed(err)),
        };

        self.move_to(JobStatus::Extracting);
        match adapter.extract(acquired).await {
            Ok(capture) => Ok(capture),
            Err(err) => Err(self.capture_failed(err)),
        }
    }

    fn capture_failed(&mut self, err: CaptureError) -> SubmitError {
        if err.kind().is_silent() {
            tracing::debug!("Capture dismissed");
        } else {
            tracing::warn!("Capture failed: {err}");
        }
        self.fail_job(JobError::new(err.kind(), err.to_string()));
        SubmitError::Capture(err)
    }

    /// Validate `idea` and start scoring it.
    ///
    /// Validation happens first and has no side effects when it fails.
    /// Exactly one scoring request is issued per job; a second call while one
    /// is outstanding fails with [`SubmitError::JobInFlight`].
    pub fn submit(&mut self, idea: &BusinessIdea) -> Result<JobId, SubmitError> {
        let idea = idea.validated()?;
        self.ensure_not_in_flight()?;

        // A job that just finished extracting continues; anything else starts over.
        if self.status() != JobStatus::Extracting {
            self.discard_stale_job();
            self.job = None;
        }
        let stages = self.settings.stages.clone();
        let job_id = self
            .job
            .get_or_insert_with(|| EvaluationJob::new(stages))
            .id();
        self.move_to(JobStatus::Submitting);

        let (tx, rx) = mpsc::unbounded_channel();
        let (abort_handle, abort_registration) = AbortHandle::new_pair();

        let scorer = Arc::clone(&self.scorer);
        let timeout = self.settings.timeout;
        let request = ScoringRequest::from_idea(&idea);

        let task = async move {
            let _ = tx.send(TaskEvent::Dispatched);
            let outcome = match time::timeout(timeout, scorer.score(request)).await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(err)) => {
                    tracing::warn!("Scoring request failed: {err}");
                    Err(JobError::new(err.kind(), err.to_string()))
                }
                Err(_) => {
                    tracing::warn!(timeout_secs = timeout.as_secs(), "Scoring request timed out");
                    Err(JobError::new(
                        ErrorKind::Timeout,
                        format!("no result within {} seconds", timeout.as_secs()),
                    ))
                }
            };
            let _ = tx.send(TaskEvent::Finished(outcome));
        };

        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });

        self.active = Some(ActiveSubmission {
            abort_handle,
            events: rx,
            idea_id: idea.id,
            language: idea.language,
        });
        self.tracker.start();

        tracing::info!(job = %job_id, industry = %idea.industry, "Submitted idea for scoring");
        Ok(job_id)
    }

    /// Drain every pending task event without blocking.
    pub fn process_events(&mut self) {
        while let Some(active) = self.active.as_mut() {
            match active.events.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.task_vanished(),
            }
        }
        self.sync_stage();
    }

    /// Wait for the next task event and apply it.
    ///
    /// Returns `false` when nothing is in flight. Cancel-safe: dropping the
    /// future before it resolves loses no event.
    pub async fn next_event(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        match active.events.recv().await {
            Some(event) => self.handle_event(event),
            None => self.task_vanished(),
        }
        self.sync_stage();
        true
    }

    /// Apply events until the in-flight job resolves.
    pub async fn wait(&mut self) -> JobStatus {
        while self.next_event().await {}
        self.status()
    }

    /// Abort the current job. Returns `false` if there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        if self.job.as_ref().is_none_or(|job| job.status().is_terminal()) {
            return false;
        }
        if let Some(active) = self.active.take() {
            active.abort_handle.abort();
        }
        self.tracker.stop();
        let cancelled = self.fail_job(JobError::cancelled());
        if cancelled {
            tracing::info!("Evaluation cancelled");
        }
        cancelled
    }

    /// The progress view went away. The job itself keeps running.
    pub fn dismiss_progress(&mut self) {
        self.tracker.dismiss();
    }

    fn handle_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Dispatched => {
                self.move_to(JobStatus::Processing);
            }
            TaskEvent::Finished(outcome) => self.finish(outcome),
        }
    }

    fn task_vanished(&mut self) {
        self.finish(Err(JobError::new(
            ErrorKind::Server,
            "scoring task ended without a result",
        )));
    }

    fn finish(&mut self, outcome: Result<ScoringResponse, JobError>) {
        let Some(active) = self.active.take() else {
            return;
        };
        match outcome {
            Ok(response) => {
                self.sync_stage();
                let result = response.into_result(active.idea_id, &active.language);
                let score = result.overall_score();
                let version = self.store.set_result(result);
                self.tracker.complete();
                self.move_to(JobStatus::Succeeded);
                tracing::info!(score, version, "Evaluation succeeded");
            }
            Err(error) => {
                self.tracker.fail();
                self.fail_job(error);
            }
        }
    }

    fn ensure_not_in_flight(&self) -> Result<(), SubmitError> {
        match &self.job {
            Some(job) if job.status().is_in_flight() => {
                Err(SubmitError::JobInFlight { job: job.id() })
            }
            _ => Ok(()),
        }
    }

    /// A job left mid-capture (its future was dropped) is cancelled before a
    /// new one replaces it.
    fn discard_stale_job(&mut self) {
        if self
            .job
            .as_ref()
            .is_some_and(|job| !job.status().is_terminal())
        {
            self.fail_job(JobError::cancelled());
        }
    }

    fn sync_stage(&mut self) {
        let cursor = self.tracker.cursor();
        if let Some(job) = self.job.as_mut() {
            job.advance_stage(cursor);
        }
    }

    fn move_to(&mut self, next: JobStatus) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        match job.transition(next) {
            Ok(transition) => {
                self.emit(transition);
                true
            }
            Err(err) => {
                tracing::warn!("Ignoring job transition: {err}");
                false
            }
        }
    }

    fn fail_job(&mut self, error: JobError) -> bool {
        let Some(job) = self.job.as_mut() else {
            return false;
        };
        match job.fail(error) {
            Ok(transition) => {
                self.emit(transition);
                true
            }
            Err(err) => {
                tracing::warn!("Ignoring job failure: {err}");
                false
            }
        }
    }

    fn emit(&mut self, transition: JobTransition) {
        tracing::debug!(
            job = %transition.job,
            from = %transition.from,
            to = %transition.to,
            "Job transition"
        );
        self.subscribers.retain(|tx| tx.send(transition).is_ok());
    }
}

impl Drop for SubmissionCoordinator {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.abort_handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use ideascore_providers::{ScoreFut, ScoringError};
    use ideascore_types::IdeaField;

    use super::*;
    use crate::capture::{CaptureLimits, CaptureSource};
    use crate::progress::{ProgressPhase, StageStatus};

    struct FakeScorer {
        calls: AtomicU32,
        delay: Duration,
        outcome: Result<ScoringResponse, ScoringError>,
    }

    impl FakeScorer {
        fn ok(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                delay,
                outcome: Ok(response()),
            })
        }

        fn err(delay: Duration, error: ScoringError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                delay,
                outcome: Err(error),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ScoringService for FakeScorer {
        fn score(&self, request: ScoringRequest) -> ScoreFut<'_> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!request.title.is_empty());
            Box::pin(async move {
                time::sleep(self.delay).await;
                self.outcome.clone()
            })
        }
    }

    fn response() -> ScoringResponse {
        serde_json::from_value(serde_json::json!({
            "id": "res-1",
            "overall_score": 78,
            "confidence": 0.92,
            "structured_data": {"Key_USP": "Works off-grid"}
        }))
        .unwrap()
    }

    fn idea() -> BusinessIdea {
        BusinessIdea::new(
            "Solar kiosk",
            "Solar-powered kiosk for rural vendors",
            "energy",
        )
    }

    fn coordinator(scorer: Arc<FakeScorer>) -> SubmissionCoordinator {
        SubmissionCoordinator::new(
            scorer,
            ResultStore::in_memory(),
            CoordinatorSettings {
                timeout: Duration::from_secs(20),
                cadence: Duration::from_secs(1),
                stages: DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect(),
            },
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<JobTransition>) -> Vec<(JobStatus, JobStatus)> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|t| (t.from, t.to))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submission_stores_result() {
        let scorer = FakeScorer::ok(Duration::from_millis(3500));
        let mut coordinator = coordinator(Arc::clone(&scorer));
        let mut transitions = coordinator.subscribe();

        coordinator.submit(&idea()).unwrap();
        assert_eq!(coordinator.status(), JobStatus::Submitting);

        time::sleep(Duration::from_millis(1500)).await;
        coordinator.process_events();
        assert_eq!(coordinator.status(), JobStatus::Processing);
        assert_eq!(coordinator.progress().cursor, 1);
        assert_eq!(coordinator.job().unwrap().current_stage(), 1);

        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
        assert_eq!(scorer.calls(), 1);

        let stored = coordinator.store().get_result().unwrap();
        assert_eq!(stored.id().as_str(), "res-1");
        assert!((stored.overall_score() - 78.0).abs() < f64::EPSILON);
        assert_eq!(stored.language(), "en-IN");

        assert_eq!(
            drain(&mut transitions),
            vec![
                (JobStatus::Idle, JobStatus::Submitting),
                (JobStatus::Submitting, JobStatus::Processing),
                (JobStatus::Processing, JobStatus::Succeeded),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn early_result_completes_every_stage() {
        let scorer = FakeScorer::ok(Duration::from_millis(1200));
        let mut coordinator = coordinator(scorer);
        coordinator.submit(&idea()).unwrap();

        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
        let snapshot = coordinator.progress();
        assert_eq!(snapshot.phase, ProgressPhase::Completed);
        assert!(
            snapshot
                .stages
                .iter()
                .all(|s| s.status == StageStatus::Completed)
        );
        assert_eq!(snapshot.percent, 100);
        assert_eq!(coordinator.job().unwrap().current_stage(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_in_flight_is_rejected() {
        let scorer = FakeScorer::ok(Duration::from_secs(2));
        let mut coordinator = coordinator(Arc::clone(&scorer));

        let first = coordinator.submit(&idea()).unwrap();
        let err = coordinator.submit(&idea()).unwrap_err();
        assert!(matches!(err, SubmitError::JobInFlight { job } if job == first));

        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
        assert_eq!(coordinator.job().unwrap().id(), first);
        assert_eq!(scorer.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_everything_and_allows_a_fresh_job() {
        let scorer = FakeScorer::ok(Duration::from_secs(10));
        let mut coordinator = coordinator(Arc::clone(&scorer));

        let first = coordinator.submit(&idea()).unwrap();
        time::sleep(Duration::from_millis(1500)).await;
        coordinator.process_events();

        assert!(coordinator.cancel());
        assert_eq!(coordinator.status(), JobStatus::Cancelled);
        assert!(coordinator.job().unwrap().error().unwrap().kind.is_silent());
        assert_eq!(coordinator.progress().phase, ProgressPhase::Stopped);
        assert!(!coordinator.cancel(), "already terminal");

        // The aborted request never lands.
        time::sleep(Duration::from_secs(15)).await;
        coordinator.process_events();
        assert_eq!(coordinator.status(), JobStatus::Cancelled);
        assert!(coordinator.store().get_result().is_none());

        let second = coordinator.submit(&idea()).unwrap();
        assert_ne!(first, second);
        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
        assert_eq!(scorer.calls(), 2);
        assert!(coordinator.store().get_result().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_yields_timeout() {
        let scorer = FakeScorer::ok(Duration::from_secs(60));
        let mut coordinator = SubmissionCoordinator::new(
            scorer,
            ResultStore::in_memory(),
            CoordinatorSettings {
                timeout: Duration::from_secs(5),
                ..CoordinatorSettings::default()
            },
        );

        coordinator.submit(&idea()).unwrap();
        assert_eq!(coordinator.wait().await, JobStatus::Failed);
        let error = coordinator.job().unwrap().error().unwrap();
        assert_eq!(error.kind, ErrorKind::Timeout);
        assert!(error.kind.is_retryable());
        assert_eq!(coordinator.progress().phase, ProgressPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn server_failure_halts_progress() {
        let scorer = FakeScorer::err(
            Duration::from_millis(2500),
            ScoringError::Server {
                status: 503,
                message: "overloaded".to_string(),
            },
        );
        let mut coordinator = coordinator(scorer);

        coordinator.submit(&idea()).unwrap();
        assert_eq!(coordinator.wait().await, JobStatus::Failed);
        assert_eq!(
            coordinator.job().unwrap().error().unwrap().kind,
            ErrorKind::Server
        );

        let snapshot = coordinator.progress();
        assert_eq!(snapshot.phase, ProgressPhase::Failed);
        assert_eq!(snapshot.stages[2].status, StageStatus::Failed);
        assert!(coordinator.store().get_result().is_none());

        // Stays put afterwards.
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(coordinator.progress(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_idea_has_no_side_effects() {
        let scorer = FakeScorer::ok(Duration::ZERO);
        let mut coordinator = coordinator(Arc::clone(&scorer));
        let mut transitions = coordinator.subscribe();

        let bad = BusinessIdea::new("  ", "too short", "Space Mining");
        let err = coordinator.submit(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let SubmitError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert!(validation.has(IdeaField::Title));
        assert!(validation.has(IdeaField::Description));
        assert!(validation.has(IdeaField::Industry));

        time::sleep(Duration::from_secs(1)).await;
        assert!(coordinator.job().is_none());
        assert_eq!(coordinator.progress().phase, ProgressPhase::Idle);
        assert_eq!(scorer.calls(), 0);
        assert!(drain(&mut transitions).is_empty());
    }

    #[tokio::test]
    async fn capture_continues_into_submission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idea.txt");
        std::fs::write(&path, "Solar-powered kiosk for rural vendors\r\n").unwrap();

        let scorer = FakeScorer::ok(Duration::ZERO);
        let mut coordinator = coordinator(scorer);
        let mut transitions = coordinator.subscribe();
        let adapter = CaptureAdapter::new(CaptureLimits::default());

        let capture = coordinator
            .capture(&adapter, CaptureSource::Upload(path))
            .await
            .unwrap();
        assert_eq!(capture.text, "Solar-powered kiosk for rural vendors");
        assert_eq!(coordinator.status(), JobStatus::Extracting);
        let job = coordinator.job().unwrap().id();

        let idea = BusinessIdea::from_capture(&capture, "Solar kiosk", "Energy");
        assert_eq!(coordinator.submit(&idea).unwrap(), job);
        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);

        assert_eq!(
            drain(&mut transitions),
            vec![
                (JobStatus::Idle, JobStatus::Capturing),
                (JobStatus::Capturing, JobStatus::Extracting),
                (JobStatus::Extracting, JobStatus::Submitting),
                (JobStatus::Submitting, JobStatus::Processing),
                (JobStatus::Processing, JobStatus::Succeeded),
            ]
        );
    }

    #[tokio::test]
    async fn capture_failure_is_terminal_and_recoverable() {
        let scorer = FakeScorer::ok(Duration::ZERO);
        let mut coordinator = coordinator(scorer);
        let adapter = CaptureAdapter::new(CaptureLimits::default());

        let err = coordinator
            .capture(&adapter, CaptureSource::Camera)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Device);
        assert_eq!(coordinator.status(), JobStatus::Failed);
        let failed = coordinator.job().unwrap().id();

        // A different modality starts over.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idea.md");
        std::fs::write(&path, "Solar-powered kiosk for rural vendors").unwrap();
        coordinator
            .capture(&adapter, CaptureSource::Upload(path))
            .await
            .unwrap();
        assert_ne!(coordinator.job().unwrap().id(), failed);
        assert_eq!(coordinator.status(), JobStatus::Extracting);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_is_refused_while_in_flight() {
        let scorer = FakeScorer::ok(Duration::from_secs(5));
        let mut coordinator = coordinator(scorer);
        let adapter = CaptureAdapter::new(CaptureLimits::default());

        let job = coordinator.submit(&idea()).unwrap();
        let err = coordinator
            .capture(&adapter, CaptureSource::Microphone)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::JobInFlight { job: id } if id == job));
        assert_eq!(coordinator.status(), JobStatus::Submitting);
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_progress_keeps_the_job_running() {
        let scorer = FakeScorer::ok(Duration::from_secs(3));
        let mut coordinator = coordinator(scorer);

        coordinator.submit(&idea()).unwrap();
        coordinator.dismiss_progress();
        assert_eq!(coordinator.progress().phase, ProgressPhase::Stopped);

        assert_eq!(coordinator.wait().await, JobStatus::Succeeded);
        assert!(coordinator.store().get_result().is_some());
    }
}

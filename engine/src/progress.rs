//! Synthetic stage cursor shown while a scoring request is outstanding.
//!
//! The cursor advances on a fixed cadence and is not tied to real backend
//! progress. It never reaches completion on its own: it holds on the last
//! stage until [`ProgressStageTracker::complete`] is called with the real
//! outcome, which marks every stage complete at once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time;

use ideascore_types::DEFAULT_STAGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    /// Cancelled, or the consuming view went away.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub label: String,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: ProgressPhase,
    pub cursor: usize,
    pub stages: Vec<StageView>,
    /// Share of stages completed, 100 only once the real result arrived.
    pub percent: u8,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn active_label(&self) -> Option<&str> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::Active)
            .map(|s| s.label.as_str())
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    phase: ProgressPhase,
    cursor: usize,
}

fn lock(state: &Mutex<ProgressState>) -> MutexGuard<'_, ProgressState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct ProgressStageTracker {
    stages: Arc<[String]>,
    cadence: Duration,
    state: Arc<Mutex<ProgressState>>,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressStageTracker {
    /// `stages` must not be empty; an empty list falls back to the defaults.
    #[must_use]
    pub fn new(stages: Vec<String>, cadence: Duration) -> Self {
        let stages: Arc<[String]> = if stages.is_empty() {
            DEFAULT_STAGES.iter().map(|s| (*s).to_string()).collect()
        } else {
            stages.into()
        };
        Self {
            stages,
            cadence: cadence.max(Duration::from_millis(1)),
            state: Arc::new(Mutex::new(ProgressState::default())),
            ticker: None,
        }
    }

    #[must_use]
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    #[must_use]
    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Reset to the first stage and start the cadence. Requires a tokio runtime.
    pub fn start(&mut self) {
        self.cancel_ticker();
        {
            let mut state = lock(&self.state);
            state.phase = ProgressPhase::Running;
            state.cursor = 0;
        }

        let state = Arc::clone(&self.state);
        let last = self.stages.len() - 1;
        let cadence = self.cadence;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval(cadence);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut state = lock(&state);
                if state.phase != ProgressPhase::Running {
                    break;
                }
                if state.cursor < last {
                    state.cursor += 1;
                    tracing::debug!(cursor = state.cursor, "Progress stage advanced");
                }
                if state.cursor >= last {
                    // Hold on the last stage until the real outcome arrives.
                    break;
                }
            }
        }));
    }

    /// The real result arrived: every stage is complete.
    pub fn complete(&mut self) {
        self.finish(ProgressPhase::Completed);
    }

    /// The backend failed: halt on the current stage and show it failed.
    pub fn fail(&mut self) {
        self.finish(ProgressPhase::Failed);
    }

    /// Stop animating without reporting an outcome (cancel).
    pub fn stop(&mut self) {
        self.finish(ProgressPhase::Stopped);
    }

    /// The consuming view went away. Only stops a running cadence.
    pub fn dismiss(&mut self) {
        if self.phase() == ProgressPhase::Running {
            self.stop();
        } else {
            self.cancel_ticker();
        }
    }

    fn finish(&mut self, phase: ProgressPhase) {
        self.cancel_ticker();
        let mut state = lock(&self.state);
        if phase == ProgressPhase::Completed {
            state.cursor = self.stages.len() - 1;
        }
        state.phase = phase;
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// True while a cadence task is alive.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    #[must_use]
    pub fn phase(&self) -> ProgressPhase {
        lock(&self.state).phase
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        lock(&self.state).cursor
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let (phase, cursor) = {
            let state = lock(&self.state);
            (state.phase, state.cursor)
        };

        let status_of = |index: usize| match phase {
            ProgressPhase::Idle => StageStatus::Pending,
            ProgressPhase::Completed => StageStatus::Completed,
            _ if index < cursor => StageStatus::Completed,
            ProgressPhase::Running if index == cursor => StageStatus::Active,
            ProgressPhase::Failed if index == cursor => StageStatus::Failed,
            _ => StageStatus::Pending,
        };

        let stages: Vec<StageView> = self
            .stages
            .iter()
            .enumerate()
            .map(|(index, label)| StageView {
                label: label.clone(),
                status: status_of(index),
            })
            .collect();

        let done = stages
            .iter()
            .filter(|s| s.status == StageStatus::Completed)
            .count();
        let percent = if phase == ProgressPhase::Completed {
            100
        } else {
            // Strictly below 100 until completion, even with one stage.
            ((done * 100) / stages.len()).min(99) as u8
        };

        ProgressSnapshot {
            phase,
            cursor,
            stages,
            percent,
        }
    }
}

impl Drop for ProgressStageTracker {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

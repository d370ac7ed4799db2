use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use aac_core::analytics::{
    self, ChartSeries, IndependenceWindow, PhaseProgress, ProgressScorePoint,
};
use aac_core::model::{Card, CardFilter, CardId, LearnerId, PhaseFilter, PhaseId, PhaseLog};
use aac_core::Clock;
use storage::repository::{ActivityLogRepository, CardRepository};

use crate::error::DashboardError;
use crate::projection_service::{IndependenceDuration, ProjectionService};

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

/// Immutable result of one fetch pass, tagged with the generation that
/// produced it.
///
/// Everything computed off a snapshot is synchronous and pure; re-running
/// any accessor on an unchanged snapshot yields identical output.
#[derive(Clone)]
pub struct LogSnapshot {
    generation: u64,
    learner: LearnerId,
    log: PhaseLog,
    cards: Vec<Card>,
}

impl LogSnapshot {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn learner(&self) -> &LearnerId {
        &self.learner
    }

    #[must_use]
    pub fn log(&self) -> &PhaseLog {
        &self.log
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Independence windows for one phase. A phase absent from the log
    /// reads as empty.
    #[must_use]
    pub fn windows(&self, phase: PhaseId) -> HashMap<CardId, IndependenceWindow> {
        let Some(entry) = self.log.phase(phase) else {
            return HashMap::new();
        };
        let card_index: HashMap<CardId, Card> = self
            .cards
            .iter()
            .map(|card| (card.id.clone(), card.clone()))
            .collect();
        analytics::compute_windows(phase, &entry.sessions, &card_index)
    }

    /// Per-phase mastery rollup for the gauge view.
    #[must_use]
    pub fn phase_progress(&self, phase: PhaseId) -> PhaseProgress {
        let windows = self.windows(phase);
        analytics::aggregate(phase, &self.cards, &windows)
    }

    /// Bucketed prompt-type series for the chart view.
    #[must_use]
    pub fn chart(
        &self,
        phase_filter: PhaseFilter,
        card_filter: &CardFilter,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ChartSeries {
        analytics::build_series(&self.log, phase_filter, card_filter, start_date, end_date)
    }

    /// Daily mastery-percentage series for one phase.
    #[must_use]
    pub fn score_series(&self, phase: PhaseId) -> Vec<ProgressScorePoint> {
        let sessions: Vec<_> = self.log.sessions(phase).cloned().collect();
        analytics::score_series(&sessions)
    }

    /// Window durations for one phase, ascending by completion instant —
    /// the ordered series the projection endpoint expects.
    #[must_use]
    pub fn independence_durations(&self, phase: PhaseId) -> Vec<Duration> {
        let mut windows: Vec<IndependenceWindow> = self.windows(phase).into_values().collect();
        windows.sort_by_key(|window| window.completion);
        windows.iter().map(IndependenceWindow::duration).collect()
    }

    /// Total time the learner has spent in a phase; an open interval is
    /// treated as exited `now`.
    #[must_use]
    pub fn time_in_phase(&self, phase: PhaseId, now: DateTime<Utc>) -> Duration {
        self.log
            .phase(phase)
            .map_or_else(Duration::zero, |entry| entry.time_in_phase(now))
    }
}

//
// ─── DASHBOARD SERVICE ────────────────────────────────────────────────────────
//

/// Fetch-then-compute pipeline behind the progress dashboard.
///
/// The fetch side is async and single-shot: each `load_snapshot` call bumps
/// a generation counter, and `is_current` lets a caller discard a response
/// that a newer input change has superseded. In-flight requests are never
/// cancelled; staleness is handled by dropping outdated snapshots.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    logs: Arc<dyn ActivityLogRepository>,
    cards: Arc<dyn CardRepository>,
    generation: Arc<AtomicU64>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        clock: Clock,
        logs: Arc<dyn ActivityLogRepository>,
        cards: Arc<dyn CardRepository>,
    ) -> Self {
        Self {
            clock,
            logs,
            cards,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetch the learner's log and card set as one snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` when either fetch fails. Nothing is
    /// retried and nothing from a failed pass is cached.
    pub async fn load_snapshot(&self, learner: &LearnerId) -> Result<LogSnapshot, DashboardError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(learner = %learner, generation, "loading activity log");

        let log = self.logs.phase_log(learner).await?;
        let cards = self.cards.cards_for_learner(learner).await?;

        Ok(LogSnapshot {
            generation,
            learner: learner.clone(),
            log,
            cards,
        })
    }

    /// True when no newer fetch has started since this snapshot was taken.
    #[must_use]
    pub fn is_current(&self, snapshot: &LogSnapshot) -> bool {
        snapshot.generation == self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Time spent in a phase as of the service clock.
    #[must_use]
    pub fn time_in_phase(&self, snapshot: &LogSnapshot, phase: PhaseId) -> Duration {
        snapshot.time_in_phase(phase, self.clock.now())
    }

    /// Ask the external smoothing service for a remaining-time forecast over
    /// the phase's full duration series.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Projection` on any client failure; callers
    /// fall back to the aggregator's naive estimate for display, never to a
    /// value computed here.
    pub async fn projected_remaining(
        &self,
        snapshot: &LogSnapshot,
        phase: PhaseId,
        projection: &ProjectionService,
    ) -> Result<Duration, DashboardError> {
        let series: Vec<IndependenceDuration> = snapshot
            .independence_durations(phase)
            .into_iter()
            .map(IndependenceDuration::from_duration)
            .collect();
        let end = series.len();

        let predicted = projection.predict_remaining(&series, 0, end).await?;
        Ok(predicted)
    }
}

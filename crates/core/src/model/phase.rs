use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::ids::{CardId, SessionId};
use crate::model::session::Session;

/// Category reserved for phase 3 of the curriculum.
pub const EMOTIONS_CATEGORY: &str = "Emotions";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur while parsing phase identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhaseParseError {
    #[error("invalid phase id: {0}")]
    InvalidPhase(String),
}

//
// ─── PHASE ID ─────────────────────────────────────────────────────────────────
//

/// One of the three ordered stages of a learner's curriculum.
///
/// Card membership per phase is gated by category: phase 1 admits every
/// card, phase 2 excludes the `Emotions` category, phase 3 admits only it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseId {
    One,
    Two,
    Three,
}

impl PhaseId {
    pub const ALL: [PhaseId; 3] = [PhaseId::One, PhaseId::Two, PhaseId::Three];

    /// Store key for this phase (`"1"`, `"2"`, or `"3"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseId::One => "1",
            PhaseId::Two => "2",
            PhaseId::Three => "3",
        }
    }

    /// Whether a card of the given category belongs to this phase.
    #[must_use]
    pub fn admits_category(self, category: &str) -> bool {
        match self {
            PhaseId::One => true,
            PhaseId::Two => category != EMOTIONS_CATEGORY,
            PhaseId::Three => category == EMOTIONS_CATEGORY,
        }
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PhaseId {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(PhaseId::One),
            "2" => Ok(PhaseId::Two),
            "3" => Ok(PhaseId::Three),
            other => Err(PhaseParseError::InvalidPhase(other.to_string())),
        }
    }
}

//
// ─── PHASE ────────────────────────────────────────────────────────────────────
//

/// Everything logged for one phase: the time intervals the learner spent in
/// it and the practice sessions that happened inside it.
///
/// `entry_timestamps[i]` / `exit_timestamps[i]` bracket the i-th interval.
/// An entry without a matching exit means the learner is still in the phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Phase {
    pub entry_timestamps: Vec<DateTime<Utc>>,
    pub exit_timestamps: Vec<DateTime<Utc>>,
    pub sessions: BTreeMap<SessionId, Session>,
}

impl Phase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time spent in this phase across all bracketed intervals.
    ///
    /// An open interval (entry without exit) is treated as exited `now`.
    /// Intervals that would run backwards contribute nothing.
    #[must_use]
    pub fn time_in_phase(&self, now: DateTime<Utc>) -> Duration {
        let mut total = Duration::zero();
        for (i, entry) in self.entry_timestamps.iter().enumerate() {
            let exit = self.exit_timestamps.get(i).copied().unwrap_or(now);
            if exit > *entry {
                total += exit - *entry;
            }
        }
        total
    }
}

//
// ─── PHASE LOG ────────────────────────────────────────────────────────────────
//

/// The full per-learner activity log, keyed by phase.
///
/// A phase with no entry reads as empty; fetches for different phases land
/// independently, so consumers must tolerate partial data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseLog {
    phases: BTreeMap<PhaseId, Phase>,
}

impl PhaseLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: PhaseId, phase: Phase) {
        self.phases.insert(id, phase);
    }

    #[must_use]
    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.get(&id)
    }

    /// Sessions for one phase; empty when the phase has no entry.
    pub fn sessions(&self, id: PhaseId) -> impl Iterator<Item = &Session> {
        self.phases
            .get(&id)
            .into_iter()
            .flat_map(|phase| phase.sessions.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhaseId, &Phase)> {
        self.phases.iter().map(|(id, phase)| (*id, phase))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

//
// ─── FILTERS ──────────────────────────────────────────────────────────────────
//

/// Phase selector for chart queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseFilter {
    #[default]
    All,
    Only(PhaseId),
}

impl PhaseFilter {
    #[must_use]
    pub fn matches(self, id: PhaseId) -> bool {
        match self {
            PhaseFilter::All => true,
            PhaseFilter::Only(only) => only == id,
        }
    }
}

/// Card selector for chart queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CardFilter {
    #[default]
    All,
    Only(CardId),
}

impl CardFilter {
    #[must_use]
    pub fn matches(&self, id: &CardId) -> bool {
        match self {
            CardFilter::All => true,
            CardFilter::Only(only) => only == id,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

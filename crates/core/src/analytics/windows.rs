use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::model::{Card, CardId, PhaseId, Session, SessionId};

/// Reconstructed span from a card's first observed trial to its mastery
/// instant, within one phase.
///
/// Derived from the log on every call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndependenceWindow {
    pub first_instance: DateTime<Utc>,
    pub completion: DateTime<Utc>,
}

impl IndependenceWindow {
    /// Time from first appearance to mastery.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.completion - self.first_instance
    }
}

/// Derives per-card independence windows for one phase.
///
/// A trial contributes only when its card carries a stored completion
/// instant for `phase`; everything else is skipped. The window seeds from
/// the first contributing trial and the stored completion, then every trial
/// pulls `first_instance` back to the earliest observed timestamp and pushes
/// `completion` forward to the latest one. Late-logged trials therefore
/// extend the window past the stored mastery instant; that widening is
/// intentional and must not be "corrected" to the stored value.
///
/// Every emitted window satisfies `completion >= first_instance`. A phase
/// with no completed cards yields an empty map; callers guard the
/// denominator before averaging over it.
#[must_use]
pub fn compute_windows(
    phase: PhaseId,
    sessions: &BTreeMap<SessionId, Session>,
    cards: &HashMap<CardId, Card>,
) -> HashMap<CardId, IndependenceWindow> {
    let mut windows: HashMap<CardId, IndependenceWindow> = HashMap::new();

    for session in sessions.values() {
        for trial in session.trials.values() {
            let Some(card) = cards.get(&trial.card_id) else {
                continue;
            };
            let Some(completion) = card.completion_in(phase) else {
                continue;
            };

            let window = windows
                .entry(trial.card_id.clone())
                .or_insert(IndependenceWindow {
                    first_instance: trial.timestamp,
                    completion,
                });
            window.first_instance = window.first_instance.min(trial.timestamp);
            window.completion = window.completion.max(trial.timestamp);
        }
    }

    windows
}

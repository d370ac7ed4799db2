use chrono::{DateTime, Utc};

use crate::model::ids::CardId;
use crate::model::phase::PhaseId;

/// A picture card with its per-phase mastery state.
///
/// A card is "proficient" in a phase once the matching independence flag is
/// true; the completion instant records when that flag was set. Both are
/// written by the logging side and read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub category: String,
    pub phase1_independence: bool,
    pub phase2_independence: bool,
    pub phase3_independence: bool,
    pub phase1_completion: Option<DateTime<Utc>>,
    pub phase2_completion: Option<DateTime<Utc>>,
    pub phase3_completion: Option<DateTime<Utc>>,
}

impl Card {
    #[must_use]
    pub fn new(id: CardId, category: impl Into<String>) -> Self {
        Self {
            id,
            category: category.into(),
            phase1_independence: false,
            phase2_independence: false,
            phase3_independence: false,
            phase1_completion: None,
            phase2_completion: None,
            phase3_completion: None,
        }
    }

    /// Whether the card belongs to the given phase (category gate).
    #[must_use]
    pub fn in_phase(&self, phase: PhaseId) -> bool {
        phase.admits_category(&self.category)
    }

    /// Whether the learner has reached independence with this card in the
    /// given phase.
    #[must_use]
    pub fn independent_in(&self, phase: PhaseId) -> bool {
        match phase {
            PhaseId::One => self.phase1_independence,
            PhaseId::Two => self.phase2_independence,
            PhaseId::Three => self.phase3_independence,
        }
    }

    /// Stored mastery instant for the given phase, if the card has one.
    #[must_use]
    pub fn completion_in(&self, phase: PhaseId) -> Option<DateTime<Utc>> {
        match phase {
            PhaseId::One => self.phase1_completion,
            PhaseId::Two => self.phase2_completion,
            PhaseId::Three => self.phase3_completion,
        }
    }

    /// Sets the independence flag and completion instant for a phase.
    pub fn mark_independent(&mut self, phase: PhaseId, at: DateTime<Utc>) {
        match phase {
            PhaseId::One => {
                self.phase1_independence = true;
                self.phase1_completion = Some(at);
            }
            PhaseId::Two => {
                self.phase2_independence = true;
                self.phase2_completion = Some(at);
            }
            PhaseId::Three => {
                self.phase3_independence = true;
                self.phase3_completion = Some(at);
            }
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CardId;

//
// ─── PROMPT TYPE ──────────────────────────────────────────────────────────────
//

/// Assistance level recorded for a single trial.
///
/// Five prompt levels form the assistance ladder, from fully unprompted
/// (`Independent`) to hand-over-hand (`Physical`). `IndependentWrong` marks
/// an unprompted but incorrect attempt and is tracked separately from the
/// ladder in distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptType {
    /// Correct use with no prompting.
    Independent,
    /// Spoken cue was required.
    Verbal,
    /// Pointing or another gesture was required.
    Gestural,
    /// The caregiver demonstrated the card first.
    Modeling,
    /// Hand-over-hand physical guidance was required.
    Physical,
    /// Unprompted attempt on the wrong card.
    IndependentWrong,
}

impl PromptType {
    pub const ALL: [PromptType; 6] = [
        PromptType::Independent,
        PromptType::Verbal,
        PromptType::Gestural,
        PromptType::Modeling,
        PromptType::Physical,
        PromptType::IndependentWrong,
    ];

    /// Parses an untyped store label.
    ///
    /// The log source records prompt types as free text, so unrecognized
    /// labels yield `None` and the caller skips the trial instead of erroring.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "independent" => Some(Self::Independent),
            "verbal" => Some(Self::Verbal),
            "gestural" => Some(Self::Gestural),
            "modeling" | "modelling" => Some(Self::Modeling),
            "physical" => Some(Self::Physical),
            "independentwrong" | "independent wrong" => Some(Self::IndependentWrong),
            _ => None,
        }
    }

    /// Canonical wire label as written by the logging side.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PromptType::Independent => "Independent",
            PromptType::Verbal => "Verbal",
            PromptType::Gestural => "Gestural",
            PromptType::Modeling => "Modeling",
            PromptType::Physical => "Physical",
            PromptType::IndependentWrong => "IndependentWrong",
        }
    }
}

//
// ─── TRIAL PROMPT ─────────────────────────────────────────────────────────────
//

/// Record of a single attempted use of a card.
///
/// One per discrete interaction attempt, immutable once logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPrompt {
    pub card_id: CardId,
    pub prompt: PromptType,
    pub timestamp: DateTime<Utc>,
}

impl TrialPrompt {
    #[must_use]
    pub fn new(card_id: CardId, prompt: PromptType, timestamp: DateTime<Utc>) -> Self {
        Self {
            card_id,
            prompt,
            timestamp,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn label_round_trips_for_every_variant() {
        for prompt in PromptType::ALL {
            assert_eq!(PromptType::from_label(prompt.label()), Some(prompt));
        }
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(
            PromptType::from_label("INDEPENDENT"),
            Some(PromptType::Independent)
        );
        assert_eq!(
            PromptType::from_label("independent wrong"),
            Some(PromptType::IndependentWrong)
        );
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(PromptType::from_label("shouted"), None);
        assert_eq!(PromptType::from_label(""), None);
    }

    #[test]
    fn trial_creation_works() {
        let trial = TrialPrompt::new(CardId::new("c1"), PromptType::Verbal, Utc::now());
        assert_eq!(trial.card_id, CardId::new("c1"));
        assert_eq!(trial.prompt, PromptType::Verbal);
    }
}

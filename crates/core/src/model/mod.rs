mod card;
mod ids;
mod phase;
mod prompt;
mod session;

pub use card::Card;
pub use ids::{CardId, LearnerId, SessionId, TrialId};
pub use phase::{
    CardFilter, Phase, PhaseFilter, PhaseId, PhaseLog, PhaseParseError, EMOTIONS_CATEGORY,
};
pub use prompt::{PromptType, TrialPrompt};
pub use session::Session;

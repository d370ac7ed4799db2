use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::ids::{SessionId, TrialId};
use crate::model::prompt::TrialPrompt;

/// One practice sitting: an ordered run of trials plus session-level rollups.
///
/// `independent_count` and `total_taps` are maintained by the logging side as
/// the session happens. The analytics consume them as-is and never recompute
/// them from the trial list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub independent_count: u32,
    pub total_taps: u32,
    pub trials: BTreeMap<TrialId, TrialPrompt>,
}

impl Session {
    #[must_use]
    pub fn new(
        id: SessionId,
        timestamp: DateTime<Utc>,
        independent_count: u32,
        total_taps: u32,
    ) -> Self {
        Self {
            id,
            timestamp,
            independent_count,
            total_taps,
            trials: BTreeMap::new(),
        }
    }

    pub fn insert_trial(&mut self, id: TrialId, trial: TrialPrompt) {
        self.trials.insert(id, trial);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

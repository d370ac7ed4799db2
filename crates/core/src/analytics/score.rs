use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::Session;

/// Daily mastery percentage derived from session rollup counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressScorePoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Groups sessions by calendar day and converts each day's independent-tap
/// share into a percentage.
///
/// A day with no independent taps scores 0, never a non-finite value. One
/// point per distinct day in the input; ordering is a presentation concern
/// and left to the caller.
#[must_use]
pub fn score_series(sessions: &[Session]) -> Vec<ProgressScorePoint> {
    let mut days: HashMap<NaiveDate, (u64, u64)> = HashMap::new();
    for session in sessions {
        let entry = days.entry(session.timestamp.date_naive()).or_default();
        entry.0 += u64::from(session.independent_count);
        entry.1 += u64::from(session.total_taps);
    }

    days.into_iter()
        .map(|(date, (independent, taps))| {
            let score = if independent > 0 && taps > 0 {
                independent as f64 / taps as f64 * 100.0
            } else {
                0.0
            };
            ProgressScorePoint { date, score }
        })
        .collect()
}

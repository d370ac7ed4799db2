use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

use crate::model::{CardFilter, PhaseFilter, PhaseLog, PromptType};

//
// ─── SERIES TYPES ─────────────────────────────────────────────────────────────
//

/// Per-bucket tallies, one counter per prompt type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptCounts {
    pub independent: u32,
    pub verbal: u32,
    pub gestural: u32,
    pub modeling: u32,
    pub physical: u32,
    pub independent_wrong: u32,
}

impl PromptCounts {
    pub fn record(&mut self, prompt: PromptType) {
        match prompt {
            PromptType::Independent => self.independent += 1,
            PromptType::Verbal => self.verbal += 1,
            PromptType::Gestural => self.gestural += 1,
            PromptType::Modeling => self.modeling += 1,
            PromptType::Physical => self.physical += 1,
            PromptType::IndependentWrong => self.independent_wrong += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.independent
            + self.verbal
            + self.gestural
            + self.modeling
            + self.physical
            + self.independent_wrong
    }
}

/// One aggregation bucket: a calendar date, or a time of day when the query
/// range is a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBucket {
    pub label: String,
    pub counts: PromptCounts,
}

/// Buckets in ascending date/time order.
pub type ChartSeries = Vec<ChartBucket>;

//
// ─── BUCKETIZER ───────────────────────────────────────────────────────────────
//

/// Filters the log and groups the surviving trials into ordered buckets.
///
/// The filter pipeline narrows a working view of the log — the input is
/// never mutated: phase filter, then card filter, then the inclusive date
/// range (`end_date` reaches through its last millisecond). Sessions left
/// without trials simply contribute no buckets.
///
/// Bucketing: when `start_date` and `end_date` are both set and name the
/// same calendar day, each trial buckets by its own time of day labeled
/// `H:MM:SS`. Otherwise trials bucket by the **session's** calendar date
/// labeled `Month Day, Year` — the session date, not the trial date, is the
/// bucket key. Each bucket keeps its underlying instant as the sort key, so
/// ordering never re-parses the formatted label.
#[must_use]
pub fn build_series(
    log: &PhaseLog,
    phase_filter: PhaseFilter,
    card_filter: &CardFilter,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> ChartSeries {
    let single_day = matches!((start_date, end_date), (Some(s), Some(e)) if s == e);
    let range_start = start_date.map(day_start);
    let range_end = end_date.map(day_end);

    let mut buckets: BTreeMap<DateTime<Utc>, ChartBucket> = BTreeMap::new();

    for (phase_id, phase) in log.iter() {
        if !phase_filter.matches(phase_id) {
            continue;
        }
        for session in phase.sessions.values() {
            for trial in session.trials.values() {
                if !card_filter.matches(&trial.card_id) {
                    continue;
                }
                if range_start.is_some_and(|start| trial.timestamp < start) {
                    continue;
                }
                if range_end.is_some_and(|end| trial.timestamp > end) {
                    continue;
                }

                let (key, label) = if single_day {
                    time_bucket(trial.timestamp)
                } else {
                    date_bucket(session.timestamp)
                };
                buckets
                    .entry(key)
                    .or_insert_with(|| ChartBucket {
                        label,
                        counts: PromptCounts::default(),
                    })
                    .counts
                    .record(trial.prompt);
            }
        }
    }

    buckets.into_values().collect()
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable millisecond of the given calendar day.
fn day_end(date: NaiveDate) -> DateTime<Utc> {
    date.succ_opt()
        .map_or(DateTime::<Utc>::MAX_UTC, |next| {
            day_start(next) - Duration::milliseconds(1)
        })
}

/// Single-day mode: key and label by the trial's time of day, truncated to
/// whole seconds so identical clock readings share a bucket.
fn time_bucket(at: DateTime<Utc>) -> (DateTime<Utc>, String) {
    let seconds = i64::from(at.time().num_seconds_from_midnight());
    let key = day_start(at.date_naive()) + Duration::seconds(seconds);
    (key, at.format("%-H:%M:%S").to_string())
}

/// Multi-day mode: key and label by the session's calendar date.
fn date_bucket(at: DateTime<Utc>) -> (DateTime<Utc>, String) {
    (
        day_start(at.date_naive()),
        at.format("%B %-d, %Y").to_string(),
    )
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

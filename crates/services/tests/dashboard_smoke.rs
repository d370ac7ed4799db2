use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use aac_core::model::{
    Card, CardFilter, CardId, LearnerId, Phase, PhaseFilter, PhaseId, PhaseLog, PromptType,
    Session, SessionId, TrialId, TrialPrompt,
};
use aac_core::time::{fixed_clock, fixed_now};
use services::DashboardService;
use storage::repository::{CardRepository, InMemoryRepository};

fn session(
    id: &str,
    timestamp: DateTime<Utc>,
    independent: u32,
    taps: u32,
    trials: Vec<(&str, &str, PromptType, DateTime<Utc>)>,
) -> Session {
    let mut session = Session::new(SessionId::new(id), timestamp, independent, taps);
    for (trial_id, card_id, prompt, at) in trials {
        session.insert_trial(
            TrialId::new(trial_id),
            TrialPrompt::new(CardId::new(card_id), prompt, at),
        );
    }
    session
}

/// Seeds two phases of activity: two cards practiced in phase 1, one of them
/// mastered, plus an untouched phase 2 entry for the open-interval math.
fn seed(repo: &InMemoryRepository) -> LearnerId {
    let learner = LearnerId::new("learner-1");
    let start = fixed_now();

    let mut phase1 = Phase::new();
    phase1.entry_timestamps.push(start - Duration::days(30));
    phase1.exit_timestamps.push(start - Duration::days(2));
    let s1 = session(
        "s1",
        start - Duration::days(10),
        1,
        4,
        vec![
            (
                "t1",
                "c1",
                PromptType::Physical,
                start - Duration::days(10),
            ),
            ("t2", "c2", PromptType::Verbal, start - Duration::days(10)),
        ],
    );
    let s2 = session(
        "s2",
        start - Duration::days(4),
        3,
        4,
        vec![(
            "t1",
            "c1",
            PromptType::Independent,
            start - Duration::days(4),
        )],
    );
    phase1.sessions.insert(s1.id.clone(), s1);
    phase1.sessions.insert(s2.id.clone(), s2);

    let mut phase2 = Phase::new();
    phase2.entry_timestamps.push(start - Duration::days(2));

    let mut log = PhaseLog::new();
    log.insert(PhaseId::One, phase1);
    log.insert(PhaseId::Two, phase2);
    repo.put_phase_log(&learner, log).unwrap();

    let mut mastered = Card::new(CardId::new("c1"), "Food");
    mastered.mark_independent(PhaseId::One, start - Duration::days(3));
    let in_progress = Card::new(CardId::new("c2"), "Food");
    repo.put_cards(&learner, vec![mastered, in_progress]).unwrap();

    learner
}

#[tokio::test]
async fn pipeline_aggregates_a_seeded_learner() {
    let repo = InMemoryRepository::new();
    let learner = seed(&repo);
    let service = DashboardService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );

    let snapshot = service.load_snapshot(&learner).await.unwrap();
    assert!(service.is_current(&snapshot));

    // phase 1: two cards, one proficient, one 7-day window (first trial at
    // -10d, mastery stored at -3d)
    let progress = snapshot.phase_progress(PhaseId::One);
    assert_eq!(progress.total_cards, 2);
    assert_eq!(progress.proficient_cards, 1);
    assert_eq!(progress.average_independence, Duration::days(7));
    assert_eq!(progress.estimated_remaining, Duration::days(7));

    let durations = snapshot.independence_durations(PhaseId::One);
    assert_eq!(durations, vec![Duration::days(7)]);

    // chart over everything: one bucket per session date
    let series = snapshot.chart(PhaseFilter::All, &CardFilter::All, None, None);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].counts.physical, 1);
    assert_eq!(series[0].counts.verbal, 1);
    assert_eq!(series[1].counts.independent, 1);

    // daily scores: 25% then 75%
    let mut scores = snapshot.score_series(PhaseId::One);
    scores.sort_by_key(|point| point.date);
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].score, 25.0);
    assert_eq!(scores[1].score, 75.0);

    // phase 1 is closed (28 days), phase 2 still open and clamped to now
    assert_eq!(
        service.time_in_phase(&snapshot, PhaseId::One),
        Duration::days(28)
    );
    assert_eq!(
        service.time_in_phase(&snapshot, PhaseId::Two),
        Duration::days(2)
    );
}

#[tokio::test]
async fn reloading_after_a_store_change_picks_up_new_data() {
    let repo = InMemoryRepository::new();
    let learner = seed(&repo);
    let service = DashboardService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );

    let first = service.load_snapshot(&learner).await.unwrap();
    assert_eq!(first.phase_progress(PhaseId::One).proficient_cards, 1);

    // the logging side marks the second card independent
    let mut cards = repo.cards_for_learner(&learner).await.unwrap();
    for card in &mut cards {
        if card.id == CardId::new("c2") {
            card.mark_independent(PhaseId::One, fixed_now());
        }
    }
    repo.put_cards(&learner, cards).unwrap();

    let second = service.load_snapshot(&learner).await.unwrap();
    assert!(!service.is_current(&first));
    assert_eq!(second.phase_progress(PhaseId::One).proficient_cards, 2);
}

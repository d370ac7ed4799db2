use std::collections::HashMap;

use chrono::Duration;

use crate::analytics::windows::IndependenceWindow;
use crate::model::{Card, CardId, PhaseId};

/// How many window durations feed the naive remaining-time estimate.
const ESTIMATE_SAMPLE_SIZE: usize = 5;

/// Per-phase progress rollup for the at-a-glance gauge view.
///
/// `estimated_remaining` is the naive client-side heuristic; the externally
/// computed smoothing projection is a separate number and the two must not
/// be conflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseProgress {
    pub total_cards: usize,
    pub proficient_cards: usize,
    pub average_independence: Duration,
    pub estimated_remaining: Duration,
}

/// Aggregates one phase's card set and independence windows.
///
/// Cards are first gated by the phase's category filter. Averages over an
/// empty window map degrade to `Duration::zero()`, never a non-finite value.
#[must_use]
pub fn aggregate(
    phase: PhaseId,
    cards: &[Card],
    windows: &HashMap<CardId, IndependenceWindow>,
) -> PhaseProgress {
    let in_phase: Vec<&Card> = cards.iter().filter(|card| card.in_phase(phase)).collect();
    let total_cards = in_phase.len();
    let proficient_cards = in_phase
        .iter()
        .filter(|card| card.independent_in(phase))
        .count();

    let durations: Vec<Duration> = windows
        .values()
        .map(IndependenceWindow::duration)
        .collect();
    let average_independence = mean_duration(&durations);

    let remaining = total_cards.saturating_sub(proficient_cards);
    let estimated_remaining = estimate_remaining(&durations, remaining);

    PhaseProgress {
        total_cards,
        proficient_cards,
        average_independence,
        estimated_remaining,
    }
}

fn mean_duration(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::zero();
    }
    let total_ms: i64 = durations.iter().map(Duration::num_milliseconds).sum();
    Duration::milliseconds(total_ms / durations.len() as i64)
}

/// Naive remaining-time estimate: average the largest
/// [`ESTIMATE_SAMPLE_SIZE`] window durations and scale by the number of
/// cards still short of independence.
///
/// The sample is picked by duration magnitude, not chronologically. Keep it
/// that way; do not reorder by completion instant.
#[allow(clippy::cast_possible_wrap)]
fn estimate_remaining(durations: &[Duration], remaining_cards: usize) -> Duration {
    if durations.is_empty() || remaining_cards == 0 {
        return Duration::zero();
    }
    let mut sorted = durations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.truncate(ESTIMATE_SAMPLE_SIZE);

    let per_card = mean_duration(&sorted);
    Duration::milliseconds(per_card.num_milliseconds() * remaining_cards as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn window(days: i64) -> IndependenceWindow {
        let first = fixed_now();
        IndependenceWindow {
            first_instance: first,
            completion: first + Duration::days(days),
        }
    }

    fn card(id: &str, category: &str, independent: bool) -> Card {
        let mut card = Card::new(CardId::new(id), category);
        if independent {
            card.mark_independent(PhaseId::One, fixed_now());
        }
        card
    }

    #[test]
    fn counts_respect_category_gate() {
        let cards = vec![
            card("c1", "Food", true),
            card("c2", "Food", false),
            card("c3", "Emotions", false),
        ];
        let progress = aggregate(PhaseId::Two, &cards, &HashMap::new());
        // the Emotions card is not part of phase 2
        assert_eq!(progress.total_cards, 2);
        assert_eq!(progress.proficient_cards, 0);
    }

    #[test]
    fn proficient_never_exceeds_total() {
        let cards = vec![card("c1", "Food", true), card("c2", "Food", true)];
        let progress = aggregate(PhaseId::One, &cards, &HashMap::new());
        assert!(progress.proficient_cards <= progress.total_cards);
        assert_eq!(progress.proficient_cards, 2);
    }

    #[test]
    fn empty_windows_average_to_zero() {
        let cards = vec![card("c1", "Food", false)];
        let progress = aggregate(PhaseId::One, &cards, &HashMap::new());
        assert_eq!(progress.average_independence, Duration::zero());
        assert_eq!(progress.estimated_remaining, Duration::zero());
    }

    #[test]
    fn average_over_windows() {
        let windows = HashMap::from([
            (CardId::new("c1"), window(2)),
            (CardId::new("c2"), window(4)),
        ]);
        let cards = vec![card("c1", "Food", true), card("c2", "Food", true)];
        let progress = aggregate(PhaseId::One, &cards, &windows);
        assert_eq!(progress.average_independence, Duration::days(3));
    }

    #[test]
    fn estimate_uses_top_five_by_magnitude() {
        // durations 10..4 days; top five average to 8, two cards remain
        let windows: HashMap<CardId, IndependenceWindow> = (0..7)
            .map(|i| (CardId::new(format!("c{i}")), window(10 - i)))
            .collect();
        let mut cards: Vec<Card> = (0..7)
            .map(|i| card(&format!("c{i}"), "Food", true))
            .collect();
        cards.push(card("c7", "Food", false));
        cards.push(card("c8", "Food", false));

        let progress = aggregate(PhaseId::One, &cards, &windows);
        assert_eq!(progress.estimated_remaining, Duration::days(16));
    }

    #[test]
    fn estimate_is_zero_when_nothing_remains() {
        let windows = HashMap::from([(CardId::new("c1"), window(3))]);
        let cards = vec![card("c1", "Food", true)];
        let progress = aggregate(PhaseId::One, &cards, &windows);
        assert_eq!(progress.estimated_remaining, Duration::zero());
    }

    #[test]
    fn aggregation_is_deterministic() {
        let windows = HashMap::from([(CardId::new("c1"), window(3))]);
        let cards = vec![card("c1", "Food", true), card("c2", "Food", false)];
        assert_eq!(
            aggregate(PhaseId::One, &cards, &windows),
            aggregate(PhaseId::One, &cards, &windows)
        );
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use aac_core::model::{Card, CardId, LearnerId, Phase, PhaseId, PhaseLog};

use crate::records::{CardRecord, PhaseLogRecord, RecordDecodeError};

/// Errors surfaced by log-store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<RecordDecodeError> for StorageError {
    fn from(err: RecordDecodeError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Read contract for the hierarchical activity log.
///
/// The remote store keys the log by phase id → session id → trial id.
/// Fetches for different phases are independent and carry no ordering
/// guarantee, so a caller may see some phases before others; a learner or
/// phase without data reads as empty rather than failing.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Fetch the full per-learner phase log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store is unreachable or returns a
    /// malformed document. Never retried here.
    async fn phase_log(&self, learner: &LearnerId) -> Result<PhaseLog, StorageError>;

    /// Fetch a single phase; `Ok(None)` when the learner has no entry yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn phase(
        &self,
        learner: &LearnerId,
        phase: PhaseId,
    ) -> Result<Option<Phase>, StorageError>;
}

/// Flat card lookups backing the analytics.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Fetch one card; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn card(&self, learner: &LearnerId, id: &CardId) -> Result<Option<Card>, StorageError>;

    /// Fetch every card configured for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn cards_for_learner(&self, learner: &LearnerId) -> Result<Vec<Card>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    logs: Arc<Mutex<HashMap<LearnerId, PhaseLog>>>,
    cards: Arc<Mutex<HashMap<LearnerId, Vec<Card>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a learner's phase log.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backing lock is poisoned.
    pub fn put_phase_log(&self, learner: &LearnerId, log: PhaseLog) -> Result<(), StorageError> {
        let mut guard = self
            .logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(learner.clone(), log);
        Ok(())
    }

    /// Replace a learner's card set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backing lock is poisoned.
    pub fn put_cards(&self, learner: &LearnerId, cards: Vec<Card>) -> Result<(), StorageError> {
        let mut guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(learner.clone(), cards);
        Ok(())
    }

    /// Decode and store a raw log document as fetched from the remote store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when the document cannot be
    /// decoded into domain types.
    pub fn put_raw_log(
        &self,
        learner: &LearnerId,
        record: PhaseLogRecord,
    ) -> Result<(), StorageError> {
        self.put_phase_log(learner, record.into_phase_log()?)
    }

    /// Decode and store raw card documents.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` when a document cannot be
    /// decoded into a domain card.
    pub fn put_raw_cards(
        &self,
        learner: &LearnerId,
        records: Vec<CardRecord>,
    ) -> Result<(), StorageError> {
        let cards = records
            .into_iter()
            .map(CardRecord::into_card)
            .collect::<Result<Vec<_>, _>>()?;
        self.put_cards(learner, cards)
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryRepository {
    async fn phase_log(&self, learner: &LearnerId) -> Result<PhaseLog, StorageError> {
        let guard = self
            .logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(learner).cloned().unwrap_or_default())
    }

    async fn phase(
        &self,
        learner: &LearnerId,
        phase: PhaseId,
    ) -> Result<Option<Phase>, StorageError> {
        let guard = self
            .logs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(learner)
            .and_then(|log| log.phase(phase))
            .cloned())
    }
}

#[async_trait]
impl CardRepository for InMemoryRepository {
    async fn card(&self, learner: &LearnerId, id: &CardId) -> Result<Option<Card>, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(learner)
            .and_then(|cards| cards.iter().find(|card| &card.id == id))
            .cloned())
    }

    async fn cards_for_learner(&self, learner: &LearnerId) -> Result<Vec<Card>, StorageError> {
        let guard = self
            .cards
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(learner).cloned().unwrap_or_default())
    }
}

/// Aggregates the log and card repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub logs: Arc<dyn ActivityLogRepository>,
    pub cards: Arc<dyn CardRepository>,
}

impl Storage {
    /// Builds an in-memory backed `Storage`, returning the concrete
    /// repository alongside so tests can seed it.
    #[must_use]
    pub fn in_memory() -> (Self, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let logs: Arc<dyn ActivityLogRepository> = Arc::new(repo.clone());
        let cards: Arc<dyn CardRepository> = Arc::new(repo.clone());
        (Self { logs, cards }, repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aac_core::model::{PromptType, Session, SessionId, TrialId, TrialPrompt};
    use aac_core::time::fixed_now;

    fn seeded_log() -> PhaseLog {
        let mut session = Session::new(SessionId::new("s1"), fixed_now(), 1, 2);
        session.insert_trial(
            TrialId::new("t1"),
            TrialPrompt::new(CardId::new("c1"), PromptType::Independent, fixed_now()),
        );
        let mut phase = Phase::new();
        phase.entry_timestamps.push(fixed_now());
        phase.sessions.insert(session.id.clone(), session);

        let mut log = PhaseLog::new();
        log.insert(PhaseId::One, phase);
        log
    }

    #[tokio::test]
    async fn round_trips_phase_log() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("l1");
        repo.put_phase_log(&learner, seeded_log()).unwrap();

        let log = repo.phase_log(&learner).await.unwrap();
        assert_eq!(log.sessions(PhaseId::One).count(), 1);

        let phase = repo.phase(&learner, PhaseId::One).await.unwrap();
        assert!(phase.is_some());
        let missing = repo.phase(&learner, PhaseId::Three).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn unknown_learner_reads_as_empty() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("nobody");

        assert!(repo.phase_log(&learner).await.unwrap().is_empty());
        assert!(repo.cards_for_learner(&learner).await.unwrap().is_empty());
        assert!(repo
            .card(&learner, &CardId::new("c1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn raw_store_documents_seed_the_repository() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("l1");

        let log: PhaseLogRecord = serde_json::from_value(serde_json::json!({
            "2": {
                "entryTimestamps": [1_704_067_200_000_i64],
                "sessions": {
                    "s1": {
                        "timestamp": 1_704_070_800_000_i64,
                        "independentCount": 1,
                        "totalTaps": 1,
                        "trials": {
                            "t1": {
                                "cardID": "c1",
                                "promptType": "Independent",
                                "timestamp": 1_704_070_800_000_i64
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        repo.put_raw_log(&learner, log).unwrap();

        let cards: Vec<CardRecord> = serde_json::from_value(serde_json::json!([
            { "cardID": "c1", "category": "Food", "phase1_independence": true,
              "phase1_completion": 1_704_070_800_000_i64 }
        ]))
        .unwrap();
        repo.put_raw_cards(&learner, cards).unwrap();

        let log = repo.phase_log(&learner).await.unwrap();
        assert_eq!(log.sessions(PhaseId::Two).count(), 1);

        let card = repo.card(&learner, &CardId::new("c1")).await.unwrap();
        assert!(card.unwrap().phase1_independence);
    }

    #[tokio::test]
    async fn malformed_raw_log_surfaces_a_serialization_error() {
        let repo = InMemoryRepository::new();
        let mut record = PhaseLogRecord::default();
        record
            .0
            .insert("9".to_string(), crate::records::PhaseRecord::default());

        let err = repo.put_raw_log(&LearnerId::new("l1"), record).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn card_lookup_finds_seeded_cards() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new("l1");
        repo.put_cards(
            &learner,
            vec![
                Card::new(CardId::new("c1"), "Food"),
                Card::new(CardId::new("c2"), "Emotions"),
            ],
        )
        .unwrap();

        let card = repo.card(&learner, &CardId::new("c2")).await.unwrap();
        assert_eq!(card.unwrap().category, "Emotions");

        let (storage, _) = Storage::in_memory();
        assert!(storage
            .cards
            .cards_for_learner(&learner)
            .await
            .unwrap()
            .is_empty());
    }
}

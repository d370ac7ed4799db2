//! Wire records mirroring the remote document store.
//!
//! The store keeps the activity log as nested JSON keyed by phase id →
//! session id → trial id, with camelCase field names and epoch-millisecond
//! timestamps. These records deserialize that shape verbatim and decode into
//! the domain types, so storage concerns never leak into the analytics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aac_core::model::{
    Card, CardId, Phase, PhaseId, PhaseLog, PromptType, Session, SessionId, TrialId, TrialPrompt,
};

/// Errors raised while decoding store records into domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordDecodeError {
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
    #[error("unknown phase key: {0}")]
    UnknownPhase(String),
}

fn decode_timestamp(ms: i64) -> Result<DateTime<Utc>, RecordDecodeError> {
    DateTime::from_timestamp_millis(ms).ok_or(RecordDecodeError::TimestampOutOfRange(ms))
}

fn encode_timestamp(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

//
// ─── TRIAL ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "cardID")]
    pub card_id: String,
    #[serde(rename = "promptType")]
    pub prompt_type: String,
    pub timestamp: i64,
}

impl TrialRecord {
    #[must_use]
    pub fn from_trial(trial: &TrialPrompt) -> Self {
        Self {
            card_id: trial.card_id.as_str().to_owned(),
            prompt_type: trial.prompt.label().to_owned(),
            timestamp: encode_timestamp(trial.timestamp),
        }
    }

    /// Decode into a domain trial.
    ///
    /// Returns `Ok(None)` when the prompt label is not one of the six
    /// recognized types; such trials are dropped rather than errored, since
    /// the store records prompt types as free text.
    ///
    /// # Errors
    ///
    /// Returns `RecordDecodeError::TimestampOutOfRange` for unrepresentable
    /// timestamps.
    pub fn into_trial(self) -> Result<Option<TrialPrompt>, RecordDecodeError> {
        let Some(prompt) = PromptType::from_label(&self.prompt_type) else {
            return Ok(None);
        };
        let timestamp = decode_timestamp(self.timestamp)?;
        Ok(Some(TrialPrompt::new(
            CardId::new(self.card_id),
            prompt,
            timestamp,
        )))
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: i64,
    #[serde(rename = "independentCount", default)]
    pub independent_count: u32,
    #[serde(rename = "totalTaps", default)]
    pub total_taps: u32,
    #[serde(default)]
    pub trials: BTreeMap<String, TrialRecord>,
}

impl SessionRecord {
    /// Decode into a domain session, dropping trials with unknown prompt
    /// labels.
    ///
    /// # Errors
    ///
    /// Returns `RecordDecodeError` on unrepresentable timestamps.
    pub fn into_session(self, id: SessionId) -> Result<Session, RecordDecodeError> {
        let mut session = Session::new(
            id,
            decode_timestamp(self.timestamp)?,
            self.independent_count,
            self.total_taps,
        );
        for (trial_id, record) in self.trials {
            if let Some(trial) = record.into_trial()? {
                session.insert_trial(TrialId::new(trial_id), trial);
            }
        }
        Ok(session)
    }
}

//
// ─── PHASE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseRecord {
    #[serde(rename = "entryTimestamps", default)]
    pub entry_timestamps: Vec<i64>,
    #[serde(rename = "exitTimestamps", default)]
    pub exit_timestamps: Vec<i64>,
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionRecord>,
}

impl PhaseRecord {
    /// Decode into a domain phase.
    ///
    /// # Errors
    ///
    /// Returns `RecordDecodeError` on unrepresentable timestamps.
    pub fn into_phase(self) -> Result<Phase, RecordDecodeError> {
        let mut phase = Phase::new();
        for ms in self.entry_timestamps {
            phase.entry_timestamps.push(decode_timestamp(ms)?);
        }
        for ms in self.exit_timestamps {
            phase.exit_timestamps.push(decode_timestamp(ms)?);
        }
        for (session_id, record) in self.sessions {
            let id = SessionId::new(session_id);
            let session = record.into_session(id.clone())?;
            phase.sessions.insert(id, session);
        }
        Ok(phase)
    }
}

//
// ─── PHASE LOG ────────────────────────────────────────────────────────────────
//

/// The full per-learner log as stored, keyed by the phase keys `"1"`..`"3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseLogRecord(pub BTreeMap<String, PhaseRecord>);

impl PhaseLogRecord {
    /// Decode into a domain phase log.
    ///
    /// # Errors
    ///
    /// Returns `RecordDecodeError::UnknownPhase` for keys outside `1..=3`
    /// and `TimestampOutOfRange` for unrepresentable timestamps.
    pub fn into_phase_log(self) -> Result<PhaseLog, RecordDecodeError> {
        let mut log = PhaseLog::new();
        for (key, record) in self.0 {
            let id: PhaseId = key
                .parse()
                .map_err(|_| RecordDecodeError::UnknownPhase(key))?;
            log.insert(id, record.into_phase()?);
        }
        Ok(log)
    }
}

//
// ─── CARD ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "cardID")]
    pub card_id: String,
    pub category: String,
    #[serde(default)]
    pub phase1_independence: bool,
    #[serde(default)]
    pub phase2_independence: bool,
    #[serde(default)]
    pub phase3_independence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_completion: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_completion: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_completion: Option<i64>,
}

impl CardRecord {
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self {
            card_id: card.id.as_str().to_owned(),
            category: card.category.clone(),
            phase1_independence: card.phase1_independence,
            phase2_independence: card.phase2_independence,
            phase3_independence: card.phase3_independence,
            phase1_completion: card.phase1_completion.map(encode_timestamp),
            phase2_completion: card.phase2_completion.map(encode_timestamp),
            phase3_completion: card.phase3_completion.map(encode_timestamp),
        }
    }

    /// Decode into a domain card.
    ///
    /// # Errors
    ///
    /// Returns `RecordDecodeError` on unrepresentable timestamps.
    pub fn into_card(self) -> Result<Card, RecordDecodeError> {
        let mut card = Card::new(CardId::new(self.card_id), self.category);
        card.phase1_independence = self.phase1_independence;
        card.phase2_independence = self.phase2_independence;
        card.phase3_independence = self.phase3_independence;
        card.phase1_completion = self.phase1_completion.map(decode_timestamp).transpose()?;
        card.phase2_completion = self.phase2_completion.map(decode_timestamp).transpose()?;
        card.phase3_completion = self.phase3_completion.map(decode_timestamp).transpose()?;
        Ok(card)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

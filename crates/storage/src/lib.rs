#![forbid(unsafe_code)]

pub mod records;
pub mod repository;

pub use records::{
    CardRecord, PhaseLogRecord, PhaseRecord, RecordDecodeError, SessionRecord, TrialRecord,
};
pub use repository::{
    ActivityLogRepository, CardRepository, InMemoryRepository, Storage, StorageError,
};

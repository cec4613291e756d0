//! Persistence abstraction over the op journal.

/// SQLite-backed journal sink.
pub mod sqlite;

use crate::{ledger::LedgerSnapshotV1, op::StoredOp, types::OpSeq};

/// Persistence-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Payload encode/decode failure.
    #[error("payload codec error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Anything else, stringified.
    #[error("{0}")]
    Message(String),
}

impl From<crate::ledger::StoreError> for PersistError {
    fn from(value: crate::ledger::StoreError) -> Self {
        Self::Message(format!("store error: {value:?}"))
    }
}

/// Result alias for persistence calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Durable sink for journal ops.
pub trait OpSink: Send {
    /// Appends ops and returns the highest durable sequence.
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq>;

    /// Forces buffered data to stable storage.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }

    /// Writes a snapshot covering `last_seq`.
    fn write_snapshot(
        &mut self,
        _snapshot: &LedgerSnapshotV1,
        _last_seq: OpSeq,
    ) -> PersistResult<()> {
        Ok(())
    }

    /// Deletes journal rows at or below `seq`.
    fn compact_through(&mut self, _seq: OpSeq) -> PersistResult<usize> {
        Ok(0)
    }
}

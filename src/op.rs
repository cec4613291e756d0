//! Mutation operation model and persistence wrappers.

use serde::{Deserialize, Serialize};

use crate::{
    contact::{Contact, ContactPatch, Score},
    types::{ContactId, OpSeq},
};

/// Version number for serialized [`StoredOpEnvelope`] payloads.
pub const OP_FORMAT_VERSION: u16 = 1;

/// Immutable operation appended to the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Insert a fully materialized contact.
    Insert {
        /// Inserted record.
        contact: Contact,
    },
    /// Operator edit, including precomputed inverse patch.
    Patch {
        /// Contact id to mutate.
        id: ContactId,
        /// Forward patch.
        patch: ContactPatch,
        /// Inverse patch that restores prior state.
        prev: ContactPatch,
    },
    /// Scoring rewrite issued by the recalculation pass.
    Rescore {
        /// Contact id to mutate.
        id: ContactId,
        /// New score fields.
        score: Score,
        /// Previous score fields.
        prev: Score,
    },
}

/// Journal row metadata plus operation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOpEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped operation.
    pub stored: StoredOp,
}

impl StoredOpEnvelope {
    /// Constructs an envelope using [`OP_FORMAT_VERSION`].
    pub fn new(stored: StoredOp) -> Self {
        Self {
            format_version: OP_FORMAT_VERSION,
            stored,
        }
    }
}

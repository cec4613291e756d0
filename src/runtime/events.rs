//! Runtime event stream payloads.

use crate::types::{ContactId, OpSeq};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A contact was logged.
    Logged {
        /// Assigned contact id.
        id: ContactId,
        /// Whether the contest's dupe policy matched.
        dupe: bool,
    },
    /// An existing contact was edited. Stored scores may be stale until
    /// the next recalculation.
    Edited {
        /// Edited contact id.
        id: ContactId,
    },
    /// A recalculation replay finished.
    Recalculated {
        /// Contacts whose stored score changed.
        rewritten: usize,
    },
    /// An ADIF import finished.
    Imported {
        /// Rows committed.
        imported: usize,
        /// Rows suppressed as (timestamp, call) duplicates.
        duplicates: usize,
    },
    /// Persistence has reached at least this op sequence.
    DurableUpTo {
        /// Highest sequence known durable.
        op_seq: OpSeq,
    },
}

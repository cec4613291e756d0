//! Authoritative contact ledger and its query contract.

/// In-memory store, indices, and aggregate queries.
pub mod store;

pub use store::{ContactLedger, DupeScope, LedgerSnapshotV1, StoreError};

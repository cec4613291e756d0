//! Authoritative in-memory contact store with append-only op journal.

use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::{
    contact::{Contact, ContactDraft, ContactPatch, Score},
    op::{Op, StoredOp},
    types::{ContactId, ContestId, Continent, ModeGroup, OpSeq},
};

/// Ledger mutation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced contact does not exist.
    #[error("contact {0} not found")]
    MissingContact(ContactId),
    /// A replayed insert collided with an existing id.
    #[error("contact {0} already exists")]
    AlreadyExists(ContactId),
}

/// Serializable full-state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshotV1 {
    /// Next contact id to assign.
    pub next_contact_id: ContactId,
    /// Next op sequence to assign.
    pub next_op_seq: OpSeq,
    /// Insertion order of contact ids.
    pub order: Vec<ContactId>,
    /// Records in insertion order.
    pub records: Vec<Contact>,
}

/// Scope selector for the `worked` dupe query.
///
/// The four standard policies map onto the first three variants plus "no
/// query at all"; windowed custom policies use [`DupeScope::BandModeWindow`].
#[derive(Debug, Clone, PartialEq)]
pub enum DupeScope {
    /// Callsign anywhere in the contest.
    Any,
    /// Callsign on this display band.
    Band(String),
    /// Callsign on this band with this normalized mode.
    BandMode(String, ModeGroup),
    /// Callsign on this band/mode inside a half-open time window.
    BandModeWindow {
        /// Display band.
        band: String,
        /// Normalized mode.
        mode: ModeGroup,
        /// Window start, inclusive (UTC seconds).
        start_ts: i64,
        /// Window end, exclusive (UTC seconds).
        end_ts: i64,
    },
}

/// Authoritative in-memory contact ledger.
///
/// Holds contacts for any number of contest runs; every query takes a
/// [`ContestId`] and never mixes instances. Mutations append ops to a
/// pending journal drained by the persistence layer.
#[derive(Debug, Default)]
pub struct ContactLedger {
    records: HashMap<ContactId, Contact>,
    order: Vec<ContactId>,
    by_call: HashMap<String, Vec<ContactId>>,
    by_contest: HashMap<ContestId, Vec<ContactId>>,
    pending_ops: Vec<StoredOp>,
    next_op_seq: OpSeq,
    next_contact_id: ContactId,
}

impl ContactLedger {
    /// Empty ledger with sequences starting at 1.
    pub fn new() -> Self {
        Self {
            next_op_seq: 1,
            next_contact_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a ledger from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshotV1) -> Self {
        let mut store = Self {
            next_contact_id: snapshot.next_contact_id,
            next_op_seq: snapshot.next_op_seq,
            order: snapshot.order,
            ..Self::default()
        };
        for rec in snapshot.records {
            store.insert_indices(&rec);
            store.records.insert(rec.id, rec);
        }
        store
    }

    /// Exports the full state as a snapshot.
    pub fn export_snapshot(&self) -> LedgerSnapshotV1 {
        let records = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();
        LedgerSnapshotV1 {
            next_contact_id: self.next_contact_id,
            next_op_seq: self.next_op_seq,
            order: self.order.clone(),
            records,
        }
    }

    /// Commits a scored draft as a new contact.
    pub fn insert(
        &mut self,
        draft: ContactDraft,
        country_prefix: String,
        continent: Option<Continent>,
        score: Score,
    ) -> Result<(ContactId, StoredOp), StoreError> {
        let id = self.next_contact_id;
        self.next_contact_id += 1;

        let contact = Contact {
            id,
            contest_id: draft.contest_id,
            ts: draft.ts,
            freq_khz: draft.freq_khz,
            band: draft.band,
            mode: draft.mode,
            call_raw: draft.call_raw,
            call: draft.call,
            country_prefix,
            continent,
            exchange: draft.exchange,
            score,
        };

        let stored = self.apply_insert(contact)?;
        self.pending_ops.push(stored.clone());
        Ok((id, stored))
    }

    /// Applies an operator edit.
    pub fn patch(&mut self, id: ContactId, patch: ContactPatch) -> Result<StoredOp, StoreError> {
        let stored = self.apply_patch(id, patch)?;
        self.pending_ops.push(stored.clone());
        Ok(stored)
    }

    /// Rewrites a contact's score fields (recalculation pass).
    pub fn rescore(&mut self, id: ContactId, score: Score) -> Result<StoredOp, StoreError> {
        let stored = self.apply_rescore(id, score)?;
        self.pending_ops.push(stored.clone());
        Ok(stored)
    }

    /// Applies an op replayed from the journal, preserving its sequence.
    pub fn apply_replayed_op(&mut self, stored: StoredOp) -> Result<(), StoreError> {
        let seq = stored.seq;
        match stored.op {
            Op::Insert { contact } => {
                self.apply_insert_with_seq(contact, seq)?;
            }
            Op::Patch { id, patch, .. } => {
                self.apply_patch_with_seq(id, patch, seq)?;
            }
            Op::Rescore { id, score, .. } => {
                self.apply_rescore_with_seq(id, score, seq)?;
            }
        }
        Ok(())
    }

    /// Borrowed record access.
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.records.get(&id)
    }

    /// Cloned record access.
    pub fn get_cloned(&self, id: ContactId) -> Option<Contact> {
        self.get(id).cloned()
    }

    /// Last `n` contacts of a contest in insertion order.
    pub fn recent(&self, contest: ContestId, n: usize) -> Vec<Contact> {
        let ids = self.contest_ids(contest);
        let start = ids.len().saturating_sub(n);
        ids[start..]
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect()
    }

    /// All contacts previously logged with this normalized callsign.
    pub fn by_call(&self, call: &str) -> Vec<&Contact> {
        self.by_call
            .get(call)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Ops accumulated since the last drain.
    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        std::mem::take(&mut self.pending_ops)
    }

    /// Highest op sequence assigned so far.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    // --- query contract -------------------------------------------------

    /// All contacts of a contest in ascending (timestamp, id) order.
    ///
    /// This is the traversal order the recalculation pass and every
    /// export renderer rely on.
    pub fn all_ascending(&self, contest: ContestId) -> Vec<&Contact> {
        let mut out: Vec<&Contact> = self
            .contest_ids(contest)
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        out.sort_by_key(|c| (c.ts, c.id));
        out
    }

    /// True when `call` was already worked within `scope`.
    ///
    /// This is the pre-log dupe query; a positive answer zeroes points
    /// but never blocks logging.
    pub fn worked(&self, contest: ContestId, call: &str, scope: &DupeScope) -> bool {
        self.by_call
            .get(call)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .filter(|c| c.contest_id == contest)
            .any(|c| match scope {
                DupeScope::Any => true,
                DupeScope::Band(band) => &c.band == band,
                DupeScope::BandMode(band, mode) => {
                    &c.band == band && ModeGroup::normalize(&c.mode) == *mode
                }
                DupeScope::BandModeWindow {
                    band,
                    mode,
                    start_ts,
                    end_ts,
                } => {
                    &c.band == band
                        && ModeGroup::normalize(&c.mode) == *mode
                        && c.ts >= *start_ts
                        && c.ts < *end_ts
                }
            })
    }

    /// True when any contact of the contest already yields `key` under
    /// the given key function (multiplier first-occurrence check).
    pub fn key_seen(
        &self,
        contest: ContestId,
        key: &str,
        key_of: impl Fn(&Contact) -> Option<String>,
    ) -> bool {
        self.contest_ids(contest)
            .iter()
            .filter_map(|id| self.records.get(id))
            .any(|c| key_of(c).as_deref() == Some(key))
    }

    /// Count of distinct non-empty keys over a contest.
    pub fn count_distinct(
        &self,
        contest: ContestId,
        key_of: impl Fn(&Contact) -> Option<String>,
    ) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        for id in self.contest_ids(contest) {
            if let Some(key) = self.records.get(id).and_then(&key_of) {
                seen.insert(key);
            }
        }
        seen.len()
    }

    /// Highest numeric sent serial in the contest, zero when none.
    pub fn highest_sent_serial(&self, contest: ContestId) -> u32 {
        self.contest_ids(contest)
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter_map(|c| c.exchange.sent_nr.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Number of contacts logged in the contest.
    pub fn contact_count(&self, contest: ContestId) -> usize {
        self.contest_ids(contest).len()
    }

    /// Sum of stored QSO points over the contest.
    pub fn sum_points(&self, contest: ContestId) -> f64 {
        self.contest_ids(contest)
            .iter()
            .filter_map(|id| self.records.get(id))
            .map(|c| c.score.points)
            .sum()
    }

    /// Count of contacts carrying the first-occurrence flag on `axis`.
    ///
    /// Equals the distinct-key count on a consistent ledger, because
    /// exactly one contact per key carries the flag.
    pub fn flagged_count(&self, contest: ContestId, axis: usize) -> usize {
        self.contest_ids(contest)
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|c| c.score.mult(axis))
            .count()
    }

    /// True when a contact with this (timestamp, callsign) pair exists
    /// in the contest. ADIF import uses this for dupe suppression.
    pub fn has_ts_call(&self, contest: ContestId, ts: i64, call: &str) -> bool {
        self.by_call
            .get(call)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .any(|c| c.contest_id == contest && c.ts == ts)
    }

    // --- internals ------------------------------------------------------

    fn contest_ids(&self, contest: ContestId) -> &[ContactId] {
        self.by_contest
            .get(&contest)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn apply_insert(&mut self, contact: Contact) -> Result<StoredOp, StoreError> {
        let seq = self.take_next_op_seq();
        self.apply_insert_with_seq(contact, seq)
    }

    fn apply_insert_with_seq(
        &mut self,
        contact: Contact,
        seq: OpSeq,
    ) -> Result<StoredOp, StoreError> {
        if self.records.contains_key(&contact.id) {
            return Err(StoreError::AlreadyExists(contact.id));
        }

        let id = contact.id;
        self.next_contact_id = self.next_contact_id.max(id.saturating_add(1));
        self.insert_indices(&contact);
        self.order.push(id);
        self.records.insert(id, contact.clone());

        self.bump_next_seq_from(seq);
        Ok(StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Insert { contact },
        })
    }

    fn apply_patch(&mut self, id: ContactId, patch: ContactPatch) -> Result<StoredOp, StoreError> {
        let seq = self.take_next_op_seq();
        self.apply_patch_with_seq(id, patch, seq)
    }

    fn apply_patch_with_seq(
        &mut self,
        id: ContactId,
        patch: ContactPatch,
        seq: OpSeq,
    ) -> Result<StoredOp, StoreError> {
        let rec = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::MissingContact(id))?;
        let old_call = rec.call.clone();

        let prev = patch.capture_inverse_for(rec);
        patch.apply_to(rec);

        if rec.call != old_call {
            Self::remove_from_vec_index(self.by_call.entry(old_call).or_default(), id);
            self.by_call.entry(rec.call.clone()).or_default().push(id);
        }

        self.bump_next_seq_from(seq);
        Ok(StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Patch { id, patch, prev },
        })
    }

    fn apply_rescore(&mut self, id: ContactId, score: Score) -> Result<StoredOp, StoreError> {
        let seq = self.take_next_op_seq();
        self.apply_rescore_with_seq(id, score, seq)
    }

    fn apply_rescore_with_seq(
        &mut self,
        id: ContactId,
        score: Score,
        seq: OpSeq,
    ) -> Result<StoredOp, StoreError> {
        let rec = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::MissingContact(id))?;
        let prev = std::mem::replace(&mut rec.score, score.clone());

        self.bump_next_seq_from(seq);
        Ok(StoredOp {
            seq,
            ts_ms: now_ms(),
            op: Op::Rescore { id, score, prev },
        })
    }

    fn insert_indices(&mut self, rec: &Contact) {
        self.by_call.entry(rec.call.clone()).or_default().push(rec.id);
        self.by_contest
            .entry(rec.contest_id)
            .or_default()
            .push(rec.id);
    }

    fn remove_from_vec_index(v: &mut Vec<ContactId>, id: ContactId) {
        if let Some(pos) = v.iter().position(|x| *x == id) {
            v.remove(pos);
        }
    }

    fn take_next_op_seq(&mut self) -> OpSeq {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        seq
    }

    fn bump_next_seq_from(&mut self, seq: OpSeq) {
        self.next_op_seq = self.next_op_seq.max(seq.saturating_add(1));
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

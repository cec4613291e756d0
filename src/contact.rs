//! Contact domain record, draft, score fields, and patches.

use serde::{Deserialize, Serialize};

use crate::types::{ContactId, ContestId, Continent};

/// The fixed exchange slot set, reinterpreted per contest.
///
/// `nr` is overloaded: depending on the contest it carries a serial
/// number, a grid square, a province code, or free text. Several scoring
/// queries discriminate on whether it parses as a number — see
/// [`Exchange::nr_is_numeric`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Exchange {
    /// Sent signal report.
    pub snt: String,
    /// Received signal report.
    pub rcv: String,
    /// Sent serial number or sent exchange token.
    pub sent_nr: String,
    /// Received serial number / grid / province / free-text exchange.
    pub nr: String,
    /// Secondary exchange token.
    pub exchange1: String,
    /// Operator name (sprint-style contests).
    pub name: String,
    /// ARRL/RAC section.
    pub sect: String,
    /// Zone.
    pub zn: String,
    /// Precedence (Sweepstakes-style).
    pub prec: String,
    /// Check (Sweepstakes-style).
    pub ck: String,
}

impl Exchange {
    /// True when the received exchange parses as an unsigned number.
    ///
    /// Used to tell serial-number contacts (non-mult) from exchange-code
    /// contacts (mult-eligible) sharing the same field.
    pub fn nr_is_numeric(&self) -> bool {
        !self.nr.is_empty() && self.nr.chars().all(|c| c.is_ascii_digit())
    }
}

/// Scoring outputs computed and stored at log time.
///
/// The multiplier flags are binary first-occurrence markers, not counts:
/// in a consistent ledger exactly one contact per multiplier key carries
/// the flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Score {
    /// QSO point value; zero for dupes.
    pub points: f64,
    /// First occurrence on multiplier axis 1.
    pub mult1: bool,
    /// First occurrence on multiplier axis 2.
    pub mult2: bool,
    /// First occurrence on multiplier axis 3.
    pub mult3: bool,
}

impl Score {
    /// Flag value for the given axis (1-based).
    pub fn mult(&self, axis: usize) -> bool {
        match axis {
            1 => self.mult1,
            2 => self.mult2,
            3 => self.mult3,
            _ => false,
        }
    }
}

/// Fully materialized, authoritative contact record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable contact identifier.
    pub id: ContactId,
    /// Contest run this contact belongs to.
    pub contest_id: ContestId,
    /// Log timestamp, UTC seconds since epoch. The ledger's natural
    /// ordering key; only explicit operator edits change it.
    pub ts: i64,
    /// Frequency in kHz.
    pub freq_khz: f64,
    /// Display band string derived from frequency at commit time.
    pub band: String,
    /// Operator-entered mode text.
    pub mode: String,
    /// Operator-entered callsign text.
    pub call_raw: String,
    /// Normalized (upper-case, trimmed) callsign used for queries.
    pub call: String,
    /// Primary DXCC prefix resolved at log time; empty when unresolved.
    pub country_prefix: String,
    /// Continent resolved at log time.
    pub continent: Option<Continent>,
    /// Exchange slots.
    pub exchange: Exchange,
    /// Scoring outputs.
    pub score: Score,
}

/// Insert payload used to create a new [`Contact`].
///
/// Drafts carry no score; the engine evaluates one before commit.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDraft {
    /// Contest run this contact belongs to.
    pub contest_id: ContestId,
    /// Log timestamp, UTC seconds since epoch.
    pub ts: i64,
    /// Frequency in kHz.
    pub freq_khz: f64,
    /// Display band string.
    pub band: String,
    /// Operator-entered mode text.
    pub mode: String,
    /// Operator-entered callsign text.
    pub call_raw: String,
    /// Normalized callsign.
    pub call: String,
    /// Exchange slots.
    pub exchange: Exchange,
}

/// Sparse patch where each `Some` field overwrites the record value.
///
/// Score rewrites go through the dedicated score op instead, so the
/// recalculation pass never collides with operator edits in the journal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    /// Optional replacement for the timestamp.
    pub ts: Option<i64>,
    /// Optional replacement for the frequency.
    pub freq_khz: Option<f64>,
    /// Optional replacement for the band string.
    pub band: Option<String>,
    /// Optional replacement for the mode text.
    pub mode: Option<String>,
    /// Optional replacement for the raw callsign.
    pub call_raw: Option<String>,
    /// Optional replacement for the normalized callsign.
    pub call: Option<String>,
    /// Optional replacement for the country prefix.
    pub country_prefix: Option<String>,
    /// Optional replacement for the continent.
    pub continent: Option<Option<Continent>>,
    /// Optional replacement for the whole exchange.
    pub exchange: Option<Exchange>,
}

impl ContactPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Captures an inverse patch for all fields present in `self`.
    pub fn capture_inverse_for(&self, rec: &Contact) -> Self {
        Self {
            ts: self.ts.map(|_| rec.ts),
            freq_khz: self.freq_khz.map(|_| rec.freq_khz),
            band: self.band.as_ref().map(|_| rec.band.clone()),
            mode: self.mode.as_ref().map(|_| rec.mode.clone()),
            call_raw: self.call_raw.as_ref().map(|_| rec.call_raw.clone()),
            call: self.call.as_ref().map(|_| rec.call.clone()),
            country_prefix: self
                .country_prefix
                .as_ref()
                .map(|_| rec.country_prefix.clone()),
            continent: self.continent.map(|_| rec.continent),
            exchange: self.exchange.as_ref().map(|_| rec.exchange.clone()),
        }
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut Contact) {
        if let Some(v) = self.ts {
            rec.ts = v;
        }
        if let Some(v) = self.freq_khz {
            rec.freq_khz = v;
        }
        if let Some(v) = &self.band {
            rec.band = v.clone();
        }
        if let Some(v) = &self.mode {
            rec.mode = v.clone();
        }
        if let Some(v) = &self.call_raw {
            rec.call_raw = v.clone();
        }
        if let Some(v) = &self.call {
            rec.call = v.clone();
        }
        if let Some(v) = &self.country_prefix {
            rec.country_prefix = v.clone();
        }
        if let Some(v) = self.continent {
            rec.continent = v;
        }
        if let Some(v) = &self.exchange {
            rec.exchange = v.clone();
        }
    }
}

/// Normalizes a callsign for indexing and dupe checks.
pub fn normalize_call(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

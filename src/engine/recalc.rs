//! Full-ledger recalculation replay.
//!
//! Walks every contact of a contest in ascending (timestamp, id) order
//! and rewrites points and multiplier flags as if the log had been
//! entered in that order. Used after edits that invalidate stored
//! scores (timestamp, band, or callsign changes).

use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::HashSet;

use crate::{
    contact::Score,
    ledger::{ContactLedger, StoreError},
    rules::{ContestRules, StationProfile},
    types::ContestId,
};

/// How often the replay polls the cancel flag.
const CANCEL_POLL_INTERVAL: usize = 64;

/// Counters reported by a completed replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecalcSummary {
    /// Contacts examined.
    pub scanned: usize,
    /// Contacts whose stored score changed.
    pub rewritten: usize,
    /// True when the contest opts out of recalculation entirely.
    pub skipped: bool,
}

/// Replay failures.
#[derive(Debug, thiserror::Error)]
pub enum RecalcError {
    /// The cancel flag was raised mid-replay. Already-rewritten scores
    /// stay; re-running converges to the same final state.
    #[error("recalculation cancelled")]
    Cancelled,
    /// Ledger rejected a score rewrite.
    #[error("ledger error during recalculation: {0:?}")]
    Store(#[from] StoreError),
}

/// Rewrites all stored scores of `contest` from scratch.
///
/// Idempotent: a second run over an already-consistent ledger rewrites
/// nothing. Contests with `supports_recalc() == false` are skipped
/// (their stored scores depend only on per-contact data and never go
/// stale).
pub fn recalculate(
    rules: &dyn ContestRules,
    profile: &StationProfile,
    ledger: &mut ContactLedger,
    contest: ContestId,
    cancel: &AtomicBool,
) -> Result<RecalcSummary, RecalcError> {
    if !rules.supports_recalc() {
        return Ok(RecalcSummary {
            skipped: true,
            ..RecalcSummary::default()
        });
    }

    let order: Vec<_> = ledger
        .all_ascending(contest)
        .iter()
        .map(|c| c.id)
        .collect();

    let mut seen_dupe: HashSet<String> = HashSet::new();
    let mut seen_mult: [HashSet<String>; 3] = Default::default();
    let mut summary = RecalcSummary::default();

    for id in order {
        if summary.scanned % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Err(RecalcError::Cancelled);
        }
        summary.scanned += 1;

        let Some(contact) = ledger.get_cloned(id) else {
            continue;
        };

        let is_dupe = rules.replay_dupe(&mut seen_dupe, &contact);
        let points = rules.points(profile, &contact, is_dupe);

        let mut flags = [false; 3];
        for axis in 1..=3 {
            if let Some(key) = rules.mult_key(axis, profile, &contact) {
                flags[axis - 1] = seen_mult[axis - 1].insert(key);
            }
        }

        let score = Score {
            points,
            mult1: flags[0],
            mult2: flags[1],
            mult3: flags[2],
        };
        if score != contact.score {
            ledger.rescore(id, score)?;
            summary.rewritten += 1;
        }
    }

    Ok(summary)
}
